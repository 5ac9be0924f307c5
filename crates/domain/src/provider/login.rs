//! Login endpoint descriptor.

use serde_json::{Map, Value};
use url::Url;

use crate::auth::Credentials;
use crate::error::{DomainError, DomainResult};
use crate::request::{HttpMethod, RequestSpec};

/// Where the shared-secret credentials go in the login call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialPlacement {
    /// `POST` with a JSON object body.
    JsonBody {
        /// Body field holding the identifier
        identifier_field: String,
        /// Body field holding the secret
        secret_field: String,
    },
    /// `GET` with the credentials in the query string.
    Query {
        /// Query parameter holding the identifier
        identifier_param: String,
        /// Query parameter holding the secret
        secret_param: String,
    },
}

/// Describes how to log in to a provider and where the token sits in the reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginEndpoint {
    /// Absolute login URL
    pub url: String,
    /// Credential shape
    pub placement: CredentialPlacement,
    /// JSON pointer (RFC 6901) to the token in the response body
    pub token_pointer: String,
}

impl LoginEndpoint {
    /// Login by posting `{identifier_field, secret_field}` as JSON.
    #[must_use]
    pub fn json_body(
        url: impl Into<String>,
        identifier_field: impl Into<String>,
        secret_field: impl Into<String>,
        token_pointer: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            placement: CredentialPlacement::JsonBody {
                identifier_field: identifier_field.into(),
                secret_field: secret_field.into(),
            },
            token_pointer: token_pointer.into(),
        }
    }

    /// Login by a GET with the credentials as query parameters.
    #[must_use]
    pub fn query(
        url: impl Into<String>,
        identifier_param: impl Into<String>,
        secret_param: impl Into<String>,
        token_pointer: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            placement: CredentialPlacement::Query {
                identifier_param: identifier_param.into(),
                secret_param: secret_param.into(),
            },
            token_pointer: token_pointer.into(),
        }
    }

    /// Builds the login request for the given credentials.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidUrl` if the login URL cannot be parsed.
    pub fn build_request(
        &self,
        credentials: &Credentials,
        timeout_ms: u64,
    ) -> DomainResult<RequestSpec> {
        let mut url =
            Url::parse(&self.url).map_err(|e| DomainError::InvalidUrl(format!("{e}: {}", self.url)))?;

        let request = match &self.placement {
            CredentialPlacement::JsonBody {
                identifier_field,
                secret_field,
            } => {
                let mut body = Map::new();
                body.insert(
                    identifier_field.clone(),
                    Value::String(credentials.identifier().to_string()),
                );
                body.insert(
                    secret_field.clone(),
                    Value::String(credentials.secret().to_string()),
                );
                RequestSpec::new(HttpMethod::Post, url.as_str()).with_json(Value::Object(body))
            }
            CredentialPlacement::Query {
                identifier_param,
                secret_param,
            } => {
                url.query_pairs_mut()
                    .append_pair(identifier_param, credentials.identifier())
                    .append_pair(secret_param, credentials.secret());
                RequestSpec::new(HttpMethod::Get, url.as_str())
            }
        };

        Ok(request
            .with_header("Accept", "application/json")
            .with_timeout_ms(timeout_ms))
    }

    /// Reads a non-empty token string out of a login response body.
    #[must_use]
    pub fn extract_token(&self, body: &Value) -> Option<String> {
        body.pointer(&self.token_pointer)
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_owned)
    }
}
