//! Outbound credential attachment.

use std::sync::Arc;

use apiprobe_domain::{ProviderRegistry, RequestSpec, token_preview};

use crate::error::AuthError;

use super::AuthGateway;

/// Attaches a bearer token to requests aimed at a known provider.
pub struct RequestInterceptor {
    gateway: Arc<AuthGateway>,
    providers: Arc<ProviderRegistry>,
}

impl RequestInterceptor {
    /// Creates an interceptor over a gateway and its provider table.
    #[must_use]
    pub const fn new(gateway: Arc<AuthGateway>, providers: Arc<ProviderRegistry>) -> Self {
        Self { gateway, providers }
    }

    /// Returns the request with `Authorization: Bearer <token>` set when its
    /// URL belongs to a provider and a token is available.
    ///
    /// Requests to other hosts, or for which no token could be obtained, are
    /// returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if the matched provider has no credentials.
    pub async fn apply(&self, mut request: RequestSpec) -> Result<RequestSpec, AuthError> {
        let Some(provider) = self.providers.classify(&request.url) else {
            return Ok(request);
        };

        match self.gateway.token_for(&provider.key).await? {
            Some(token) => {
                tracing::debug!(
                    provider = %provider.key,
                    url = %request.url,
                    token = %token_preview(&token),
                    "attaching bearer token"
                );
                request.headers.set_bearer(&token);
            }
            None => {
                tracing::warn!(provider = %provider.key, url = %request.url, "no token available, sending request without credentials");
            }
        }
        Ok(request)
    }
}
