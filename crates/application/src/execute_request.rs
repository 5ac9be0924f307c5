//! Execute Request Use Case
//!
//! Sends one request through the auth pipeline: attach credentials, send,
//! and re-authenticate once if a known provider answers 401.

use std::sync::Arc;

use apiprobe_domain::{AuthAttemptState, RequestSpec, ResponseSpec};
use thiserror::Error;

use crate::auth::{RequestInterceptor, RetryOnAuthFailure};
use crate::error::AuthError;
use crate::ports::{HttpTransport, TransportError};

/// Result type for request execution.
pub type ExecuteResult = Result<ResponseSpec, ExecuteRequestError>;

/// Error type for the execute request use case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecuteRequestError {
    /// URL is empty.
    #[error("URL is required")]
    EmptyUrl,

    /// URL is invalid.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Credentials could not be attached.
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// The request could not be delivered.
    #[error("{0}")]
    Transport(#[from] TransportError),
}

/// Use case for executing authenticated HTTP requests.
///
/// # Example
///
/// ```ignore
/// let client = ExecuteRequest::new(transport, interceptor, retry);
/// let response = client.execute(RequestSpec::get("https://reqres.in/api/users/2")).await?;
/// ```
pub struct ExecuteRequest {
    transport: Arc<dyn HttpTransport>,
    interceptor: Arc<RequestInterceptor>,
    retry: Arc<RetryOnAuthFailure>,
}

impl ExecuteRequest {
    /// Creates the use case.
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        interceptor: Arc<RequestInterceptor>,
        retry: Arc<RetryOnAuthFailure>,
    ) -> Self {
        Self {
            transport,
            interceptor,
            retry,
        }
    }

    /// Executes the request and returns the final response.
    ///
    /// Non-2xx statuses are responses, not errors.
    ///
    /// # Errors
    ///
    /// Returns `ExecuteRequestError` on validation, configuration or transport failures.
    pub async fn execute(&self, request: RequestSpec) -> ExecuteResult {
        Self::validate(&request)?;

        let mut state = AuthAttemptState::new();
        let request = self.interceptor.apply(request).await?;
        let outcome = self.transport.execute(&request).await;

        let transport = Arc::clone(&self.transport);
        let response = self
            .retry
            .handle(&request, outcome, &mut state, |retry| async move {
                transport.execute(&retry).await
            })
            .await?;

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            status = response.status,
            retried = state.retried(),
            "request completed"
        );
        Ok(response)
    }

    fn validate(request: &RequestSpec) -> Result<(), ExecuteRequestError> {
        if request.url.trim().is_empty() {
            return Err(ExecuteRequestError::EmptyUrl);
        }

        if !request.url.starts_with("http://") && !request.url.starts_with("https://") {
            return Err(ExecuteRequestError::InvalidUrl(
                "URL must start with http:// or https://".to_string(),
            ));
        }

        request
            .parse_url()
            .map_err(|e| ExecuteRequestError::InvalidUrl(e.to_string()))?;
        Ok(())
    }
}
