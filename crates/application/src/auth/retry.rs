//! Single re-authentication retry on 401.

use std::future::Future;
use std::sync::Arc;

use apiprobe_domain::{AuthAttemptState, ProviderRegistry, RequestSpec};

use crate::ports::TransportResult;

use super::AuthGateway;

/// Turns a 401 from a known provider into one fresh login and one replay.
///
/// The retry flag travels with the request in an [`AuthAttemptState`], so a
/// replay that fails with 401 again is returned as-is instead of looping.
pub struct RetryOnAuthFailure {
    gateway: Arc<AuthGateway>,
    providers: Arc<ProviderRegistry>,
}

impl RetryOnAuthFailure {
    /// Creates the handler.
    #[must_use]
    pub const fn new(gateway: Arc<AuthGateway>, providers: Arc<ProviderRegistry>) -> Self {
        Self { gateway, providers }
    }

    /// Inspects the outcome of `request` and replays it once on 401.
    ///
    /// Transport errors, non-401 statuses, unknown hosts and requests already
    /// retried pass through untouched. On a replay the outcome of the replay
    /// is returned; if no fresh token can be obtained the original 401 is.
    pub async fn handle<F, Fut>(
        &self,
        request: &RequestSpec,
        outcome: TransportResult,
        state: &mut AuthAttemptState,
        replay: F,
    ) -> TransportResult
    where
        F: FnOnce(RequestSpec) -> Fut + Send,
        Fut: Future<Output = TransportResult> + Send,
    {
        let response = match outcome {
            Ok(response) if response.is_unauthorized() => response,
            other => return other,
        };
        if state.retried() {
            tracing::debug!(url = %request.url, "401 after retry, giving up");
            return Ok(response);
        }
        let Some(provider) = self.providers.classify(&request.url) else {
            return Ok(response);
        };
        let key = provider.key.as_str();

        state.begin_retry();
        tracing::info!(provider = key, url = %request.url, "401 received, refreshing token");
        self.gateway.token_store().invalidate(key).await;

        let token = match self.gateway.force_refresh(key).await {
            Ok(Some(token)) => token,
            Ok(None) => {
                tracing::warn!(provider = key, "token refresh failed, returning original 401");
                return Ok(response);
            }
            Err(e) => {
                tracing::error!(provider = key, error = %e, "token refresh misconfigured, returning original 401");
                return Ok(response);
            }
        };

        let mut retry = request.clone();
        retry.headers.set_bearer(&token);
        replay(retry).await
    }
}
