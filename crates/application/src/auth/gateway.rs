//! Token acquisition: cache lookup, shared-secret login and forced refresh.

use std::sync::Arc;
use std::time::Duration;

use apiprobe_domain::{ProviderConfig, ProviderRegistry, token_preview};

use crate::error::AuthError;
use crate::ports::{CredentialProvider, HttpTransport};

use super::TokenStore;

/// Login timeout used when none is configured.
pub const DEFAULT_LOGIN_TIMEOUT_MS: u64 = 5_000;

/// Token lifetime used when a provider does not set one.
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 3_600;

/// Gateway-wide settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewaySettings {
    /// Timeout of each login call
    pub login_timeout_ms: u64,
    /// Lifetime given to tokens of providers without their own TTL
    pub default_ttl_seconds: i64,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            login_timeout_ms: DEFAULT_LOGIN_TIMEOUT_MS,
            default_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
        }
    }
}

/// Linear backoff for explicit logins: the delay before retry `n` is `n * base_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginRetryPolicy {
    /// Total attempts, at least one
    pub attempts: u32,
    /// Delay unit
    pub base_delay: Duration,
}

impl LoginRetryPolicy {
    /// Delay to wait after the failed attempt `attempt` (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

impl Default for LoginRetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(1_000),
        }
    }
}

/// Returns a currently valid token per provider key, logging in when needed.
///
/// Login failures are not fatal: `token_for` and `force_refresh` report them
/// as `Ok(None)` so that calls to endpoints that need no token still go out.
/// Only configuration errors are returned as `Err`.
pub struct AuthGateway {
    token_store: Arc<TokenStore>,
    credentials: Arc<dyn CredentialProvider>,
    transport: Arc<dyn HttpTransport>,
    providers: Arc<ProviderRegistry>,
    settings: GatewaySettings,
}

impl AuthGateway {
    /// Creates a gateway over its collaborators.
    #[must_use]
    pub fn new(
        token_store: Arc<TokenStore>,
        credentials: Arc<dyn CredentialProvider>,
        transport: Arc<dyn HttpTransport>,
        providers: Arc<ProviderRegistry>,
        settings: GatewaySettings,
    ) -> Self {
        Self {
            token_store,
            credentials,
            transport,
            providers,
            settings,
        }
    }

    /// The token cache this gateway reads and fills.
    #[must_use]
    pub fn token_store(&self) -> &TokenStore {
        &self.token_store
    }

    /// Returns the cached token for `provider_key`, logging in on a miss or expiry.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if the key has no provider or credentials.
    pub async fn token_for(&self, provider_key: &str) -> Result<Option<String>, AuthError> {
        if let Some(token) = self
            .token_store
            .get(provider_key)
            .await
            .and_then(|record| record.token)
        {
            tracing::debug!(provider = provider_key, "using cached token");
            return Ok(Some(token));
        }
        self.refresh(provider_key).await
    }

    /// Logs in again, ignoring whatever is cached.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if the key has no provider or credentials.
    pub async fn force_refresh(&self, provider_key: &str) -> Result<Option<String>, AuthError> {
        tracing::info!(provider = provider_key, "forcing token refresh");
        self.refresh(provider_key).await
    }

    /// Performs one login and caches the token.
    ///
    /// # Errors
    ///
    /// Returns every failure: configuration, transport, rejected status, or a
    /// reply without a token.
    pub async fn login(&self, provider_key: &str) -> Result<String, AuthError> {
        let provider = self.provider(provider_key)?;
        let credentials = self.credentials.credentials_for(provider_key)?;
        let request = provider
            .login
            .build_request(&credentials, self.settings.login_timeout_ms)
            .map_err(|e| AuthError::configuration(format!("login endpoint for '{provider_key}': {e}")))?;

        tracing::info!(provider = provider_key, method = %request.method, url = %provider.login.url, "logging in");
        let response = self.transport.execute(&request).await?;

        if !response.is_success() {
            return Err(AuthError::LoginRejected {
                provider_key: provider_key.to_string(),
                status: response.status,
            });
        }

        let token = provider
            .login
            .extract_token(&response.body)
            .ok_or_else(|| AuthError::TokenMissing {
                provider_key: provider_key.to_string(),
                pointer: provider.login.token_pointer.clone(),
            })?;

        let ttl = provider
            .token_ttl_seconds
            .unwrap_or(self.settings.default_ttl_seconds);
        self.token_store.set(provider_key, &token, ttl).await;
        tracing::info!(provider = provider_key, token = %token_preview(&token), ttl_seconds = ttl, "login succeeded");
        Ok(token)
    }

    /// Logs in, retrying failures with linear backoff.
    ///
    /// # Errors
    ///
    /// Returns configuration errors immediately and the last failure once
    /// every attempt is used up.
    pub async fn login_with_retry(
        &self,
        provider_key: &str,
        policy: LoginRetryPolicy,
    ) -> Result<String, AuthError> {
        let attempts = policy.attempts.max(1);
        let mut attempt = 1;
        loop {
            tracing::info!(provider = provider_key, attempt, attempts, "login attempt");
            match self.login(provider_key).await {
                Ok(token) => return Ok(token),
                Err(e) if e.is_configuration() => return Err(e),
                Err(e) if attempt >= attempts => {
                    tracing::error!(provider = provider_key, error = %e, "all login attempts failed");
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(provider = provider_key, attempt, error = %e, "login attempt failed");
                    tokio::time::sleep(policy.delay_after(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn refresh(&self, provider_key: &str) -> Result<Option<String>, AuthError> {
        match self.login(provider_key).await {
            Ok(token) => Ok(Some(token)),
            Err(e) if e.is_configuration() => Err(e),
            Err(e) => {
                tracing::warn!(provider = provider_key, error = %e, "login failed, continuing without token");
                Ok(None)
            }
        }
    }

    fn provider(&self, provider_key: &str) -> Result<&ProviderConfig, AuthError> {
        self.providers
            .get(provider_key)
            .ok_or_else(|| AuthError::configuration(format!("no provider configured for '{provider_key}'")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
pub(crate) mod tests {
    use super::*;
    use crate::auth::StaticCredentialProvider;
    use crate::ports::{Clock, TransportError};
    use crate::test_support::{ManualClock, MemoryRecordStore, MockTransport};
    use apiprobe_domain::{Credentials, HttpMethod, LoginEndpoint};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    pub(crate) const LOGIN_URL: &str = "https://svc.test/api/login";

    pub(crate) struct Fixture {
        pub(crate) clock: Arc<ManualClock>,
        pub(crate) records: Arc<MemoryRecordStore>,
        pub(crate) transport: Arc<MockTransport>,
        pub(crate) gateway: Arc<AuthGateway>,
    }

    pub(crate) fn registry() -> ProviderRegistry {
        ProviderRegistry::new().with_provider(
            ProviderConfig::new(
                "svc",
                "https://svc.test/api",
                LoginEndpoint::json_body(LOGIN_URL, "email", "password", "/token"),
            )
            .with_ttl_seconds(3600),
        )
    }

    pub(crate) fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::new());
        let records = Arc::new(MemoryRecordStore::new());
        let transport = Arc::new(MockTransport::new());
        let token_store = Arc::new(TokenStore::with_durable(records.clone(), ["svc"], clock.clone()));
        let credentials =
            StaticCredentialProvider::new().with("svc", Credentials::new("eve.holt@reqres.in", "cityslicka"));
        let gateway = Arc::new(AuthGateway::new(
            token_store,
            Arc::new(credentials),
            transport.clone(),
            Arc::new(registry()),
            GatewaySettings::default(),
        ));
        Fixture {
            clock,
            records,
            transport,
            gateway,
        }
    }

    #[tokio::test]
    async fn test_login_stores_token_with_ttl() {
        let f = fixture();
        f.transport.respond("/login", 200, json!({"token": "abc123"}));

        let token = f.gateway.token_for("svc").await.unwrap();

        assert_eq!(token.as_deref(), Some("abc123"));
        let record = f.gateway.token_store().get("svc").await.unwrap();
        assert_eq!(record.token.as_deref(), Some("abc123"));
        assert_eq!(record.expires_at_millis, Some(f.clock.now_millis() + 3_600_000));
        assert_eq!(f.records.raw("svc").unwrap()["token"], json!("abc123"));

        let login = &f.transport.requests()[0];
        assert_eq!(login.method, HttpMethod::Post);
        assert_eq!(
            login.body,
            Some(json!({"email": "eve.holt@reqres.in", "password": "cityslicka"}))
        );
        assert_eq!(login.timeout_ms, DEFAULT_LOGIN_TIMEOUT_MS);
    }

    #[tokio::test]
    async fn test_cached_token_skips_login() {
        let f = fixture();
        f.gateway.token_store().set("svc", "cached", 3600).await;

        let token = f.gateway.token_for("svc").await.unwrap();

        assert_eq!(token.as_deref(), Some("cached"));
        assert_eq!(f.transport.calls_to("/login"), 0);
    }

    #[tokio::test]
    async fn test_unwritable_storage_does_not_force_second_login() {
        let f = fixture();
        f.records.set_read_only(true);
        f.transport.respond("/login", 200, json!({"token": "abc123"}));

        let first = f.gateway.token_for("svc").await.unwrap();
        let second = f.gateway.token_for("svc").await.unwrap();

        assert_eq!(first.as_deref(), Some("abc123"));
        assert_eq!(second.as_deref(), Some("abc123"));
        assert_eq!(f.transport.calls_to("/login"), 1);
        assert!(f.records.raw("svc").is_none());
    }

    #[tokio::test]
    async fn test_expired_token_triggers_login() {
        let f = fixture();
        f.gateway.token_store().set("svc", "old", 60).await;
        f.clock.advance_secs(120);
        f.transport.respond("/login", 200, json!({"token": "new"}));

        let token = f.gateway.token_for("svc").await.unwrap();

        assert_eq!(token.as_deref(), Some("new"));
        assert_eq!(f.transport.calls_to("/login"), 1);
    }

    #[tokio::test]
    async fn test_force_refresh_ignores_cache() {
        let f = fixture();
        f.gateway.token_store().set("svc", "cached", 3600).await;
        f.transport.respond("/login", 200, json!({"token": "xyz999"}));

        let token = f.gateway.force_refresh("svc").await.unwrap();

        assert_eq!(token.as_deref(), Some("xyz999"));
        assert_eq!(
            f.gateway.token_store().get("svc").await.and_then(|r| r.token),
            Some("xyz999".to_string())
        );
    }

    #[tokio::test]
    async fn test_login_failures_yield_no_token() {
        let f = fixture();
        f.transport.respond("/login", 400, json!({"error": "Missing password"}));
        f.transport.script("/login", Err(TransportError::Timeout { timeout_ms: 5_000 }));
        f.transport.respond("/login", 200, json!({"unexpected": true}));

        for _ in 0..3 {
            assert_eq!(f.gateway.token_for("svc").await.unwrap(), None);
        }
        assert!(f.gateway.token_store().get("svc").await.is_none());
    }

    #[tokio::test]
    async fn test_unknown_provider_is_configuration_error() {
        let f = fixture();
        let err = f.gateway.token_for("unknown").await.unwrap_err();
        assert!(err.is_configuration());
        assert!(f.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_login_reports_rejection() {
        let f = fixture();
        f.transport.respond("/login", 400, json!({"error": "user not found"}));

        let err = f.gateway.login("svc").await.unwrap_err();
        assert_eq!(
            err,
            AuthError::LoginRejected {
                provider_key: "svc".to_string(),
                status: 400
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_with_retry_backs_off_linearly() {
        let f = fixture();
        f.transport.respond("/login", 503, json!({}));
        f.transport.respond("/login", 503, json!({}));
        f.transport.respond("/login", 200, json!({"token": "third-time"}));
        let policy = LoginRetryPolicy {
            attempts: 3,
            base_delay: Duration::from_millis(100),
        };

        let started = tokio::time::Instant::now();
        let token = f.gateway.login_with_retry("svc", policy).await.unwrap();

        assert_eq!(token, "third-time");
        assert_eq!(f.transport.calls_to("/login"), 3);
        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_with_retry_surfaces_last_error() {
        let f = fixture();
        f.transport.respond("/login", 500, json!({}));
        f.transport.respond("/login", 401, json!({}));
        let policy = LoginRetryPolicy {
            attempts: 2,
            base_delay: Duration::from_millis(10),
        };

        let err = f.gateway.login_with_retry("svc", policy).await.unwrap_err();
        assert_eq!(
            err,
            AuthError::LoginRejected {
                provider_key: "svc".to_string(),
                status: 401
            }
        );
    }

    #[test]
    fn test_retry_delay_grows_linearly() {
        let policy = LoginRetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_millis(1_000));
        assert_eq!(policy.delay_after(3), Duration::from_millis(3_000));
    }
}
