//! Environment-driven settings.
//!
//! ## Environment Variables
//! - `REQRES_BASE_URL`, `REQRES_EMAIL`, `REQRES_PASSWORD`: token provider
//! - `PETSTORE_BASE_URL`, `PETSTORE_USERNAME`, `PETSTORE_PASSWORD`: pet store provider
//! - `REQUEST_TIMEOUT`: default request timeout in milliseconds
//! - `AUTH_TIMEOUT`: login timeout in milliseconds
//! - `AUTH_RETRY_ATTEMPTS`, `AUTH_RETRY_DELAY`: explicit login retries and base delay (ms)
//! - `AUTH_TOKEN_TTL`: default token lifetime in seconds
//! - `TOKEN_STORAGE_DIR`: directory of durable token records
//!
//! Every key is optional; unset keys fall back to defaults that work
//! against the public demo services.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use apiprobe_application::{GatewaySettings, LoginRetryPolicy, StaticCredentialProvider};
use apiprobe_domain::{
    Credentials, LoginEndpoint, ProviderConfig, ProviderRegistry, TokenPersistence,
};
use thiserror::Error;

/// Provider key of the durable token provider.
pub const REQRES: &str = "reqres";

/// Provider key of the memory-only pet store provider.
pub const PETSTORE: &str = "petstore";

/// Errors raised while reading settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// A value could not be parsed.
    #[error("invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        /// Environment key
        key: String,
        /// Raw value
        value: String,
        /// Parser message
        reason: String,
    },
}

/// Base URL and shared secret of one provider.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    /// API base URL, without trailing slash
    pub base_url: String,
    /// Login identifier
    pub identifier: String,
    /// Login secret
    pub secret: String,
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("base_url", &self.base_url)
            .field("identifier", &self.identifier)
            .field("secret", &"***")
            .finish()
    }
}

impl ProviderSettings {
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn credentials(&self) -> Credentials {
        Credentials::new(self.identifier.clone(), self.secret.clone())
    }
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Durable token provider
    pub reqres: ProviderSettings,
    /// Memory-only session provider
    pub petstore: ProviderSettings,
    /// Default timeout of ordinary requests (ms)
    pub request_timeout_ms: u64,
    /// Timeout of login calls (ms)
    pub auth_timeout_ms: u64,
    /// Attempts for an explicit login
    pub auth_retry_attempts: u32,
    /// Base backoff between explicit login attempts (ms)
    pub auth_retry_delay_ms: u64,
    /// Default token lifetime (s)
    pub token_ttl_seconds: i64,
    /// Directory of durable token records
    pub token_storage_dir: PathBuf,
}

impl Settings {
    /// Loads settings from the process environment, after reading `.env` if present.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if a numeric value cannot be parsed.
    pub fn from_env() -> Result<Self, SettingsError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!(error = %e, "failed to read .env, using process environment"),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if a numeric value cannot be parsed.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, SettingsError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let url = |key: &str, default: &str| text(key, default).trim_end_matches('/').to_string();

        Ok(Self {
            reqres: ProviderSettings {
                base_url: url("REQRES_BASE_URL", "https://reqres.in/api"),
                identifier: text("REQRES_EMAIL", "eve.holt@reqres.in"),
                secret: text("REQRES_PASSWORD", "cityslicka"),
            },
            petstore: ProviderSettings {
                base_url: url("PETSTORE_BASE_URL", "https://petstore.swagger.io/v2"),
                identifier: text("PETSTORE_USERNAME", "testuser"),
                secret: text("PETSTORE_PASSWORD", "testpass"),
            },
            request_timeout_ms: parse(&lookup, "REQUEST_TIMEOUT", 10_000)?,
            auth_timeout_ms: parse(&lookup, "AUTH_TIMEOUT", 5_000)?,
            auth_retry_attempts: parse(&lookup, "AUTH_RETRY_ATTEMPTS", 3)?,
            auth_retry_delay_ms: parse(&lookup, "AUTH_RETRY_DELAY", 1_000)?,
            token_ttl_seconds: parse(&lookup, "AUTH_TOKEN_TTL", 3_600)?,
            token_storage_dir: PathBuf::from(text("TOKEN_STORAGE_DIR", ".apiprobe/tokens")),
        })
    }

    /// The provider table: the token provider first, then the pet store.
    #[must_use]
    pub fn provider_registry(&self) -> ProviderRegistry {
        ProviderRegistry::new()
            .with_provider(
                ProviderConfig::new(
                    REQRES,
                    self.reqres.base_url.clone(),
                    LoginEndpoint::json_body(
                        self.reqres.endpoint("login"),
                        "email",
                        "password",
                        "/token",
                    ),
                )
                .with_pattern("reqres.in"),
            )
            .with_provider(
                ProviderConfig::new(
                    PETSTORE,
                    self.petstore.base_url.clone(),
                    LoginEndpoint::query(
                        self.petstore.endpoint("user/login"),
                        "username",
                        "password",
                        "/message",
                    ),
                )
                .with_pattern("petstore.swagger.io")
                .with_persistence(TokenPersistence::MemoryOnly),
            )
    }

    /// Credentials for every configured provider.
    #[must_use]
    pub fn credential_provider(&self) -> StaticCredentialProvider {
        StaticCredentialProvider::new()
            .with(REQRES, self.reqres.credentials())
            .with(PETSTORE, self.petstore.credentials())
    }

    /// Login timeout and default token lifetime.
    #[must_use]
    pub const fn gateway_settings(&self) -> GatewaySettings {
        GatewaySettings {
            login_timeout_ms: self.auth_timeout_ms,
            default_ttl_seconds: self.token_ttl_seconds,
        }
    }

    /// Backoff used by explicit logins.
    #[must_use]
    pub const fn login_retry_policy(&self) -> LoginRetryPolicy {
        LoginRetryPolicy {
            attempts: self.auth_retry_attempts,
            base_delay: Duration::from_millis(self.auth_retry_delay_ms),
        }
    }
}

fn parse<L, T>(lookup: &L, key: &str, default: T) -> Result<T, SettingsError>
where
    L: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| SettingsError::InvalidValue {
                    key: key.to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                })
        }
        _ => Ok(default),
    }
}
