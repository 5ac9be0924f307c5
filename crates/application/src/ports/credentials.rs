//! Credential lookup port

use apiprobe_domain::Credentials;

use crate::error::AuthError;

/// Supplies the shared-secret login payload for a provider key.
///
/// Implementations are pure lookups: no caching, no side effects.
pub trait CredentialProvider: Send + Sync {
    /// Returns the credentials configured for `provider_key`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if nothing is configured for the key.
    fn credentials_for(&self, provider_key: &str) -> Result<Credentials, AuthError>;
}
