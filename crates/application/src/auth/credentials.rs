//! Credential lookup from configured values.

use std::collections::HashMap;

use apiprobe_domain::Credentials;

use crate::error::AuthError;
use crate::ports::CredentialProvider;

/// Credential provider over a fixed map built at start-up.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialProvider {
    credentials: HashMap<String, Credentials>,
}

impl StaticCredentialProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers credentials for a provider key.
    #[must_use]
    pub fn with(mut self, provider_key: impl Into<String>, credentials: Credentials) -> Self {
        self.credentials.insert(provider_key.into(), credentials);
        self
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn credentials_for(&self, provider_key: &str) -> Result<Credentials, AuthError> {
        let credentials = self.credentials.get(provider_key).ok_or_else(|| {
            AuthError::configuration(format!("no credentials configured for '{provider_key}'"))
        })?;
        if credentials.identifier().is_empty() || credentials.secret().is_empty() {
            return Err(AuthError::configuration(format!(
                "credentials for '{provider_key}' are incomplete"
            )));
        }
        Ok(credentials.clone())
    }
}
