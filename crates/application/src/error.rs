//! Application error types

use thiserror::Error;

use crate::ports::TransportError;

/// Errors raised while obtaining a token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No provider mapping or credentials exist for the requested key.
    /// Fatal to the operation that asked; never retried.
    #[error("configuration error: {message}")]
    Configuration {
        /// What is missing
        message: String,
    },

    /// The login endpoint answered with a non-success status.
    #[error("login to '{provider_key}' rejected with status {status}")]
    LoginRejected {
        /// Provider that rejected the login
        provider_key: String,
        /// Status returned by the login endpoint
        status: u16,
    },

    /// The login succeeded but the reply carried no token.
    #[error("login reply from '{provider_key}' has no token at '{pointer}'")]
    TokenMissing {
        /// Provider that replied
        provider_key: String,
        /// JSON pointer that was looked up
        pointer: String,
    },

    /// The login call itself failed.
    #[error("login transport failure: {0}")]
    Transport(#[from] TransportError),
}

impl AuthError {
    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Returns true for configuration errors, which are never retried.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}
