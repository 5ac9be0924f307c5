//! HTTP transport port

use async_trait::async_trait;
use apiprobe_domain::{RequestSpec, ResponseSpec};

/// Errors raised when a call cannot produce a response at all.
///
/// A completed call with a non-2xx status is not an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The call did not complete within its timeout.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout that expired
        timeout_ms: u64,
    },

    /// Host name resolution failed.
    #[error("DNS resolution failed for {host}: {message}")]
    DnsError {
        /// Host that failed to resolve
        host: String,
        /// Underlying error text
        message: String,
    },

    /// The remote end refused the connection.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host
        host: String,
        /// Target port
        port: u16,
    },

    /// Any other connection-level failure.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The redirect limit was exceeded.
    #[error("too many redirects (max {max})")]
    TooManyRedirects {
        /// Redirect limit
        max: usize,
    },

    /// Unclassified transport failure.
    #[error("transport error: {0}")]
    Other(String),
}

/// Result of a single transport call.
pub type TransportResult = Result<ResponseSpec, TransportError>;

/// Port for performing one HTTP call.
///
/// Implementations must honor `request.timeout_ms` and report its expiry
/// as `TransportError::Timeout`. They never fail for non-2xx statuses.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Executes the request and returns the status and body.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or timeout.
    async fn execute(&self, request: &RequestSpec) -> TransportResult;
}
