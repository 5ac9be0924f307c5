//! Response specification type

use std::time::Duration;

use serde_json::Value;

use crate::request::Headers;

/// Status code that signals an authorization failure.
const UNAUTHORIZED: u16 = 401;

/// Outcome of a completed HTTP call: `{status, body}`.
///
/// Non-2xx statuses are ordinary responses, never errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSpec {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Headers,
    /// Parsed JSON body; non-JSON payloads are kept as a JSON string
    pub body: Value,
    /// Time spent on the call
    pub duration: Duration,
}

impl ResponseSpec {
    /// Creates a response with the given status and body.
    #[must_use]
    pub const fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body,
            duration: Duration::ZERO,
        }
    }

    /// Returns true if the status code indicates success (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns true if the status signals an authorization failure (401).
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        self.status == UNAUTHORIZED
    }
}
