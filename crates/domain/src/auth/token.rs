//! Bearer token record with expiry tracking.

use serde::{Deserialize, Serialize};

/// Durable token record for one provider key.
///
/// Serialized as `{"providerKey", "token", "tokenExpiresAt"}` with the expiry
/// in epoch milliseconds. A record whose token fields are cleared stays on
/// storage until it is explicitly removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    /// Provider this token was issued by
    pub provider_key: String,
    /// The opaque bearer token
    #[serde(default)]
    pub token: Option<String>,
    /// Expiry instant in epoch milliseconds
    #[serde(default, rename = "tokenExpiresAt")]
    pub expires_at_millis: Option<i64>,
}

impl TokenRecord {
    /// Creates a record for a freshly issued token.
    ///
    /// A non-positive `ttl_seconds` yields a record that is already expired.
    #[must_use]
    pub fn issued(
        provider_key: impl Into<String>,
        token: impl Into<String>,
        ttl_seconds: i64,
        now_millis: i64,
    ) -> Self {
        Self {
            provider_key: provider_key.into(),
            token: Some(token.into()),
            expires_at_millis: Some(now_millis.saturating_add(ttl_seconds.saturating_mul(1000))),
        }
    }

    /// Creates a record with both token fields cleared.
    #[must_use]
    pub fn cleared(provider_key: impl Into<String>) -> Self {
        Self {
            provider_key: provider_key.into(),
            token: None,
            expires_at_millis: None,
        }
    }

    /// Returns true if the record holds a token that has not expired at `now_millis`.
    #[must_use]
    pub fn is_valid_at(&self, now_millis: i64) -> bool {
        self.token.is_some() && self.expires_at_millis.is_some_and(|exp| now_millis < exp)
    }

    /// Returns true if the record holds a token whose expiry has passed.
    #[must_use]
    pub fn is_expired_at(&self, now_millis: i64) -> bool {
        self.token.is_some() && !self.is_valid_at(now_millis)
    }

    /// Whole seconds until expiry, or None when no token is held.
    #[must_use]
    pub fn seconds_remaining_at(&self, now_millis: i64) -> Option<i64> {
        self.token.as_ref()?;
        self.expires_at_millis
            .map(|exp| (exp - now_millis).div_euclid(1000))
    }
}

/// Shortens a token for log output (first 8 chars + ...).
#[must_use]
pub fn token_preview(token: &str) -> String {
    if token.chars().count() > 12 {
        let head: String = token.chars().take(8).collect();
        format!("{head}...")
    } else {
        token.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn test_issued_record_expiry() {
        let record = TokenRecord::issued("svc", "abc123", 3600, NOW);
        assert_eq!(record.expires_at_millis, Some(NOW + 3_600_000));
        assert!(record.is_valid_at(NOW));
        assert!(record.is_valid_at(NOW + 3_599_999));
        assert!(!record.is_valid_at(NOW + 3_600_000));
        assert_eq!(record.seconds_remaining_at(NOW), Some(3600));
    }

    #[test]
    fn test_non_positive_ttl_is_expired_immediately() {
        for ttl in [0, -1, -3600] {
            let record = TokenRecord::issued("svc", "abc123", ttl, NOW);
            assert!(!record.is_valid_at(NOW), "ttl {ttl} must be expired");
            assert!(record.is_expired_at(NOW));
        }
    }

    #[test]
    fn test_cleared_record_is_not_valid_nor_expired() {
        let record = TokenRecord::cleared("svc");
        assert!(!record.is_valid_at(NOW));
        assert!(!record.is_expired_at(NOW));
        assert_eq!(record.seconds_remaining_at(NOW), None);
    }

    #[test]
    fn test_serialized_field_names() {
        let record = TokenRecord::issued("reqres", "QpwL5tke4Pnpja7X4", 1, 0);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "providerKey": "reqres",
                "token": "QpwL5tke4Pnpja7X4",
                "tokenExpiresAt": 1000
            })
        );
    }

    #[test]
    fn test_deserialize_record_with_null_fields() {
        let record: TokenRecord = serde_json::from_str(
            r#"{"providerKey": "reqres", "token": null, "tokenExpiresAt": null}"#,
        )
        .unwrap();
        assert_eq!(record, TokenRecord::cleared("reqres"));
    }

    #[test]
    fn test_token_preview() {
        assert_eq!(token_preview("abcdefghijklmnop"), "abcdefgh...");
        assert_eq!(token_preview("short"), "short");
    }
}
