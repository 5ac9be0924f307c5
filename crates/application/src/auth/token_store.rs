//! Token cache with a durable record store and an in-process mirror.
//!
//! The durable store is shared with other processes and is best-effort:
//! read failures degrade to the in-process mirror and write failures are
//! logged, never raised. Expired records stay on storage and are reported
//! as absent. While the last durable write for a key has failed, the
//! in-process mirror is the source of truth for that key.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use apiprobe_domain::TokenRecord;
use tokio::sync::RwLock;

use crate::ports::{Clock, RecordStore};

/// Process-wide token cache keyed by provider key.
pub struct TokenStore {
    mirror: RwLock<HashMap<String, TokenRecord>>,
    durable: Option<Arc<dyn RecordStore>>,
    durable_keys: HashSet<String>,
    /// Durable keys whose last write or removal did not reach storage.
    unsynced: RwLock<HashSet<String>>,
    clock: Arc<dyn Clock>,
}

impl TokenStore {
    /// Creates a store that keeps every token in memory only.
    #[must_use]
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self {
            mirror: RwLock::new(HashMap::new()),
            durable: None,
            durable_keys: HashSet::new(),
            unsynced: RwLock::new(HashSet::new()),
            clock,
        }
    }

    /// Creates a store that writes the given keys through to `durable`.
    ///
    /// Keys outside `durable_keys` are cached in memory only.
    #[must_use]
    pub fn with_durable<I, K>(durable: Arc<dyn RecordStore>, durable_keys: I, clock: Arc<dyn Clock>) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            mirror: RwLock::new(HashMap::new()),
            durable: Some(durable),
            durable_keys: durable_keys.into_iter().map(Into::into).collect(),
            unsynced: RwLock::new(HashSet::new()),
            clock,
        }
    }

    /// Returns the valid record for a key, or None if missing or expired.
    pub async fn get(&self, key: &str) -> Option<TokenRecord> {
        let now = self.clock.now_millis();
        self.load(key)
            .await
            .filter(|record| record.is_valid_at(now))
    }

    /// Stores a freshly issued token that expires after `ttl_seconds`.
    pub async fn set(&self, key: &str, token: &str, ttl_seconds: i64) {
        let record = TokenRecord::issued(key, token, ttl_seconds, self.clock.now_millis());
        self.mirror
            .write()
            .await
            .insert(key.to_string(), record.clone());
        self.persist(key, &record).await;
    }

    /// Clears the token fields of a key but keeps its durable record.
    pub async fn invalidate(&self, key: &str) {
        self.mirror.write().await.remove(key);
        self.persist(key, &TokenRecord::cleared(key)).await;
    }

    /// Removes a key from the mirror and from durable storage.
    pub async fn clear(&self, key: &str) {
        self.mirror.write().await.remove(key);
        let Some(durable) = self.durable_for(key) else {
            return;
        };
        let removed = match durable.remove_record(key).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(provider = key, error = %e, "failed to remove durable token record");
                false
            }
        };
        self.mark_synced(key, removed).await;
    }

    /// Removes every known key.
    pub async fn clear_all(&self) {
        let mut keys: HashSet<String> = self.mirror.read().await.keys().cloned().collect();
        keys.extend(self.durable_keys.iter().cloned());
        for key in keys {
            self.clear(&key).await;
        }
    }

    /// Returns the token status for display.
    pub async fn status(&self, key: &str) -> TokenStatus {
        let now = self.clock.now_millis();
        match self.load(key).await {
            Some(record) if record.is_valid_at(now) => TokenStatus::Valid {
                seconds_remaining: record.seconds_remaining_at(now).unwrap_or(0),
            },
            Some(record) if record.is_expired_at(now) => TokenStatus::Expired,
            _ => TokenStatus::NotAuthenticated,
        }
    }

    /// Reads the raw record: durable copy first for synced durable keys,
    /// mirror otherwise.
    async fn load(&self, key: &str) -> Option<TokenRecord> {
        if let Some(durable) = self.durable_for(key)
            && !self.unsynced.read().await.contains(key)
        {
            match durable.read_record(key).await {
                Ok(None) => return None,
                Ok(Some(value)) => match serde_json::from_value::<TokenRecord>(value) {
                    Ok(record) => {
                        if record.is_valid_at(self.clock.now_millis()) {
                            self.mirror
                                .write()
                                .await
                                .insert(key.to_string(), record.clone());
                        }
                        return Some(record);
                    }
                    Err(e) => {
                        tracing::warn!(provider = key, error = %e, "malformed durable token record, using in-process copy");
                    }
                },
                Err(e) => {
                    tracing::warn!(provider = key, error = %e, "durable token store unreadable, using in-process copy");
                }
            }
        }
        self.mirror.read().await.get(key).cloned()
    }

    async fn persist(&self, key: &str, record: &TokenRecord) {
        let Some(durable) = self.durable_for(key) else {
            return;
        };
        let written = match serde_json::to_value(record) {
            Ok(value) => match durable.write_record(key, &value).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(provider = key, error = %e, "failed to write durable token record");
                    false
                }
            },
            Err(e) => {
                tracing::warn!(provider = key, error = %e, "failed to encode token record");
                false
            }
        };
        self.mark_synced(key, written).await;
    }

    async fn mark_synced(&self, key: &str, synced: bool) {
        let mut unsynced = self.unsynced.write().await;
        if synced {
            unsynced.remove(key);
        } else {
            unsynced.insert(key.to_string());
        }
    }

    fn durable_for(&self, key: &str) -> Option<&Arc<dyn RecordStore>> {
        self.durable
            .as_ref()
            .filter(|_| self.durable_keys.contains(key))
    }
}

/// Status of a token for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    /// No token exists for this key.
    NotAuthenticated,
    /// A token exists and has not expired.
    Valid {
        /// Whole seconds until expiry.
        seconds_remaining: i64,
    },
    /// A token exists but its expiry has passed.
    Expired,
}

impl TokenStatus {
    /// Returns true if the token is usable.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    /// Get a user-friendly display message.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::NotAuthenticated => "Not authenticated".to_string(),
            Self::Valid { seconds_remaining } => {
                let secs = *seconds_remaining;
                if secs > 3600 {
                    format!("Valid for {} hours", secs / 3600)
                } else if secs > 60 {
                    format!("Valid for {} minutes", secs / 60)
                } else {
                    format!("Valid for {secs} seconds")
                }
            }
            Self::Expired => "Expired".to_string(),
        }
    }
}
