//! Durable record store port
//!
//! A named slot holds one small JSON object. Several processes may share
//! the same store; the last writer wins.

use async_trait::async_trait;
use serde_json::Value;

/// Errors that can occur while reading or writing a record.
#[derive(Debug, thiserror::Error)]
pub enum RecordStoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored bytes are not a JSON document.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The slot name cannot be mapped to storage.
    #[error("Invalid slot name: {0}")]
    InvalidSlot(String),
}

/// Repository trait for durable records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Reads the record in a slot. Returns `Ok(None)` if the slot is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot exists but cannot be read or parsed.
    async fn read_record(&self, slot: &str) -> Result<Option<Value>, RecordStoreError>;

    /// Replaces the record in a slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    async fn write_record(&self, slot: &str, record: &Value) -> Result<(), RecordStoreError>;

    /// Deletes the record in a slot. Removing an empty slot is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the record exists but cannot be removed.
    async fn remove_record(&self, slot: &str) -> Result<(), RecordStoreError>;
}
