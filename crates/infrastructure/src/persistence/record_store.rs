//! Durable record stores.
//!
//! Each slot is one JSON file, `<dir>/<slot>.json`:
//! ```json
//! {
//!   "providerKey": "reqres",
//!   "token": "QpwL5tke4Pnpja7X4",
//!   "tokenExpiresAt": 1700003600000
//! }
//! ```

use std::path::{Path, PathBuf};

use apiprobe_application::ports::{FileSystem, FileSystemError, RecordStore, RecordStoreError};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};
use uuid::Uuid;

/// Encodes a record as 2-space indented JSON with a trailing newline.
fn to_json_pretty_bytes(value: &Value) -> Result<Vec<u8>, RecordStoreError> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"  ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| RecordStoreError::Serialization(e.to_string()))?;
    buffer.push(b'\n');
    Ok(buffer)
}

/// Slot names become file names, so only `[A-Za-z0-9_-]` is accepted.
fn validate_slot(slot: &str) -> Result<(), RecordStoreError> {
    let valid = !slot.is_empty()
        && slot
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(RecordStoreError::InvalidSlot(slot.to_string()))
    }
}

/// Record store writing one JSON file per slot under a directory.
///
/// Writes go to a uniquely named temporary file that is then renamed over
/// the slot file, so a concurrent reader sees either the old or the new
/// record. Concurrent writers: last rename wins.
#[derive(Debug, Clone)]
pub struct FileRecordStore<F> {
    fs: F,
    dir: PathBuf,
}

impl<F: FileSystem> FileRecordStore<F> {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    pub fn new(fs: F, dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            dir: dir.into(),
        }
    }

    /// Directory holding the slot files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, slot: &str) -> Result<PathBuf, RecordStoreError> {
        validate_slot(slot)?;
        Ok(self.dir.join(format!("{slot}.json")))
    }
}

#[async_trait]
impl<F: FileSystem> RecordStore for FileRecordStore<F> {
    async fn read_record(&self, slot: &str) -> Result<Option<Value>, RecordStoreError> {
        let path = self.slot_path(slot)?;
        let content = match self.fs.read_file(&path).await {
            Ok(content) => content,
            Err(FileSystemError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(RecordStoreError::Io(e.into())),
        };

        let value: Value = serde_json::from_slice(&content)
            .map_err(|e| RecordStoreError::Serialization(format!("{}: {e}", path.display())))?;
        if !value.is_object() {
            return Err(RecordStoreError::Serialization(format!(
                "{}: expected a JSON object",
                path.display()
            )));
        }
        Ok(Some(value))
    }

    async fn write_record(&self, slot: &str, record: &Value) -> Result<(), RecordStoreError> {
        let path = self.slot_path(slot)?;
        let content = to_json_pretty_bytes(record)?;
        let temp = self.dir.join(format!(".{slot}.{}.tmp", Uuid::new_v4()));

        self.fs
            .write_file(&temp, &content)
            .await
            .map_err(|e| RecordStoreError::Io(e.into()))?;

        if let Err(e) = self.fs.rename(&temp, &path).await {
            if let Err(cleanup) = self.fs.remove_file(&temp).await {
                tracing::debug!(path = %temp.display(), error = %cleanup, "failed to remove temporary record");
            }
            return Err(RecordStoreError::Io(e.into()));
        }
        tracing::debug!(slot, path = %path.display(), "record written");
        Ok(())
    }

    async fn remove_record(&self, slot: &str) -> Result<(), RecordStoreError> {
        let path = self.slot_path(slot)?;
        match self.fs.remove_file(&path).await {
            Ok(()) | Err(FileSystemError::NotFound(_)) => Ok(()),
            Err(e) => Err(RecordStoreError::Io(e.into())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::TokioFileSystem;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> FileRecordStore<TokioFileSystem> {
        FileRecordStore::new(TokioFileSystem::new(), dir.path().join("tokens"))
    }

    #[tokio::test]
    async fn test_missing_slot_reads_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store(&dir).read_record("reqres").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let record = json!({"providerKey": "reqres", "token": "abc123", "tokenExpiresAt": 1_700_003_600_000_i64});

        store.write_record("reqres", &record).await.unwrap();

        assert_eq!(store.read_record("reqres").await.unwrap(), Some(record));
        let text = std::fs::read_to_string(dir.path().join("tokens/reqres.json")).unwrap();
        assert!(text.starts_with("{\n  \""));
        assert!(text.ends_with("}\n"));
    }

    #[tokio::test]
    async fn test_write_leaves_no_temporary_files() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.write_record("reqres", &json!({"token": "a"})).await.unwrap();
        store.write_record("reqres", &json!({"token": "b"})).await.unwrap();

        let names: Vec<String> = std::fs::read_dir(store.dir())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["reqres.json".to_string()]);
        assert_eq!(
            store.read_record("reqres").await.unwrap(),
            Some(json!({"token": "b"}))
        );
    }

    #[tokio::test]
    async fn test_malformed_record_is_serialization_error() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(store.dir().join("reqres.json"), "{not json").unwrap();

        assert!(matches!(
            store.read_record("reqres").await,
            Err(RecordStoreError::Serialization(_))
        ));

        std::fs::write(store.dir().join("reqres.json"), "[1, 2]").unwrap();
        assert!(matches!(
            store.read_record("reqres").await,
            Err(RecordStoreError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.write_record("reqres", &json!({})).await.unwrap();

        store.remove_record("reqres").await.unwrap();
        store.remove_record("reqres").await.unwrap();

        assert_eq!(store.read_record("reqres").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rejects_path_like_slots() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        for slot in ["", "../escape", "a/b", "dot.ted"] {
            assert!(matches!(
                store.write_record(slot, &json!({})).await,
                Err(RecordStoreError::InvalidSlot(_))
            ));
        }
    }
}
