//! File-backed persistence adapters.

mod file_system;
mod record_store;

pub use file_system::TokioFileSystem;
pub use record_store::FileRecordStore;
