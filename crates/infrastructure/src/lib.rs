//! ApiProbe Infrastructure - Adapters and wiring
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, environment settings, and the
//! bootstrap that assembles them.

pub mod adapters;
pub mod bootstrap;
pub mod config;
pub mod persistence;

pub use adapters::{ReqwestTransport, SystemClock};
pub use bootstrap::AuthStack;
pub use config::{PETSTORE, REQRES, ProviderSettings, Settings, SettingsError};
pub use persistence::{FileRecordStore, TokioFileSystem};
