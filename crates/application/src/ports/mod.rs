//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the auth pipeline and the outside
//! world. Each port is a trait implemented by adapters in the
//! infrastructure layer, or by mocks in tests.

mod clock;
mod credentials;
mod file_system;
mod record_store;
mod transport;

pub use clock::Clock;
pub use credentials::CredentialProvider;
pub use file_system::{FileSystem, FileSystemError};
pub use record_store::{RecordStore, RecordStoreError};
pub use transport::{HttpTransport, TransportError, TransportResult};
