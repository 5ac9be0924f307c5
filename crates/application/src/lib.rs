//! ApiProbe Application - Auth pipeline and ports
//!
//! This crate defines the application layer with:
//! - Port traits (interfaces for external dependencies)
//! - Token lifecycle: cache, login, interception and 401 retry
//! - Application-level error handling

pub mod auth;
pub mod error;
pub mod execute_request;
pub mod ports;

#[cfg(test)]
mod test_support;

pub use auth::{
    AuthGateway, GatewaySettings, LoginRetryPolicy, RequestInterceptor, RetryOnAuthFailure,
    StaticCredentialProvider, TokenStatus, TokenStore,
};
pub use error::AuthError;
pub use execute_request::{ExecuteRequest, ExecuteRequestError, ExecuteResult};
pub use ports::{
    Clock, CredentialProvider, FileSystem, FileSystemError, HttpTransport, RecordStore,
    RecordStoreError, TransportError, TransportResult,
};
