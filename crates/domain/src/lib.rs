//! ApiProbe Domain - Core types
//!
//! This crate defines the request/response descriptors and the
//! authentication model shared by the auth-aware request pipeline.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod error;
pub mod provider;
pub mod request;
pub mod response;

pub use auth::{AttemptPhase, AuthAttemptState, Credentials, TokenRecord, token_preview};
pub use error::{DomainError, DomainResult};
pub use provider::{
    CredentialPlacement, LoginEndpoint, ProviderConfig, ProviderRegistry, TokenPersistence,
};
pub use request::{AUTHORIZATION, DEFAULT_TIMEOUT_MS, Header, Headers, HttpMethod, RequestSpec};
pub use response::ResponseSpec;
