//! Token lifecycle and the auth pipeline around outbound requests.
//!
//! - [`TokenStore`] caches tokens per provider, optionally shared with other processes
//! - [`AuthGateway`] logs in and refreshes
//! - [`RequestInterceptor`] attaches bearer tokens before sending
//! - [`RetryOnAuthFailure`] re-authenticates once after a 401

mod credentials;
pub(crate) mod gateway;
mod interceptor;
mod retry;
mod token_store;

pub use credentials::StaticCredentialProvider;
pub use gateway::{
    AuthGateway, DEFAULT_LOGIN_TIMEOUT_MS, DEFAULT_TOKEN_TTL_SECONDS, GatewaySettings,
    LoginRetryPolicy,
};
pub use interceptor::RequestInterceptor;
pub use retry::RetryOnAuthFailure;
pub use token_store::{TokenStatus, TokenStore};
