//! Auth provider configuration: URL classification and login endpoints

mod config;
mod login;
mod registry;

pub use config::{ProviderConfig, TokenPersistence};
pub use login::{CredentialPlacement, LoginEndpoint};
pub use registry::ProviderRegistry;
