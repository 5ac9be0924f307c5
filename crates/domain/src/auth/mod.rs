//! Authentication domain types

mod attempt;
mod credentials;
mod token;

pub use attempt::{AttemptPhase, AuthAttemptState};
pub use credentials::Credentials;
pub use token::{TokenRecord, token_preview};
