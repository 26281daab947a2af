mod callback;
mod credential;
mod error;
mod expiry;
mod token_store;

pub use callback::{handle_callback, CallbackOutcome};
pub use credential::Credential;
pub use error::AuthError;
pub use expiry::{is_valid, EXPIRY_SKEW};
pub use token_store::TokenStore;
