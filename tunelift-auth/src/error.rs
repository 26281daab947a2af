use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Token storage error: {0}")]
    Storage(String),

    #[error("Incomplete credential: an access token and expiry are required")]
    MalformedCredential,

    #[error("Login failed: {reason}.")]
    RedirectError { reason: String },

    #[error("Login failed: invalid callback.")]
    InvalidCallback,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
