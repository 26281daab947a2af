use chrono::{serde::ts_milliseconds_option, DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Credential triple issued by the OAuth redirect and held by the token store.
///
/// `expires_at` is the issue time plus the issuer's `expires_in` lifetime.
/// A credential without a recorded expiry is never considered valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default, with = "ts_milliseconds_option")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// Build a credential from freshly issued material.
    pub fn issued(
        access_token: String,
        refresh_token: Option<String>,
        expires_in_secs: i64,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at: Some(issued_at + Duration::seconds(expires_in_secs)),
        }
    }
}
