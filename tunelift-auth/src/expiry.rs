use crate::credential::Credential;
use chrono::{DateTime, Duration, Utc};

/// How early a token is treated as expired, so a request started just before
/// the deadline does not arrive at the backend already dead.
pub const EXPIRY_SKEW: Duration = Duration::seconds(60);

/// A credential is valid iff `now < expires_at - skew`. No recorded expiry
/// means invalid.
pub fn is_valid(credential: &Credential, now: DateTime<Utc>, skew: Duration) -> bool {
    match credential.expires_at {
        Some(expires_at) => now < expires_at - skew,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential_expiring_at(expires_at: Option<DateTime<Utc>>) -> Credential {
        Credential {
            access_token: "token".to_string(),
            refresh_token: None,
            expires_at,
        }
    }

    #[test]
    fn valid_well_before_expiry() {
        let now = Utc::now();
        let credential = credential_expiring_at(Some(now + Duration::hours(1)));
        assert!(is_valid(&credential, now, EXPIRY_SKEW));
    }

    #[test]
    fn invalid_at_and_after_expiry() {
        let now = Utc::now();
        let credential = credential_expiring_at(Some(now));
        assert!(!is_valid(&credential, now, EXPIRY_SKEW));

        let credential = credential_expiring_at(Some(now - Duration::seconds(1)));
        assert!(!is_valid(&credential, now, EXPIRY_SKEW));
    }

    #[test]
    fn invalid_inside_skew_window() {
        let now = Utc::now();
        // 59 seconds of lifetime left, one second inside the 60 second skew.
        let credential = credential_expiring_at(Some(now + Duration::seconds(59)));
        assert!(!is_valid(&credential, now, EXPIRY_SKEW));

        // Exactly on the skew boundary is still invalid.
        let credential = credential_expiring_at(Some(now + Duration::seconds(60)));
        assert!(!is_valid(&credential, now, EXPIRY_SKEW));

        // One second outside the window is valid again.
        let credential = credential_expiring_at(Some(now + Duration::seconds(61)));
        assert!(is_valid(&credential, now, EXPIRY_SKEW));
    }

    #[test]
    fn invalid_without_recorded_expiry() {
        let credential = credential_expiring_at(None);
        assert!(!is_valid(&credential, Utc::now(), EXPIRY_SKEW));
    }
}
