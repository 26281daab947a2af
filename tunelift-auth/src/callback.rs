use crate::credential::Credential;
use crate::error::AuthError;
use crate::token_store::TokenStore;
use chrono::Utc;

/// Result of processing the OAuth redirect.
///
/// `Rejected` carries the human-readable reason for one-time display; the
/// credential store is already cleared by the time it is returned.
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackOutcome {
    Authorized,
    Rejected { reason: String },
}

/// Process the OAuth redirect exactly once.
///
/// `redirect` may be the full redirect URL or just its fragment. The issuer
/// returns the credential material after the `#` so it never lands in server
/// logs or the referrer. Outcomes, in priority order: an `error` parameter
/// rejects and clears the store; an access token plus `expires_in` persists a
/// credential (refresh token optional); anything else is a malformed callback
/// and also rejects and clears.
pub fn handle_callback(store: &TokenStore, redirect: &str) -> Result<CallbackOutcome, AuthError> {
    let fragment = redirect
        .split_once('#')
        .map(|(_, fragment)| fragment)
        .unwrap_or(redirect);

    let params: Vec<(String, String)> = url::form_urlencoded::parse(fragment.as_bytes())
        .into_owned()
        .collect();
    let param = |key: &str| {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };

    if let Some(error) = param("error") {
        tracing::warn!(error = %error, "OAuth redirect reported an error");
        store.clear()?;
        let reason = error.replace('_', " ");
        return Ok(CallbackOutcome::Rejected {
            reason: AuthError::RedirectError { reason }.to_string(),
        });
    }

    let access_token = param("access_token").filter(|t| !t.is_empty());
    let expires_in = param("expires_in").and_then(|v| v.parse::<i64>().ok());

    match (access_token, expires_in) {
        (Some(access_token), Some(expires_in)) => {
            let refresh_token = param("refresh_token")
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            let credential = Credential::issued(
                access_token.to_string(),
                refresh_token,
                expires_in,
                Utc::now(),
            );
            store.save(&credential)?;
            tracing::info!("OAuth redirect accepted, credential stored");
            Ok(CallbackOutcome::Authorized)
        }
        _ => {
            tracing::warn!("OAuth redirect was missing required fields");
            store.clear()?;
            Ok(CallbackOutcome::Rejected {
                reason: AuthError::InvalidCallback.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tempfile::tempdir;

    fn store_in(dir: &tempfile::TempDir) -> TokenStore {
        TokenStore::at(dir.path().join("token.json"))
    }

    #[test]
    fn tokens_without_refresh_are_stored() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        let before = Utc::now();
        let outcome = handle_callback(&store, "access_token=A&expires_in=3600").unwrap();
        assert_eq!(outcome, CallbackOutcome::Authorized);

        let credential = store.load().unwrap().unwrap();
        assert_eq!(credential.access_token, "A");
        assert!(credential.refresh_token.is_none());

        let expires_at = credential.expires_at.unwrap();
        assert!(expires_at >= before + Duration::seconds(3600));
        assert!(expires_at <= Utc::now() + Duration::seconds(3600));
    }

    #[test]
    fn refresh_token_is_kept_when_present() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        handle_callback(&store, "access_token=A&refresh_token=R&expires_in=60").unwrap();

        let credential = store.load().unwrap().unwrap();
        assert_eq!(credential.refresh_token.as_deref(), Some("R"));
    }

    #[test]
    fn error_parameter_rejects_and_clears() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        // A credential from an earlier session must not survive the error.
        handle_callback(&store, "access_token=old&expires_in=3600").unwrap();

        let outcome = handle_callback(&store, "error=access_denied").unwrap();
        assert_eq!(
            outcome,
            CallbackOutcome::Rejected {
                reason: "Login failed: access denied.".to_string()
            }
        );
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn error_takes_priority_over_tokens() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        let outcome =
            handle_callback(&store, "error=server_error&access_token=A&expires_in=3600").unwrap();
        assert!(matches!(outcome, CallbackOutcome::Rejected { .. }));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn missing_fields_reject_as_invalid_callback() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        for fragment in ["", "access_token=A", "expires_in=3600", "expires_in=soon&access_token=A"] {
            let outcome = handle_callback(&store, fragment).unwrap();
            assert_eq!(
                outcome,
                CallbackOutcome::Rejected {
                    reason: "Login failed: invalid callback.".to_string()
                },
                "fragment: {fragment:?}"
            );
            assert!(store.load().unwrap().is_none());
        }
    }

    #[test]
    fn full_redirect_url_parses_like_a_bare_fragment() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        let url = "http://localhost:3000/auth/callback#access_token=A&expires_in=3600";
        assert_eq!(handle_callback(&store, url).unwrap(), CallbackOutcome::Authorized);
        assert_eq!(store.load().unwrap().unwrap().access_token, "A");
    }

    #[test]
    fn percent_encoded_values_are_decoded() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        handle_callback(&store, "access_token=a%2Bb&expires_in=3600").unwrap();
        assert_eq!(store.load().unwrap().unwrap().access_token, "a+b");
    }
}
