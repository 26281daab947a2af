use chrono::Utc;
use tunelift_api::models::User;
use tunelift_api::{Api, GatewayError};
use tunelift_auth::{handle_callback, is_valid, AuthError, CallbackOutcome, TokenStore, EXPIRY_SKEW};

/// Externally visible session state. Mutated only by the session controller;
/// the view layer just reads it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    LoggedOut,
    #[default]
    Authenticating,
    LoggedIn(User),
}

/// Discards completions of requests that are no longer the latest.
///
/// Nothing here cancels an in-flight call; a flow that resolves after a newer
/// one began simply has its result dropped instead of overwriting state.
#[derive(Debug, Default)]
pub struct RequestTracker {
    seq: u64,
}

impl RequestTracker {
    pub fn begin(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    pub fn is_current(&self, seq: u64) -> bool {
        seq == self.seq
    }

    /// Invalidate all outstanding requests, e.g. on logout.
    pub fn invalidate(&mut self) {
        self.seq += 1;
    }
}

/// Owns the `LoggedOut → Authenticating → LoggedIn` state machine and the
/// one-time notice carried back from a failed login.
pub struct SessionController {
    tokens: TokenStore,
    state: SessionState,
    notice: Option<String>,
    tracker: RequestTracker,
}

impl SessionController {
    pub fn new(tokens: TokenStore) -> Self {
        Self {
            tokens,
            state: SessionState::Authenticating,
            notice: None,
            tracker: RequestTracker::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self.state, SessionState::LoggedIn(_))
    }

    /// One-time notice for display. Consuming it means a refresh does not
    /// repeat it.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Verify the session against the backend.
    ///
    /// An absent or expired credential short-circuits to `LoggedOut` without
    /// a network call, since an unauthenticated round trip would only be
    /// rejected.
    pub async fn check_status<A: Api>(&mut self, api: &A) {
        let seq = self.tracker.begin();

        let credential = self.tokens.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to read token store");
            None
        });
        let usable = credential
            .map(|c| is_valid(&c, Utc::now(), EXPIRY_SKEW))
            .unwrap_or(false);
        if !usable {
            self.state = SessionState::LoggedOut;
            return;
        }

        let outcome = api.auth_status().await;
        if !self.tracker.is_current(seq) {
            tracing::debug!("Discarding stale status response");
            return;
        }

        match outcome {
            Ok(response) => match response.user {
                Some(user) => {
                    tracing::info!(user = %user.id, "Session verified");
                    self.state = SessionState::LoggedIn(user);
                }
                None => {
                    // A success without a user record is an invalid session.
                    tracing::warn!("Status response carried no user, clearing credential");
                    if let Err(e) = self.tokens.clear() {
                        tracing::warn!(error = %e, "Failed to clear token store");
                    }
                    self.state = SessionState::LoggedOut;
                }
            },
            Err(GatewayError::SessionExpired) => {
                // The gateway already cleared the store; moving state here is
                // the whole handling, no extra user-facing error.
                self.state = SessionState::LoggedOut;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Status check failed");
                self.state = SessionState::LoggedOut;
                self.notice = Some(e.to_string());
            }
        }
    }

    /// Full navigation handoff to the backend's authorization endpoint.
    /// Nothing returns here; control resumes via `complete_login` once the
    /// redirect lands.
    pub fn begin_login(&mut self, login_url: &str) -> Result<(), AuthError> {
        self.state = SessionState::Authenticating;
        tracing::info!(url = %login_url, "Opening browser for authorization");
        open::that(login_url)?;
        Ok(())
    }

    /// Process the OAuth redirect and resume session establishment.
    pub async fn complete_login<A: Api>(
        &mut self,
        api: &A,
        redirect: &str,
    ) -> Result<(), AuthError> {
        match handle_callback(&self.tokens, redirect)? {
            CallbackOutcome::Authorized => {
                self.check_status(api).await;
            }
            CallbackOutcome::Rejected { reason } => {
                self.tracker.invalidate();
                self.state = SessionState::LoggedOut;
                self.notice = Some(reason);
            }
        }
        Ok(())
    }

    /// Purely local: the backend authorizes solely by token presence, so
    /// dropping the credential is all a logout needs.
    pub fn logout(&mut self) -> Result<(), AuthError> {
        self.tracker.invalidate();
        self.tokens.clear()?;
        self.state = SessionState::LoggedOut;
        self.notice = None;
        tracing::info!("Logged out");
        Ok(())
    }

    /// Another flow observed `SessionExpired` from the gateway; transition
    /// state exactly once.
    pub fn expire(&mut self) {
        self.tracker.invalidate();
        self.state = SessionState::LoggedOut;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_current_only_for_latest_request() {
        let mut tracker = RequestTracker::default();
        let first = tracker.begin();
        assert!(tracker.is_current(first));

        let second = tracker.begin();
        assert!(!tracker.is_current(first));
        assert!(tracker.is_current(second));
    }

    #[test]
    fn tracker_invalidate_drops_outstanding_requests() {
        let mut tracker = RequestTracker::default();
        let seq = tracker.begin();
        tracker.invalidate();
        assert!(!tracker.is_current(seq));
    }
}
