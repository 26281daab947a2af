use crate::conversion::{ConversionResult, ConversionWorkflow};
use crate::session::SessionController;
use crate::settings::Settings;
use tunelift_api::{Api, GatewayClient, GatewayError};
use tunelift_auth::{AuthError, TokenStore};

/// Composition-root state object: owns the gateway, the session controller,
/// and the conversion workflow, and is passed by reference to whatever
/// renders it.
pub struct AppContext<A: Api> {
    api: A,
    login_url: String,
    pub session: SessionController,
    pub workflow: ConversionWorkflow,
}

impl AppContext<GatewayClient> {
    pub fn new(settings: &Settings) -> Result<Self, AuthError> {
        let tokens = TokenStore::new()?;
        let api = GatewayClient::new(settings.server_url.clone(), tokens.clone());
        let login_url = api.login_url();
        Ok(Self::with_api(api, tokens, login_url))
    }
}

impl<A: Api> AppContext<A> {
    /// Assemble a context around an arbitrary backend, the seam the test
    /// harness uses.
    pub fn with_api(api: A, tokens: TokenStore, login_url: String) -> Self {
        Self {
            api,
            login_url,
            session: SessionController::new(tokens),
            workflow: ConversionWorkflow::new(),
        }
    }

    pub async fn check_status(&mut self) {
        self.session.check_status(&self.api).await;
    }

    pub fn login(&mut self) -> Result<(), AuthError> {
        self.session.begin_login(&self.login_url)
    }

    pub async fn complete_login(&mut self, redirect: &str) -> Result<(), AuthError> {
        self.session.complete_login(&self.api, redirect).await
    }

    /// Submit a conversion. Refused without a network call while logged out;
    /// a session that died between render and submit is threaded back to the
    /// controller so state transitions exactly once.
    pub async fn convert(
        &mut self,
        playlist_url: &str,
        playlist_name: Option<&str>,
    ) -> Option<&ConversionResult> {
        if !self.session.is_logged_in() {
            tracing::debug!("Refusing conversion while logged out");
            return None;
        }

        if let Err(GatewayError::SessionExpired) = self
            .workflow
            .submit(&self.api, playlist_url, playlist_name)
            .await
        {
            self.session.expire();
        }

        self.workflow.last()
    }

    /// Local logout: drop the credential, the session state, and any prior
    /// conversion result. Never touches the network.
    pub fn logout(&mut self) -> Result<(), AuthError> {
        self.workflow.reset();
        self.session.logout()
    }
}
