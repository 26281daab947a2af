mod error;
pub mod models;

pub use error::GatewayError;

use chrono::Utc;
use models::{ConvertRequest, ConvertResponse, StatusResponse};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tunelift_auth::{is_valid, TokenStore, EXPIRY_SKEW};

/// Backend surface the app layer is generic over, so session and workflow
/// logic can be driven by a mock without a network.
#[allow(async_fn_in_trait)]
pub trait Api {
    async fn auth_status(&self) -> Result<StatusResponse, GatewayError>;
    async fn convert(&self, request: &ConvertRequest) -> Result<ConvertResponse, GatewayError>;
}

/// Single choke point for every backend call: loads the stored credential,
/// injects bearer authorization, and resolves every failure into a typed
/// `GatewayError`. It never retries and never performs token refresh.
#[derive(Clone)]
pub struct GatewayClient {
    http_client: Client,
    base_url: String,
    tokens: TokenStore,
}

impl GatewayClient {
    pub fn new(base_url: String, tokens: TokenStore) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            base_url,
            tokens,
        }
    }

    /// The authorization-initiation endpoint. Not fetched programmatically;
    /// the browser is navigated to it and control resumes via the callback.
    pub fn login_url(&self) -> String {
        format!("{}/api/auth/login", self.base_url)
    }

    /// Bearer token for the next dispatch. A credential past its expiry
    /// window is already dead (no refresh is implemented), so it is
    /// discarded and the call goes out unauthenticated.
    fn bearer_token(&self) -> Option<String> {
        match self.tokens.load() {
            Ok(Some(credential)) => {
                if is_valid(&credential, Utc::now(), EXPIRY_SKEW) {
                    Some(credential.access_token)
                } else {
                    tracing::debug!("Stored credential expired, discarding");
                    if let Err(e) = self.tokens.clear() {
                        tracing::warn!(error = %e, "Failed to discard expired credential");
                    }
                    None
                }
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read token store");
                None
            }
        }
    }

    async fn dispatch<T>(&self, request: reqwest::RequestBuilder) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
    {
        let request = match self.bearer_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("Backend rejected the session, clearing stored credential");
            if let Err(e) = self.tokens.clear() {
                tracing::warn!(error = %e, "Failed to clear token store after 401");
            }
            return Err(GatewayError::SessionExpired);
        }

        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Unreachable(e.to_string()))?;

        if !status.is_success() {
            return Err(GatewayError::RequestFailed {
                status: status.as_u16(),
                message: error::error_message(status.as_u16(), &body),
            });
        }

        serde_json::from_str(&body).map_err(|e| GatewayError::RequestFailed {
            status: status.as_u16(),
            message: format!("Invalid response body: {}", e),
        })
    }
}

impl Api for GatewayClient {
    async fn auth_status(&self) -> Result<StatusResponse, GatewayError> {
        let url = format!("{}/api/auth/status", self.base_url);
        self.dispatch(self.http_client.get(&url)).await
    }

    async fn convert(&self, request: &ConvertRequest) -> Result<ConvertResponse, GatewayError> {
        let url = format!("{}/api/convert", self.base_url);
        self.dispatch(self.http_client.post(&url).json(request)).await
    }
}
