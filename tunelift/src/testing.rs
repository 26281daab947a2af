use crate::context::AppContext;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tunelift_api::models::{ConvertRequest, ConvertResponse, StatusResponse};
use tunelift_api::{Api, GatewayError};
use tunelift_auth::TokenStore;

/// Scripted backend for tests: no network, counts calls, and mirrors the
/// real gateway's side effect of clearing the token store on a 401.
#[derive(Clone)]
pub struct MockApi {
    inner: Arc<Mutex<MockInner>>,
    tokens: TokenStore,
}

#[derive(Default)]
struct MockInner {
    status_response: Option<Result<StatusResponse, GatewayError>>,
    convert_response: Option<Result<ConvertResponse, GatewayError>>,
    status_calls: u32,
    convert_calls: u32,
}

impl MockApi {
    pub fn new(tokens: TokenStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockInner::default())),
            tokens,
        }
    }

    pub fn set_status(&self, response: Result<StatusResponse, GatewayError>) {
        self.inner.lock().unwrap().status_response = Some(response);
    }

    pub fn set_convert(&self, response: Result<ConvertResponse, GatewayError>) {
        self.inner.lock().unwrap().convert_response = Some(response);
    }

    pub fn status_calls(&self) -> u32 {
        self.inner.lock().unwrap().status_calls
    }

    pub fn convert_calls(&self) -> u32 {
        self.inner.lock().unwrap().convert_calls
    }

    fn expire_side_effect<T>(&self, result: &Result<T, GatewayError>) {
        // The real gateway clears the store when it observes a 401.
        if matches!(result, Err(GatewayError::SessionExpired)) {
            self.tokens.clear().unwrap();
        }
    }
}

impl Api for MockApi {
    async fn auth_status(&self) -> Result<StatusResponse, GatewayError> {
        let result = {
            let mut inner = self.inner.lock().unwrap();
            inner.status_calls += 1;
            inner
                .status_response
                .clone()
                .unwrap_or(Ok(StatusResponse::default()))
        };
        self.expire_side_effect(&result);
        result
    }

    async fn convert(&self, _request: &ConvertRequest) -> Result<ConvertResponse, GatewayError> {
        let result = {
            let mut inner = self.inner.lock().unwrap();
            inner.convert_calls += 1;
            inner
                .convert_response
                .clone()
                .unwrap_or(Ok(ConvertResponse::default()))
        };
        self.expire_side_effect(&result);
        result
    }
}

/// App context wired to a `MockApi`, with handles on the mock and the store
/// so scenarios can script responses and inspect persistence.
pub struct TestContext {
    pub ctx: AppContext<MockApi>,
    pub api: MockApi,
    pub tokens: TokenStore,
}

impl TestContext {
    /// `token_path` should point into a per-test temporary directory.
    pub fn new(token_path: PathBuf) -> Self {
        let tokens = TokenStore::at(token_path);
        let api = MockApi::new(tokens.clone());
        let ctx = AppContext::with_api(
            api.clone(),
            tokens.clone(),
            "http://localhost:8888/api/auth/login".to_string(),
        );
        Self { ctx, api, tokens }
    }
}
