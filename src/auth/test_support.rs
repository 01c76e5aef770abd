//! Scripted transport and clocks shared by the auth unit tests.

use std::collections::VecDeque;
use std::future;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::client::{AuthTransport, TokenRequest};
use super::clock::Clock;
use super::error::AuthError;
use super::response::{DeviceCodeResponse, TokenResponse};
use super::token::TokenGrant;

#[derive(Default)]
pub struct ScriptedTransport {
    device_codes: Mutex<VecDeque<Result<DeviceCodeResponse, AuthError>>>,
    tokens: Mutex<VecDeque<Result<TokenResponse, AuthError>>>,
    device_code_requests: Mutex<Vec<String>>,
    token_requests: Mutex<Vec<String>>,
    latency: Option<Duration>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device_code(self, response: DeviceCodeResponse) -> Self {
        self.device_codes.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn with_device_code_error(self, error: AuthError) -> Self {
        self.device_codes.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn with_token(self, response: TokenResponse) -> Self {
        self.tokens.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn with_token_error(self, error: AuthError) -> Self {
        self.tokens.lock().unwrap().push_back(Err(error));
        self
    }

    /// Delay every token answer, so concurrent callers overlap.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn device_code_requests(&self) -> Vec<String> {
        self.device_code_requests.lock().unwrap().clone()
    }

    /// Requests as `grant_type:credential`.
    pub fn token_requests(&self) -> Vec<String> {
        self.token_requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.device_code_requests().len() + self.token_requests().len()
    }
}

#[async_trait]
impl AuthTransport for ScriptedTransport {
    async fn request_device_code(&self, resource: &str) -> Result<DeviceCodeResponse, AuthError> {
        self.device_code_requests
            .lock()
            .unwrap()
            .push(resource.to_string());
        self.device_codes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AuthError::InvalidResponse("unscripted device code".into())))
    }

    async fn request_token(&self, request: TokenRequest<'_>) -> Result<TokenResponse, AuthError> {
        let credential = match request {
            TokenRequest::RefreshToken { refresh_token, .. } => refresh_token,
            TokenRequest::DeviceCode { device_code, .. } => device_code,
        };
        self.token_requests
            .lock()
            .unwrap()
            .push(format!("{}:{credential}", request.grant_type()));
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.tokens
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AuthError::InvalidResponse("unscripted token".into())))
    }
}

/// A clock whose sleep never finishes.
pub struct StalledClock;

#[async_trait]
impl Clock for StalledClock {
    fn now(&self) -> i64 {
        0
    }

    async fn sleep(&self, _duration: Duration) {
        future::pending::<()>().await;
    }
}

pub fn device_code(interval_secs: u64, code: &str, message: &str) -> DeviceCodeResponse {
    DeviceCodeResponse {
        interval_secs,
        device_code: code.to_string(),
        message: message.to_string(),
    }
}

pub fn grant(access_token: &str, refresh_token: Option<&str>, expires_at: i64) -> TokenGrant {
    TokenGrant {
        access_token: access_token.to_string(),
        refresh_token: refresh_token.map(str::to_string),
        expires_at,
    }
}

pub fn success(access_token: &str, refresh_token: Option<&str>, expires_at: i64) -> TokenResponse {
    TokenResponse::Success(grant(access_token, refresh_token, expires_at))
}

pub fn pending() -> TokenResponse {
    failure("authorization_pending", "waiting for the user")
}

pub fn failure(code: &str, description: &str) -> TokenResponse {
    TokenResponse::Failure {
        code: code.to_string(),
        description: Some(description.to_string()),
    }
}
