#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tenantctl::auth::{HttpAuthClient, ManualClock, TokenManager, TokenStore};
use wiremock::MockServer;

pub const NOW: i64 = 1_700_000_000;
pub const GRAPH: &str = "https://graph.example.com";
pub const TOKEN_PATH: &str = "/common/oauth2/token";
pub const DEVICE_CODE_PATH: &str = "/common/oauth2/devicecode";
pub const CLIENT_ID: &str = "test-client";

pub fn http_client(server: &MockServer, timeout: Duration) -> HttpAuthClient {
    HttpAuthClient::new(timeout)
        .expect("http client")
        .with_client_id(CLIENT_ID)
        .with_token_url(format!("{}{TOKEN_PATH}", server.uri()))
        .with_device_code_url(format!("{}{DEVICE_CODE_PATH}", server.uri()))
}

pub fn manager(server: &MockServer, clock: &Arc<ManualClock>) -> TokenManager {
    TokenManager::new(Arc::new(http_client(server, Duration::from_secs(5))))
        .with_clock(clock.clone())
        .with_prompt(|_| {})
}

pub fn holding(access_token: &str, refresh_token: Option<&str>, expires_at: i64) -> TokenStore {
    TokenStore {
        connected: true,
        resource: GRAPH.to_string(),
        access_token: access_token.to_string(),
        refresh_token: refresh_token.map(str::to_string),
        expires_at,
    }
}

pub fn token_body(access_token: &str, refresh_token: &str, expires_on: i64) -> Value {
    json!({
        "token_type": "Bearer",
        "access_token": access_token,
        "refresh_token": refresh_token,
        "expires_on": expires_on.to_string(),
    })
}

pub fn error_body(code: &str, description: &str) -> Value {
    json!({"error": {"error": code, "error_description": description}})
}

/// `application/x-www-form-urlencoded` rendering of a URL value.
pub fn form_encoded(value: &str) -> String {
    value.replace(':', "%3A").replace('/', "%2F")
}
