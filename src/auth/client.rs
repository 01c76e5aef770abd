use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::error::AuthError;
use super::response::{DeviceCodeResponse, TokenResponse};
use crate::config::TenantConfig;

/// Grant presented to the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRequest<'a> {
    RefreshToken {
        resource: &'a str,
        refresh_token: &'a str,
    },
    DeviceCode {
        resource: &'a str,
        device_code: &'a str,
    },
}

impl<'a> TokenRequest<'a> {
    pub fn grant_type(&self) -> &'static str {
        match self {
            Self::RefreshToken { .. } => "refresh_token",
            Self::DeviceCode { .. } => "device_code",
        }
    }

    pub fn resource(&self) -> &'a str {
        match self {
            Self::RefreshToken { resource, .. } | Self::DeviceCode { resource, .. } => resource,
        }
    }

    fn credential(&self) -> (&'static str, &'a str) {
        match self {
            Self::RefreshToken { refresh_token, .. } => ("refresh_token", refresh_token),
            Self::DeviceCode { device_code, .. } => ("code", device_code),
        }
    }
}

/// Wire access to the authority's device-code and token endpoints.
#[async_trait]
pub trait AuthTransport: Send + Sync {
    async fn request_device_code(&self, resource: &str) -> Result<DeviceCodeResponse, AuthError>;
    async fn request_token(&self, request: TokenRequest<'_>) -> Result<TokenResponse, AuthError>;
}

/// reqwest-backed [`AuthTransport`].
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use tenantctl::auth::HttpAuthClient;
///
/// let client = HttpAuthClient::new(Duration::from_secs(30))?
///     .with_client_id("my-public-client")
///     .with_token_url("https://login.example.com/common/oauth2/token")
///     .with_device_code_url("https://login.example.com/common/oauth2/devicecode");
/// # Ok::<(), tenantctl::auth::AuthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct HttpAuthClient {
    client: reqwest::Client,
    client_id: String,
    token_url: String,
    device_code_url: String,
}

impl HttpAuthClient {
    /// Client with default endpoints; every request is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, AuthError> {
        let defaults = TenantConfig::new();
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            client_id: defaults.client_id().to_string(),
            token_url: defaults.token_url(),
            device_code_url: defaults.device_code_url(),
        })
    }

    pub fn from_config(config: &TenantConfig) -> Result<Self, AuthError> {
        Ok(Self::new(config.request_timeout())?
            .with_client_id(config.client_id())
            .with_token_url(config.token_url())
            .with_device_code_url(config.device_code_url()))
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn with_device_code_url(mut self, url: impl Into<String>) -> Self {
        self.device_code_url = url.into();
        self
    }
}

#[async_trait]
impl AuthTransport for HttpAuthClient {
    async fn request_device_code(&self, resource: &str) -> Result<DeviceCodeResponse, AuthError> {
        debug!(url = %self.device_code_url, resource, "requesting device code");
        let resp = self
            .client
            .get(&self.device_code_url)
            .header("Accept", "application/json")
            .query(&[("resource", resource), ("client_id", self.client_id.as_str())])
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        debug!(status, "device code response");
        DeviceCodeResponse::decode(status, &body)
    }

    async fn request_token(&self, request: TokenRequest<'_>) -> Result<TokenResponse, AuthError> {
        let grant_type = request.grant_type();
        let (credential_field, credential) = request.credential();
        debug!(
            url = %self.token_url,
            resource = request.resource(),
            grant_type,
            "requesting token"
        );
        let resp = self
            .client
            .post(&self.token_url)
            .header("Accept", "application/json")
            .header("Content-Type", "application/x-www-form-urlencoded")
            .form(&[
                ("resource", request.resource()),
                ("client_id", self.client_id.as_str()),
                ("grant_type", grant_type),
                (credential_field, credential),
            ])
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        let decoded = TokenResponse::decode(status, &body)?;
        match &decoded {
            TokenResponse::Success(grant) => {
                debug!(status, grant_type, expires_at = grant.expires_at, "token granted");
            }
            TokenResponse::Failure { code, .. } => {
                debug!(status, grant_type, code = %code, "token request refused");
            }
        }
        Ok(decoded)
    }
}
