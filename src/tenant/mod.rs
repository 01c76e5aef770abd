//! Authenticated calls against the tenant service.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use tracing::debug;

use crate::auth::{resource_from_url, TokenManager};
use crate::error::{Result, TenantError};

/// Issues tenant service requests with a bearer token for the URL's origin.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use tenantctl::auth::{HttpAuthClient, TokenManager};
/// use tenantctl::tenant::TenantClient;
///
/// # async fn example() -> tenantctl::error::Result<()> {
/// let tokens = Arc::new(TokenManager::new(Arc::new(HttpAuthClient::new(Duration::from_secs(30))?)));
/// let client = TenantClient::new(tokens, Duration::from_secs(30))?;
/// let web = client.get("https://contoso.sharepoint.com/_api/web").await?;
/// println!("{web}");
/// # Ok(())
/// # }
/// ```
pub struct TenantClient {
    http: reqwest::Client,
    tokens: Arc<TokenManager>,
}

impl TenantClient {
    pub fn new(tokens: Arc<TokenManager>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, tokens })
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    /// GET `url` and decode its JSON body.
    pub async fn get(&self, url: &str) -> Result<serde_json::Value> {
        if !url.starts_with("https://") && !url.starts_with("http://") {
            return Err(TenantError::InvalidArgument(format!(
                "expected an absolute http(s) URL, got {url}"
            )));
        }
        let resource = resource_from_url(url);
        let token = self.tokens.ensure_access_token(resource).await?;
        debug!(url, resource, "GET");
        let resp = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .bearer_auth(token)
            .send()
            .await?;
        let status = resp.status();
        debug!(url, status = status.as_u16(), "response");
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TenantError::api(status.as_u16(), error_message(status, &body)));
        }
        let body = resp.text().await?;
        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

/// Prefer the service's own error message over the raw body.
fn error_message(status: StatusCode, body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let message = parsed.as_ref().and_then(|json| {
        json.pointer("/error/message/value")
            .or_else(|| json.pointer("/error/message"))
            .or_else(|| json.pointer("/error_description"))
            .and_then(|value| value.as_str())
            .map(str::to_string)
    });
    match message {
        Some(message) => message,
        None if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
        None => body.trim().to_string(),
    }
}
