//! Configuration (layered: code > env > defaults).

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, TenantError};

pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com/common";
pub const DEFAULT_CLIENT_ID: &str = "9bc3ab49-b65d-410a-85ad-de819febfddc";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client settings for the authority and local session storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantConfig {
    authority: String,
    token_url: Option<String>,
    device_code_url: Option<String>,
    client_id: String,
    request_timeout: Duration,
    session_dir: PathBuf,
}

impl Default for TenantConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TenantConfig {
    /// Built-in defaults, ignoring the environment.
    pub fn new() -> Self {
        Self {
            authority: DEFAULT_AUTHORITY.to_string(),
            token_url: None,
            device_code_url: None,
            client_id: DEFAULT_CLIENT_ID.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            session_dir: default_session_dir(),
        }
    }

    /// Load from `TENANTCTL_*` environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::new();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(authority) = non_empty("TENANTCTL_AUTHORITY") {
            config.authority = authority;
        }
        config.token_url = non_empty("TENANTCTL_TOKEN_URL");
        config.device_code_url = non_empty("TENANTCTL_DEVICE_CODE_URL");
        if let Some(client_id) = non_empty("TENANTCTL_CLIENT_ID") {
            config.client_id = client_id;
        }
        if let Some(raw) = non_empty("TENANTCTL_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                TenantError::Configuration(format!("TENANTCTL_TIMEOUT_SECS is not a number: {raw}"))
            })?;
            if secs == 0 {
                return Err(TenantError::Configuration(
                    "TENANTCTL_TIMEOUT_SECS must be positive".to_string(),
                ));
            }
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(dir) = non_empty("TENANTCTL_HOME") {
            config.session_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = authority.into();
        self
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = Some(url.into());
        self
    }

    pub fn with_device_code_url(mut self, url: impl Into<String>) -> Self {
        self.device_code_url = Some(url.into());
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_session_dir(mut self, dir: PathBuf) -> Self {
        self.session_dir = dir;
        self
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn token_url(&self) -> String {
        self.token_url
            .clone()
            .unwrap_or_else(|| format!("{}/oauth2/token", self.authority.trim_end_matches('/')))
    }

    pub fn device_code_url(&self) -> String {
        self.device_code_url.clone().unwrap_or_else(|| {
            format!("{}/oauth2/devicecode", self.authority.trim_end_matches('/'))
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn session_dir(&self) -> &PathBuf {
        &self.session_dir
    }
}

fn default_session_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".tenantctl"))
        .unwrap_or_else(|| PathBuf::from(".tenantctl"))
}
