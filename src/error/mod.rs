//! Error types for tenantctl.

use thiserror::Error;

/// Primary error type for tenant service operations.
#[derive(Error, Debug)]
pub enum TenantError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The authority rejected the grant; `code` is the OAuth error code.
    #[error("Authorization failed: {code}")]
    AuthorizationFailed {
        code: String,
        description: Option<String>,
    },

    #[error("Authorization cancelled")]
    Cancelled,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl TenantError {
    /// Create an API error from a status code and body text.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Whether the failure came from the user or the authority rather than
    /// the transport.
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::Authentication(_) | Self::AuthorizationFailed { .. } | Self::Cancelled
        ) || matches!(self, Self::Api { status: 401 | 403, .. })
    }
}

impl From<reqwest::Error> for TenantError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, TenantError>;
