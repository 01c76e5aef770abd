use thiserror::Error;

use crate::error::TenantError;

/// Failures surfaced by token acquisition and session persistence.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The authority rejected the grant with a non-pending error code.
    #[error("{code}")]
    AuthorizationFailed {
        code: String,
        description: Option<String>,
    },
    #[error("Device code authorization cancelled")]
    Cancelled,
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AuthError {
    pub fn authorization_failed(code: impl Into<String>, description: Option<String>) -> Self {
        Self::AuthorizationFailed {
            code: code.into(),
            description,
        }
    }

    /// Remote error code, when the failure came from the authority.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::AuthorizationFailed { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<toml::de::Error> for AuthError {
    fn from(error: toml::de::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::ser::Error> for AuthError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<AuthError> for TenantError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::AuthorizationFailed { code, description } => {
                TenantError::AuthorizationFailed { code, description }
            }
            AuthError::Cancelled => TenantError::Cancelled,
            AuthError::Network(message) => TenantError::Network(message),
            other => TenantError::Authentication(other.to_string()),
        }
    }
}
