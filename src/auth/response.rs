//! Typed decoding of authority responses.

use serde::Deserialize;
use serde_json::Value;

use super::error::AuthError;
use super::token::TokenGrant;

/// Error code the token endpoint returns while the user has not yet acted.
pub const AUTHORIZATION_PENDING: &str = "authorization_pending";

/// RFC 8628 default polling interval when the authority omits one.
const DEFAULT_INTERVAL_SECS: u64 = 5;

/// Token endpoint answer, decoded at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenResponse {
    Success(TokenGrant),
    Failure {
        code: String,
        description: Option<String>,
    },
}

impl TokenResponse {
    /// Decode a token endpoint body.
    ///
    /// Authorities answer OAuth failures with a 4xx status and a structured
    /// body, so the body is inspected before the status.
    pub fn decode(status: u16, body: &str) -> Result<Self, AuthError> {
        let raw: RawTokenResponse = match serde_json::from_str(body) {
            Ok(raw) => raw,
            Err(err) if is_success(status) => {
                return Err(AuthError::InvalidResponse(format!(
                    "Token response is not valid JSON: {err}"
                )));
            }
            Err(_) => {
                return Err(AuthError::InvalidResponse(format!(
                    "Token request failed with status {status}"
                )));
            }
        };
        if let Some(error) = raw.error {
            let (code, description) = error.into_parts(raw.error_description);
            return Ok(Self::Failure { code, description });
        }
        match raw.access_token {
            Some(access_token) if is_success(status) => {
                let expires_at = raw
                    .expires_on
                    .as_ref()
                    .map(parse_seconds)
                    .transpose()?
                    .ok_or_else(|| {
                        AuthError::InvalidResponse("Token response expires_on missing".to_string())
                    })?;
                let expires_at = i64::try_from(expires_at).map_err(|_| {
                    AuthError::InvalidResponse(format!(
                        "Token response expires_on out of range: {expires_at}"
                    ))
                })?;
                Ok(Self::Success(TokenGrant {
                    access_token,
                    refresh_token: raw.refresh_token,
                    expires_at,
                }))
            }
            _ if !is_success(status) => Err(AuthError::InvalidResponse(format!(
                "Token request failed with status {status}"
            ))),
            _ => Err(AuthError::InvalidResponse(
                "Token response missing token and error".to_string(),
            )),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Failure { code, .. } if code == AUTHORIZATION_PENDING)
    }

    /// Collapse into the grant, surfacing failures as
    /// [`AuthError::AuthorizationFailed`].
    pub fn into_grant(self) -> Result<TokenGrant, AuthError> {
        match self {
            Self::Success(grant) => Ok(grant),
            Self::Failure { code, description } => {
                Err(AuthError::AuthorizationFailed { code, description })
            }
        }
    }
}

/// Device-code endpoint answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCodeResponse {
    pub interval_secs: u64,
    pub device_code: String,
    /// Human-readable instructions with the verification URL and user code.
    pub message: String,
}

impl DeviceCodeResponse {
    pub fn decode(status: u16, body: &str) -> Result<Self, AuthError> {
        let raw: RawDeviceCodeResponse = serde_json::from_str(body).map_err(|err| {
            if is_success(status) {
                AuthError::InvalidResponse(format!("Device code response is not valid JSON: {err}"))
            } else {
                AuthError::InvalidResponse(format!(
                    "Device code request failed with status {status}"
                ))
            }
        })?;
        if let Some(error) = raw.error {
            let (code, description) = error.into_parts(raw.error_description);
            return Err(AuthError::AuthorizationFailed { code, description });
        }
        if !is_success(status) {
            return Err(AuthError::InvalidResponse(format!(
                "Device code request failed with status {status}"
            )));
        }
        let device_code = raw.device_code.ok_or_else(|| {
            AuthError::InvalidResponse("Device code response missing device_code".to_string())
        })?;
        let interval_secs = match raw.interval.as_ref() {
            Some(value) => parse_seconds(value)?,
            None => DEFAULT_INTERVAL_SECS,
        };
        Ok(Self {
            interval_secs: interval_secs.max(1),
            device_code,
            message: raw.message.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawTokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_on: Option<Value>,
    error: Option<RawError>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDeviceCodeResponse {
    interval: Option<Value>,
    device_code: Option<String>,
    message: Option<String>,
    error: Option<RawError>,
    error_description: Option<String>,
}

/// Authorities nest the error object or flatten it next to the description.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawError {
    Code(String),
    Detail {
        error: String,
        #[serde(default)]
        error_description: Option<String>,
    },
}

impl RawError {
    fn into_parts(self, outer_description: Option<String>) -> (String, Option<String>) {
        match self {
            Self::Code(code) => (code, outer_description),
            Self::Detail {
                error,
                error_description,
            } => (error, error_description.or(outer_description)),
        }
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Seconds arrive as JSON numbers or as decimal strings.
fn parse_seconds(value: &Value) -> Result<u64, AuthError> {
    if let Some(num) = value.as_u64() {
        return Ok(num);
    }
    if let Some(text) = value.as_str() {
        return text.trim().parse().map_err(|_| {
            AuthError::InvalidResponse(format!("Invalid seconds value: {text}"))
        });
    }
    Err(AuthError::InvalidResponse(format!(
        "Invalid seconds value: {value}"
    )))
}
