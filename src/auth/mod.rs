//! OAuth token lifecycle: device-code and refresh-token flows, token caching
//! and session persistence.

pub mod client;
pub mod clock;
pub mod device_code;
pub mod error;
pub mod manager;
pub mod refresh;
pub mod resource;
pub mod response;
pub mod store;
pub mod token;

#[cfg(test)]
mod test_support;

pub use client::{AuthTransport, HttpAuthClient, TokenRequest};
pub use clock::{Clock, ManualClock, SystemClock};
pub use device_code::{DeviceAuthorizationSession, DeviceCodeFlow, DeviceCodeState, DevicePrompt};
pub use error::AuthError;
pub use manager::TokenManager;
pub use refresh::RefreshFlow;
pub use resource::resource_from_url;
pub use response::{DeviceCodeResponse, TokenResponse, AUTHORIZATION_PENDING};
pub use store::{FileSessionStore, SessionStore};
pub use token::{TokenGrant, TokenStore, NO_EXPIRY};
