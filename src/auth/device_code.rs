use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::client::{AuthTransport, TokenRequest};
use super::clock::Clock;
use super::error::AuthError;
use super::response::{DeviceCodeResponse, TokenResponse};
use super::token::TokenGrant;

/// Receives the authority's instructions (verification URL and user code).
pub type DevicePrompt = dyn Fn(&str) + Send + Sync;

/// A pending device authorization, alive from code issuance until the flow
/// reaches a terminal state.
#[derive(Debug, Clone)]
pub struct DeviceAuthorizationSession {
    pub interval: Duration,
    pub device_code: String,
    pub message: String,
    cancel: CancellationToken,
}

impl DeviceAuthorizationSession {
    fn new(response: DeviceCodeResponse, cancel: CancellationToken) -> Self {
        Self {
            interval: Duration::from_secs(response.interval_secs),
            device_code: response.device_code,
            message: response.message,
            cancel,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Device-code flow states.
#[derive(Debug)]
pub enum DeviceCodeState {
    Idle,
    CodeRequested,
    Polling {
        session: DeviceAuthorizationSession,
        ticks: u32,
    },
    Succeeded(TokenGrant),
    Failed(AuthError),
    Cancelled,
}

impl DeviceCodeState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::CodeRequested => "code_requested",
            Self::Polling { .. } => "polling",
            Self::Succeeded(_) => "succeeded",
            Self::Failed(_) => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_) | Self::Cancelled)
    }
}

/// Interactive device-code authorization.
///
/// Polls the token endpoint every advertised interval until the authority
/// grants a token or answers with an error other than
/// `authorization_pending`. The device code's own lifetime is enforced by
/// the authority, not here.
pub struct DeviceCodeFlow<'a> {
    transport: &'a dyn AuthTransport,
    clock: &'a dyn Clock,
    prompt: Option<&'a DevicePrompt>,
    cancel: CancellationToken,
}

impl<'a> DeviceCodeFlow<'a> {
    pub fn new(
        transport: &'a dyn AuthTransport,
        clock: &'a dyn Clock,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            transport,
            clock,
            prompt: None,
            cancel,
        }
    }

    pub fn with_prompt(mut self, prompt: &'a DevicePrompt) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// Drive the state machine to a terminal state.
    pub async fn run(&self, resource: &str) -> Result<TokenGrant, AuthError> {
        let mut state = DeviceCodeState::Idle;
        loop {
            state = match state {
                DeviceCodeState::Succeeded(grant) => return Ok(grant),
                DeviceCodeState::Failed(err) => return Err(err),
                DeviceCodeState::Cancelled => return Err(AuthError::Cancelled),
                pending => {
                    let next = self.step(resource, pending).await;
                    debug!(resource, state = next.name(), "device code transition");
                    next
                }
            };
        }
    }

    /// Advance one transition from a non-terminal state.
    pub async fn step(&self, resource: &str, state: DeviceCodeState) -> DeviceCodeState {
        match state {
            DeviceCodeState::Idle if self.cancel.is_cancelled() => DeviceCodeState::Cancelled,
            DeviceCodeState::Idle => DeviceCodeState::CodeRequested,
            DeviceCodeState::CodeRequested => self.request_code(resource).await,
            DeviceCodeState::Polling { session, ticks } => self.poll(resource, session, ticks).await,
            terminal => terminal,
        }
    }

    async fn request_code(&self, resource: &str) -> DeviceCodeState {
        let response = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return DeviceCodeState::Cancelled,
            response = self.transport.request_device_code(resource) => response,
        };
        match response {
            Ok(response) => {
                let session = DeviceAuthorizationSession::new(response, self.cancel.clone());
                match self.prompt {
                    Some(prompt) => prompt(&session.message),
                    None => info!(resource, "{}", session.message),
                }
                DeviceCodeState::Polling { session, ticks: 0 }
            }
            Err(err) => DeviceCodeState::Failed(err),
        }
    }

    async fn poll(
        &self,
        resource: &str,
        session: DeviceAuthorizationSession,
        ticks: u32,
    ) -> DeviceCodeState {
        tokio::select! {
            biased;
            _ = session.cancel.cancelled() => return DeviceCodeState::Cancelled,
            _ = self.clock.sleep(session.interval) => {}
        }
        let request = TokenRequest::DeviceCode {
            resource,
            device_code: &session.device_code,
        };
        let response = tokio::select! {
            biased;
            _ = session.cancel.cancelled() => return DeviceCodeState::Cancelled,
            response = self.transport.request_token(request) => response,
        };
        match response {
            Ok(TokenResponse::Success(grant)) => {
                info!(resource, ticks = ticks + 1, "device code authorized");
                DeviceCodeState::Succeeded(grant)
            }
            Ok(response) if response.is_pending() => DeviceCodeState::Polling {
                session,
                ticks: ticks + 1,
            },
            Ok(TokenResponse::Failure { code, description }) => {
                DeviceCodeState::Failed(AuthError::AuthorizationFailed { code, description })
            }
            Err(err) => DeviceCodeState::Failed(err),
        }
    }
}
