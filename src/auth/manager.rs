use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::client::AuthTransport;
use super::clock::{Clock, SystemClock};
use super::device_code::{DeviceCodeFlow, DevicePrompt};
use super::error::AuthError;
use super::refresh::RefreshFlow;
use super::store::SessionStore;
use super::token::{TokenGrant, TokenStore};

/// Hands out valid access tokens, renewing them as needed.
///
/// The manager owns one [`TokenStore`]. Acquisitions against it are
/// serialized: while a refresh or device-code flow is in flight, other
/// callers wait and then see its result.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use tenantctl::auth::{HttpAuthClient, TokenManager};
///
/// # async fn example() -> Result<(), tenantctl::auth::AuthError> {
/// let transport = HttpAuthClient::new(Duration::from_secs(30))?;
/// let manager = TokenManager::new(Arc::new(transport))
///     .with_prompt(|message| eprintln!("{message}"));
/// let token = manager
///     .ensure_access_token("https://graph.example.com")
///     .await?;
/// # let _ = token;
/// # Ok(())
/// # }
/// ```
pub struct TokenManager {
    transport: Arc<dyn AuthTransport>,
    clock: Arc<dyn Clock>,
    state: tokio::sync::Mutex<TokenStore>,
    sessions: Option<Arc<dyn SessionStore>>,
    profile: String,
    prompt: Option<Arc<DevicePrompt>>,
    cancel: Mutex<CancellationToken>,
}

impl TokenManager {
    pub fn new(transport: Arc<dyn AuthTransport>) -> Self {
        Self {
            transport,
            clock: Arc::new(SystemClock),
            state: tokio::sync::Mutex::new(TokenStore::default()),
            sessions: None,
            profile: "default".to_string(),
            prompt: None,
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Start from an existing store instead of a disconnected one.
    pub fn with_store(mut self, store: TokenStore) -> Self {
        self.state = tokio::sync::Mutex::new(store);
        self
    }

    pub fn with_session_store(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Where device-code instructions go. Without one they are logged.
    pub fn with_prompt(mut self, prompt: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.prompt = Some(Arc::new(prompt));
        self
    }

    /// Load the persisted session for this profile, if any.
    pub async fn restore_session(&self) -> Result<bool, AuthError> {
        let Some(sessions) = &self.sessions else {
            return Ok(false);
        };
        match sessions.load(&self.profile)? {
            Some(restored) => {
                debug!(profile = %self.profile, resource = %restored.resource, "session restored");
                *self.state.lock().await = restored;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Copy of the current store.
    pub async fn snapshot(&self) -> TokenStore {
        self.state.lock().await.clone()
    }

    /// A valid access token for `resource`.
    ///
    /// A cached token that has not expired is returned without any network
    /// call. Otherwise the cached refresh token is exchanged, or, when there
    /// is none, the device-code flow runs. The store is only updated on
    /// success.
    pub async fn ensure_access_token(&self, resource: &str) -> Result<String, AuthError> {
        let cancel = self.cancel_scope();
        let mut store = self.state.lock().await;
        if let Some(token) = store.valid_access_token(self.clock.now()) {
            debug!(resource, "using cached access token");
            return Ok(token.to_string());
        }
        let grant = match store.refresh_token.clone() {
            Some(refresh_token) => {
                let grant = RefreshFlow::new(self.transport.as_ref())
                    .exchange(resource, &refresh_token)
                    .await?;
                info!(resource, "access token refreshed");
                grant
            }
            None => self.authorize_device(resource, cancel).await?,
        };
        store.apply(resource, grant);
        self.persist(&store);
        Ok(store.access_token.clone())
    }

    /// Exchange an explicitly supplied refresh token for `resource`.
    ///
    /// The shared store is neither read nor written, and the new refresh
    /// token is discarded.
    pub async fn get_access_token(
        &self,
        resource: &str,
        refresh_token: &str,
    ) -> Result<String, AuthError> {
        let TokenGrant { access_token, .. } = RefreshFlow::new(self.transport.as_ref())
            .exchange(resource, refresh_token)
            .await?;
        Ok(access_token)
    }

    /// Reset the store to the disconnected state and forget the persisted
    /// session.
    pub async fn disconnect(&self) -> Result<(), AuthError> {
        self.state.lock().await.clear();
        info!(profile = %self.profile, "disconnected");
        match &self.sessions {
            Some(sessions) => sessions.clear(&self.profile),
            None => Ok(()),
        }
    }

    /// Cancel device-code flows of acquisitions already started, including
    /// those still waiting for another acquisition to finish. Acquisitions
    /// started afterwards are unaffected.
    pub fn cancel(&self) {
        let mut root = self.cancel.lock().unwrap_or_else(PoisonError::into_inner);
        root.cancel();
        *root = CancellationToken::new();
    }

    fn cancel_scope(&self) -> CancellationToken {
        self.cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .child_token()
    }

    async fn authorize_device(
        &self,
        resource: &str,
        cancel: CancellationToken,
    ) -> Result<TokenGrant, AuthError> {
        let mut flow = DeviceCodeFlow::new(self.transport.as_ref(), self.clock.as_ref(), cancel);
        if let Some(prompt) = &self.prompt {
            flow = flow.with_prompt(prompt.as_ref());
        }
        flow.run(resource).await
    }

    fn persist(&self, store: &TokenStore) {
        if let Some(sessions) = &self.sessions {
            if let Err(err) = sessions.save(&self.profile, store) {
                warn!(profile = %self.profile, error = %err, "failed to persist session");
            }
        }
    }
}
