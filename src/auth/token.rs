use serde::{Deserialize, Serialize};

/// Sentinel expiry of a disconnected store.
pub const NO_EXPIRY: i64 = -1;

/// Authentication state for one service connection.
///
/// # Example
/// ```
/// use tenantctl::auth::TokenStore;
///
/// let store = TokenStore::default();
/// assert!(!store.connected);
/// assert_eq!(store.expires_at, -1);
/// assert!(store.valid_access_token(0).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenStore {
    pub connected: bool,
    pub resource: String,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_at: i64,
}

impl Default for TokenStore {
    fn default() -> Self {
        Self {
            connected: false,
            resource: String::new(),
            access_token: String::new(),
            refresh_token: None,
            expires_at: NO_EXPIRY,
        }
    }
}

impl TokenStore {
    /// Cached access token, if it is non-empty and still valid at `now`.
    ///
    /// A token without a positive expiry is treated as expired.
    pub fn valid_access_token(&self, now: i64) -> Option<&str> {
        if self.access_token.is_empty() || self.expires_at <= 0 {
            return None;
        }
        (self.expires_at > now).then_some(self.access_token.as_str())
    }

    /// Installs a freshly acquired grant for `resource`.
    ///
    /// A grant without a refresh token keeps the one already held.
    pub fn apply(&mut self, resource: &str, grant: TokenGrant) {
        self.connected = true;
        self.resource = resource.to_string();
        self.access_token = grant.access_token;
        if let Some(refresh_token) = grant.refresh_token {
            self.refresh_token = Some(refresh_token);
        }
        self.expires_at = grant.expires_at;
    }

    /// Resets to the disconnected state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A successful token endpoint answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Absolute Unix seconds.
    pub expires_at: i64,
}
