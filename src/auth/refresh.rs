use tracing::debug;

use super::client::{AuthTransport, TokenRequest};
use super::error::AuthError;
use super::token::TokenGrant;

/// Single refresh-token exchange. Failures are returned as-is, never retried.
pub struct RefreshFlow<'a> {
    transport: &'a dyn AuthTransport,
}

impl<'a> RefreshFlow<'a> {
    pub fn new(transport: &'a dyn AuthTransport) -> Self {
        Self { transport }
    }

    pub async fn exchange(
        &self,
        resource: &str,
        refresh_token: &str,
    ) -> Result<TokenGrant, AuthError> {
        debug!(resource, "refreshing access token");
        let response = self
            .transport
            .request_token(TokenRequest::RefreshToken {
                resource,
                refresh_token,
            })
            .await?;
        response.into_grant()
    }
}
