//! CLI handlers for connect, disconnect, status and token.

use chrono::{DateTime, Utc};

use super::Context;
use crate::auth::{resource_from_url, TokenStore};
use crate::error::{Result, TenantError};

/// Handle `tenantctl connect <url>`.
pub async fn handle_connect(ctx: &Context, url: &str) -> Result<()> {
    let resource = resource_from_url(url);
    if resource.is_empty() {
        return Err(TenantError::InvalidArgument("URL is empty".to_string()));
    }
    ctx.tokens.ensure_access_token(resource).await?;
    println!("Connected to {resource}");
    Ok(())
}

/// Handle `tenantctl disconnect`.
pub async fn handle_disconnect(ctx: &Context) -> Result<()> {
    ctx.tokens.disconnect().await?;
    println!("Disconnected");
    Ok(())
}

/// Handle `tenantctl status`.
pub async fn handle_status(ctx: &Context) -> Result<()> {
    let store = ctx.tokens.snapshot().await;
    println!("{}", format_status(&store, Utc::now().timestamp()));
    Ok(())
}

/// Handle `tenantctl token <resource> [--refresh-token <rt>]`.
pub async fn handle_token(ctx: &Context, resource: &str, refresh_token: Option<&str>) -> Result<()> {
    let token = match refresh_token {
        Some(refresh_token) => ctx.tokens.get_access_token(resource, refresh_token).await?,
        None => ctx.tokens.ensure_access_token(resource).await?,
    };
    println!("{token}");
    Ok(())
}

pub fn format_status(store: &TokenStore, now: i64) -> String {
    if !store.connected {
        return "Not connected".to_string();
    }
    let expiry = DateTime::<Utc>::from_timestamp(store.expires_at, 0)
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| "unknown".to_string());
    let state = if store.valid_access_token(now).is_some() {
        "valid"
    } else if store.refresh_token.is_some() {
        "expired, renews on next use"
    } else {
        "expired"
    };
    format!(
        "Connected to {}\nAccess token: {state} (expires {expiry})",
        store.resource
    )
}
