//! tenantctl: command-line client for a multi-tenant cloud administration
//! service.
//!
//! The heart of the crate is [`auth::TokenManager`], which hands out valid
//! bearer tokens per resource: cached tokens are reused, expired ones are
//! renewed with the refresh token, and first-time sign-in runs the OAuth2
//! device-code flow.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use tenantctl::auth::{resource_from_url, HttpAuthClient, TokenManager};
//! use tenantctl::config::TenantConfig;
//!
//! # async fn example() -> tenantctl::error::Result<()> {
//! let config = TenantConfig::from_env()?;
//! let transport = HttpAuthClient::from_config(&config)?;
//! let tokens = TokenManager::new(Arc::new(transport))
//!     .with_prompt(|message| eprintln!("{message}"));
//! let resource = resource_from_url("https://contoso.sharepoint.com/sites/x");
//! let token = tokens.ensure_access_token(resource).await?;
//! # let _ = token;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod tenant;

#[cfg(feature = "cli")]
pub mod cli;
