//! CLI entry point for tenantctl.

pub mod auth;
pub mod request;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::warn;

use crate::auth::{FileSessionStore, HttpAuthClient, TokenManager};
use crate::config::TenantConfig;
use crate::error::Result;
use crate::tenant::TenantClient;

/// tenantctl
#[derive(Parser, Debug)]
#[command(name = "tenantctl", version, about = "Tenant administration service CLI")]
pub struct Cli {
    /// Trace every authority and service request
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Session profile to use
    #[arg(long, global = true, default_value = "default")]
    pub profile: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in to a tenant service URL
    Connect(ConnectArgs),
    /// Forget the current session
    Disconnect,
    /// Show the current session
    Status,
    /// Print an access token for a resource
    Token(TokenArgs),
    /// Authenticated GET against a service URL
    Get(GetArgs),
}

/// Arguments for `tenantctl connect`.
#[derive(Parser, Debug)]
pub struct ConnectArgs {
    /// Service URL; its origin becomes the token audience
    pub url: String,
}

/// Arguments for `tenantctl token`.
#[derive(Parser, Debug)]
pub struct TokenArgs {
    /// Resource (audience) the token is for
    pub resource: String,

    /// Exchange this refresh token instead of using the session
    #[arg(long)]
    pub refresh_token: Option<String>,
}

/// Arguments for `tenantctl get`.
#[derive(Parser, Debug)]
pub struct GetArgs {
    /// Absolute URL to request
    pub url: String,
}

/// Everything a command needs: settings and the profile's token manager.
pub struct Context {
    pub config: TenantConfig,
    pub tokens: Arc<TokenManager>,
}

impl Context {
    /// Build from the environment and restore the profile's saved session.
    pub async fn load(profile: &str) -> Result<Self> {
        let config = TenantConfig::from_env()?;
        Self::with_config(config, profile).await
    }

    pub async fn with_config(config: TenantConfig, profile: &str) -> Result<Self> {
        let transport = HttpAuthClient::from_config(&config)?;
        let sessions = FileSessionStore::new(config.session_dir().clone());
        let tokens = TokenManager::new(Arc::new(transport))
            .with_session_store(Arc::new(sessions))
            .with_profile(profile)
            .with_prompt(|message| eprintln!("{message}"));
        // An unreadable session must not block `disconnect` from clearing it.
        if let Err(err) = tokens.restore_session().await {
            warn!(profile, error = %err, "ignoring unreadable session");
        }
        Ok(Self {
            config,
            tokens: Arc::new(tokens),
        })
    }

    pub fn tenant_client(&self) -> Result<TenantClient> {
        TenantClient::new(self.tokens.clone(), self.config.request_timeout())
    }
}

/// Dispatch one parsed command.
pub async fn run(ctx: &Context, command: Commands) -> Result<()> {
    match command {
        Commands::Connect(args) => auth::handle_connect(ctx, &args.url).await,
        Commands::Disconnect => auth::handle_disconnect(ctx).await,
        Commands::Status => auth::handle_status(ctx).await,
        Commands::Token(args) => {
            auth::handle_token(ctx, &args.resource, args.refresh_token.as_deref()).await
        }
        Commands::Get(args) => request::handle_get(ctx, &args.url).await,
    }
}
