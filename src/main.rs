//! tenantctl binary entry point.

use clap::Parser;
use tenantctl::cli::{Cli, Context};
use tenantctl::error::TenantError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match Context::load(&cli.profile).await {
        Ok(ctx) => {
            tokio::select! {
                result = tenantctl::cli::run(&ctx, cli.command) => result,
                _ = tokio::signal::ctrl_c() => {
                    ctx.tokens.cancel();
                    Err(TenantError::Cancelled)
                }
            }
        }
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("tenantctl=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tenantctl=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
