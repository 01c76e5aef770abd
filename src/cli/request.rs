//! CLI handler for authenticated requests.

use super::Context;
use crate::error::Result;

/// Handle `tenantctl get <url>`.
pub async fn handle_get(ctx: &Context, url: &str) -> Result<()> {
    let client = ctx.tenant_client()?;
    let body = client.get(url).await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
