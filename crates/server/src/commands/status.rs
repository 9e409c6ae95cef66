//! Handler for the `status` command.

use anyhow::{Context, Result};
use kong_mcp_admin::{AdminClient, AdminConfig};
use tokio::runtime::Runtime;

pub(crate) fn handle_status_command(admin: AdminConfig) -> Result<()> {
    let base_url = admin.base_url.clone();
    let client = AdminClient::new(admin)?;
    let rt = Runtime::new()?;
    let status = rt
        .block_on(client.health_check())
        .with_context(|| format!("Kong Admin API at {base_url} is not healthy"))?;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
