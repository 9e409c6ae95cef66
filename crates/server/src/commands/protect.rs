//! Handler for the `protect-route` command.

use crate::tools::rate_limiting::{LimitBy, Policy, WindowLimits};
use crate::tools::workflow::{protect_route, ProtectRouteArgs};
use anyhow::{anyhow, Result};
use kong_mcp_admin::{AdminClient, AdminConfig};
use tokio::runtime::Runtime;

pub(crate) fn handle_protect_route_command(
    admin: AdminConfig,
    path: String,
    windows: WindowLimits,
    limit_by: LimitBy,
    policy: Policy,
) -> Result<()> {
    let mut args = ProtectRouteArgs::new(path, windows);
    args.limit_by = limit_by;
    args.policy = policy;

    let client = AdminClient::new(admin)?;
    let rt = Runtime::new()?;
    let outcome = rt
        .block_on(protect_route(&client, args))
        .map_err(|e| anyhow!("protect-route failed: {e}"))?;
    println!(
        "{} rate-limiting plugin on route {}",
        outcome["action"].as_str().unwrap_or("applied"),
        outcome["route_id"].as_str().unwrap_or("?")
    );
    println!("{}", serde_json::to_string_pretty(&outcome["plugin"])?);
    Ok(())
}
