//! CLI command handlers.

mod call;
mod protect;
mod serve;
mod status;
mod tools;

pub(crate) use call::handle_call_command;
pub(crate) use protect::handle_protect_route_command;
pub(crate) use serve::handle_serve_command;
#[cfg(feature = "http-transport")]
pub(crate) use serve::HttpOptions;
pub(crate) use status::handle_status_command;
pub(crate) use tools::handle_tools_command;

use crate::registry::{ToolManifest, ToolRegistry};
use anyhow::Result;
use kong_mcp_admin::AdminConfig;
use std::path::Path;

/// Registry over the manifest at `tools`, or the built-in one.
pub(crate) fn load_registry(admin: AdminConfig, tools: Option<&Path>) -> Result<ToolRegistry> {
    let manifest = ToolManifest::resolve(tools)?;
    Ok(ToolRegistry::from_manifest(&manifest, admin))
}
