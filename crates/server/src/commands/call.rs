//! Handler for the `call` command.

use super::load_registry;
use crate::handler::render_text;
use anyhow::{anyhow, bail, Context, Result};
use kong_mcp_admin::AdminConfig;
use serde_json::{Map as JsonMap, Value};
use std::path::PathBuf;
use tokio::runtime::Runtime;

/// Parses `--args`; absent means no arguments.
fn parse_arguments(raw: Option<&str>) -> Result<Option<JsonMap<String, Value>>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match serde_json::from_str::<Value>(raw).context("--args is not valid JSON")? {
        Value::Object(map) => Ok(Some(map)),
        other => bail!("--args must be a JSON object, got {other}"),
    }
}

pub(crate) fn handle_call_command(
    admin: AdminConfig,
    tool: String,
    args: Option<String>,
    tools: Option<PathBuf>,
) -> Result<()> {
    let arguments = parse_arguments(args.as_deref())?;
    let registry = load_registry(admin, tools.as_deref())?;
    let rt = Runtime::new()?;
    let value = rt
        .block_on(registry.call(&tool, arguments))
        .map_err(|e| anyhow!("{tool} failed: {e}"))?;
    println!("{}", render_text(&value));
    Ok(())
}
