//! Handler for the `tools` command.

use super::load_registry;
use crate::registry::ToolRegistry;
use anyhow::Result;
use kong_mcp_admin::AdminConfig;
use std::io::Write;
use std::path::PathBuf;

pub(crate) fn handle_tools_command(admin: AdminConfig, tools: Option<PathBuf>) -> Result<()> {
    let registry = load_registry(admin, tools.as_deref())?;
    let stdout = std::io::stdout();
    write_listing(&registry, &mut stdout.lock())
}

fn write_listing(registry: &ToolRegistry, out: &mut impl Write) -> Result<()> {
    let width = registry.tools().map(|t| t.name.len()).max().unwrap_or(0);
    for tool in registry.tools() {
        writeln!(out, "{:width$}  {}", tool.name, tool.description)?;
    }
    if !registry.skipped().is_empty() {
        writeln!(out)?;
        writeln!(out, "skipped (no matching function):")?;
        for skipped in registry.skipped() {
            writeln!(
                out,
                "  {} -> {}.{}",
                skipped.name, skipped.module, skipped.function
            )?;
        }
    }
    Ok(())
}
