//! Manifest-driven tool registry.
//!
//! The registry is built once at startup: every enabled manifest entry is
//! resolved against the binding table, entries naming an unknown module or
//! function are skipped with a single aggregated warning, and the result is
//! immutable for the lifetime of the process.

mod manifest;
mod table;

pub use manifest::{ToolEntry, ToolManifest, BUILTIN_MANIFEST};

use indexmap::IndexMap;
use kong_mcp_admin::{AdminClient, AdminConfig};
use rmcp::model::{Tool, ToolAnnotations};
use serde_json::{Map as JsonMap, Value};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{ToolError, ToolResult};
use crate::tool_schemas::Schema;
use table::Handler;

/// A tool exposed to clients.
#[derive(Clone)]
pub struct RegisteredTool {
    pub name: String,
    pub title: String,
    pub description: String,
    pub module: String,
    pub function: String,
    input_schema: Schema,
    handler: Handler,
}

impl std::fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("name", &self.name)
            .field("module", &self.module)
            .field("function", &self.function)
            .finish_non_exhaustive()
    }
}

impl RegisteredTool {
    pub fn input_schema(&self) -> Schema {
        self.input_schema.clone()
    }

    /// MCP descriptor for `tools/list`.
    pub fn to_mcp_tool(&self) -> Tool {
        Tool {
            name: self.name.clone().into(),
            title: Some(self.title.clone()),
            description: Some(self.description.clone().into()),
            input_schema: self.input_schema.clone(),
            output_schema: None,
            annotations: Some(ToolAnnotations::default()),
            icons: None,
            meta: None,
        }
    }
}

/// A manifest entry that could not be bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTool {
    pub name: String,
    pub module: String,
    pub function: String,
}

#[derive(Debug)]
pub struct ToolRegistry {
    tools: IndexMap<String, RegisteredTool>,
    skipped: Vec<SkippedTool>,
    admin: AdminConfig,
}

impl ToolRegistry {
    /// Resolves the enabled entries of `manifest`.
    ///
    /// Unresolvable entries never abort startup; they are reported through
    /// [`ToolRegistry::skipped`].
    pub fn from_manifest(manifest: &ToolManifest, admin: AdminConfig) -> Self {
        let mut tools = IndexMap::new();
        let mut skipped = Vec::new();

        for (name, entry) in manifest.enabled() {
            match table::lookup(&entry.module, &entry.function) {
                Some(binding) => {
                    let description = entry
                        .description
                        .clone()
                        .unwrap_or_else(|| binding.description.to_string());
                    tools.insert(
                        name.clone(),
                        RegisteredTool {
                            name: name.clone(),
                            title: binding.title.to_string(),
                            description,
                            module: entry.module.clone(),
                            function: entry.function.clone(),
                            input_schema: (binding.schema)(),
                            handler: binding.handler,
                        },
                    );
                }
                None => skipped.push(SkippedTool {
                    name: name.clone(),
                    module: entry.module.clone(),
                    function: entry.function.clone(),
                }),
            }
        }

        if !skipped.is_empty() {
            let names: Vec<String> = skipped
                .iter()
                .map(|s| format!("{} ({}.{})", s.name, s.module, s.function))
                .collect();
            warn!(
                target: "kong_mcp::registry",
                count = skipped.len(),
                tools = %names.join(", "),
                "Skipping manifest entries with no matching tool function"
            );
        }
        info!(
            target: "kong_mcp::registry",
            registered = tools.len(),
            "Tool registry ready"
        );

        Self {
            tools,
            skipped,
            admin,
        }
    }

    /// Registry over the built-in manifest.
    pub fn builtin(admin: AdminConfig) -> anyhow::Result<Self> {
        Ok(Self::from_manifest(&ToolManifest::builtin()?, admin))
    }

    pub fn tools(&self) -> impl Iterator<Item = &RegisteredTool> {
        self.tools.values()
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.get(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn skipped(&self) -> &[SkippedTool] {
        &self.skipped
    }

    pub fn admin_config(&self) -> &AdminConfig {
        &self.admin
    }

    pub fn mcp_tools(&self) -> Vec<Tool> {
        self.tools().map(RegisteredTool::to_mcp_tool).collect()
    }

    /// Invokes a tool by name.
    ///
    /// Each call gets its own [`AdminClient`], released when the call ends.
    /// Missing arguments are treated as an empty object.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<JsonMap<String, Value>>,
    ) -> ToolResult<Value> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let client = AdminClient::new(self.admin.clone())?;
        let started = Instant::now();
        debug!(target: "kong_mcp::tools", tool = name, "Invoking tool");

        let result = (tool.handler)(client, arguments.unwrap_or_default()).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => debug!(target: "kong_mcp::tools", tool = name, elapsed_ms, "Tool succeeded"),
            Err(err) => warn!(
                target: "kong_mcp::tools",
                tool = name,
                elapsed_ms,
                error = %err,
                "Tool failed"
            ),
        }
        result
    }
}
