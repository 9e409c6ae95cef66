//! Declarative tool manifest.
//!
//! ```json
//! {
//!   "tools": {
//!     "hello_world": {
//!       "module": "basic",
//!       "function": "hello_world",
//!       "description": "Simple Hello World tool",
//!       "enabled": true
//!     }
//!   }
//! }
//! ```
//!
//! Entry order is preserved and becomes the order tools are listed in.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Manifest compiled into the binary, used when no path is configured.
pub const BUILTIN_MANIFEST: &str = include_str!("../tools.json");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolManifest {
    #[serde(default)]
    pub tools: IndexMap<String, ToolEntry>,
}

/// One tool declaration: which function to bind and whether to expose it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolEntry {
    pub module: String,
    pub function: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl ToolManifest {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("invalid tool manifest")
    }

    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_MANIFEST)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read tool manifest {}", path.display()))?;
        let manifest = Self::from_json(&raw)
            .with_context(|| format!("failed to parse tool manifest {}", path.display()))?;
        tracing::debug!(
            target: "kong_mcp::registry",
            path = %path.display(),
            tools = manifest.tools.len(),
            "Loaded tool manifest"
        );
        Ok(manifest)
    }

    /// The manifest at `path`, or the built-in one.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::builtin(),
        }
    }

    pub fn enabled(&self) -> impl Iterator<Item = (&String, &ToolEntry)> {
        self.tools.iter().filter(|(_, entry)| entry.enabled)
    }
}
