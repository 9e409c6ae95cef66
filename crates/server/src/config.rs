//! Configuration file support.
//!
//! Loads settings from `~/.kong-mcp/config.toml`. Precedence:
//! CLI arguments > Environment variables > Config file > defaults.
//!
//! ## Configuration File Format
//!
//! ```toml
//! # ~/.kong-mcp/config.toml
//!
//! [admin]
//! url = "https://kong.internal:8444"
//! api_token = "kong-admin-token"   # or username + password
//! timeout = 10.0
//! verify_ssl = true
//!
//! [serve]
//! http = "127.0.0.1:8080"
//! auth_token = "your-secret-token"
//! cors_origins = "http://localhost:3000,https://app.example.com"
//! tools = "/etc/kong-mcp/tools.json"
//! ```

use anyhow::{Context, Result};
use kong_mcp_admin::{
    ENV_ADMIN_URL, ENV_API_TOKEN, ENV_PASSWORD, ENV_TIMEOUT, ENV_USERNAME, ENV_VERIFY_SSL,
};
use serde::Deserialize;
use std::path::PathBuf;

pub const ENV_HTTP: &str = "KONG_MCP_HTTP";
pub const ENV_AUTH_TOKEN: &str = "KONG_MCP_AUTH_TOKEN";
pub const ENV_CORS_ORIGINS: &str = "KONG_MCP_CORS_ORIGINS";
pub const ENV_TOOLS: &str = "KONG_MCP_TOOLS";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub admin: AdminSection,
    #[serde(default)]
    pub serve: ServeSection,
}

/// Kong Admin API connection.
#[derive(Default, Deserialize)]
pub struct AdminSection {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub api_token: Option<String>,
    /// Seconds.
    pub timeout: Option<f64>,
    pub verify_ssl: Option<bool>,
}

impl std::fmt::Debug for AdminSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSection")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("verify_ssl", &self.verify_ssl)
            .finish()
    }
}

/// Settings for `serve`.
#[derive(Default, Deserialize)]
pub struct ServeSection {
    /// Bind address for the HTTP transport.
    pub http: Option<String>,
    pub auth_token: Option<String>,
    /// Comma-separated list of allowed CORS origins.
    pub cors_origins: Option<String>,
    /// Tool manifest path.
    pub tools: Option<String>,
}

impl std::fmt::Debug for ServeSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServeSection")
            .field("http", &self.http)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("cors_origins", &self.cors_origins)
            .field("tools", &self.tools)
            .finish()
    }
}

/// `~/.kong-mcp/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".kong-mcp").join("config.toml"))
}

/// Loads the configuration file if it exists.
///
/// Returns `Ok(None)` when there is no file and `Err` when it exists but
/// cannot be read or parsed.
pub fn load_config() -> Result<Option<Config>> {
    let Some(path) = config_path() else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;

    tracing::debug!(
        target: "kong_mcp::config",
        path = %path.display(),
        "Loaded configuration file"
    );
    Ok(Some(config))
}

/// Copies config file values into environment variables that are not
/// already set. Call before parsing CLI arguments.
///
/// A broken config file is logged and ignored.
pub fn apply_config_to_env() {
    match load_config() {
        Ok(Some(config)) => apply_to_env(&config),
        Ok(None) => {}
        Err(err) => tracing::warn!(
            target: "kong_mcp::config",
            error = %format!("{err:#}"),
            "Ignoring configuration file"
        ),
    }
}

fn apply_to_env(config: &Config) {
    fn set_if_absent(key: &str, value: Option<String>) {
        let Some(value) = value else { return };
        if std::env::var_os(key).is_none() {
            std::env::set_var(key, value);
            tracing::trace!(
                target: "kong_mcp::config",
                key,
                "Set environment variable from config file"
            );
        }
    }

    let admin = &config.admin;
    set_if_absent(ENV_ADMIN_URL, admin.url.clone());
    set_if_absent(ENV_USERNAME, admin.username.clone());
    set_if_absent(ENV_PASSWORD, admin.password.clone());
    set_if_absent(ENV_API_TOKEN, admin.api_token.clone());
    set_if_absent(ENV_TIMEOUT, admin.timeout.map(|t| t.to_string()));
    set_if_absent(ENV_VERIFY_SSL, admin.verify_ssl.map(|v| v.to_string()));

    let serve = &config.serve;
    set_if_absent(ENV_HTTP, serve.http.clone());
    set_if_absent(ENV_AUTH_TOKEN, serve.auth_token.clone());
    set_if_absent(ENV_CORS_ORIGINS, serve.cors_origins.clone());
    set_if_absent(ENV_TOOLS, serve.tools.clone());
}
