//! Shared test utilities for kong-mcp crates.
//!
//! Environment guards for tests that read `KONG_*` variables, and a
//! temporary home directory fixture for config-file and tool-manifest
//! tests.

use std::path::PathBuf;
use std::sync::{LazyLock, Mutex, MutexGuard};

/// Every environment variable the workspace reads.
pub const KONG_ENV_VARS: &[&str] = &[
    "KONG_ADMIN_URL",
    "KONG_USERNAME",
    "KONG_PASSWORD",
    "KONG_API_TOKEN",
    "KONG_TIMEOUT",
    "KONG_VERIFY_SSL",
    "KONG_MCP_HTTP",
    "KONG_MCP_AUTH_TOKEN",
    "KONG_MCP_CORS_ORIGINS",
    "KONG_MCP_TOOLS",
];

/// Serialize tests that mutate process-global state (env vars, HOME).
///
/// Acquire this guard at the start of any test that modifies environment
/// variables to prevent race conditions between parallel tests.
pub fn env_guard() -> MutexGuard<'static, ()> {
    static TEST_SERIAL: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    TEST_SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

/// RAII guard for environment variables - restores original value on drop.
pub struct EnvVarGuard {
    key: &'static str,
    previous: Option<String>,
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        if let Some(v) = &self.previous {
            std::env::set_var(self.key, v);
        } else {
            std::env::remove_var(self.key);
        }
    }
}

/// Set an environment variable and return a guard that restores the original on drop.
///
/// # Example
/// ```
/// let _guard = kong_mcp_test_utils::set_env_var("KONG_ADMIN_URL", Some("http://kong:8001"));
/// // KONG_ADMIN_URL is set until _guard drops
/// ```
pub fn set_env_var(key: &'static str, value: Option<&str>) -> EnvVarGuard {
    let previous = std::env::var(key).ok();
    if let Some(val) = value {
        std::env::set_var(key, val);
    } else {
        std::env::remove_var(key);
    }
    EnvVarGuard { key, previous }
}

/// Unsets every variable in [`KONG_ENV_VARS`] until the guards drop.
pub fn clear_kong_env() -> Vec<EnvVarGuard> {
    KONG_ENV_VARS
        .iter()
        .map(|key| set_env_var(key, None))
        .collect()
}

/// Temporary home directory with an empty `~/.kong-mcp`.
///
/// The tempdir is removed when this struct is dropped.
pub struct HomeFixture {
    pub tempdir: tempfile::TempDir,
    /// Path to `~/.kong-mcp` in the temp environment
    pub config_dir: PathBuf,
}

impl HomeFixture {
    pub fn new() -> std::io::Result<Self> {
        let tempdir = tempfile::tempdir()?;
        let config_dir = tempdir.path().join(".kong-mcp");
        std::fs::create_dir_all(&config_dir)?;
        Ok(Self {
            tempdir,
            config_dir,
        })
    }

    pub fn home_path(&self) -> &std::path::Path {
        self.tempdir.path()
    }

    /// Create an RAII guard that sets HOME to this fixture's temp directory.
    pub fn home_guard(&self) -> EnvVarGuard {
        set_env_var("HOME", Some(self.home_path().to_str().unwrap()))
    }

    /// Writes `~/.kong-mcp/config.toml` and returns its path.
    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.config_dir.join("config.toml");
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    /// Writes a tool manifest next to the config and returns its path.
    pub fn write_manifest(&self, name: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.config_dir.join(name);
        std::fs::write(&path, contents)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_guard_serializes_tests() {
        let _g = env_guard();
    }

    #[test]
    fn test_set_env_var_sets_and_restores() {
        let _g = env_guard();

        const KEY: &str = "KONG_MCP_TEST_UTILS_TEST_VAR";
        std::env::remove_var(KEY);

        {
            let _guard = set_env_var(KEY, Some("test_value"));
            assert_eq!(std::env::var(KEY).ok(), Some("test_value".to_string()));
        }
        assert!(std::env::var(KEY).is_err());
    }

    #[test]
    fn test_set_env_var_restores_previous_value() {
        let _g = env_guard();

        const KEY: &str = "KONG_MCP_TEST_UTILS_PREVIOUS";
        std::env::set_var(KEY, "original");
        {
            let _guard = set_env_var(KEY, None);
            assert!(std::env::var(KEY).is_err());
        }
        assert_eq!(std::env::var(KEY).ok(), Some("original".to_string()));
        std::env::remove_var(KEY);
    }

    #[test]
    fn test_clear_kong_env_unsets_and_restores() {
        let _g = env_guard();
        let _url = set_env_var("KONG_ADMIN_URL", Some("http://kong:8001"));
        {
            let _cleared = clear_kong_env();
            assert!(std::env::var("KONG_ADMIN_URL").is_err());
        }
        assert_eq!(
            std::env::var("KONG_ADMIN_URL").ok(),
            Some("http://kong:8001".to_string())
        );
    }

    #[test]
    fn test_home_fixture_writes_config_and_manifest() {
        let fixture = HomeFixture::new().unwrap();
        assert!(fixture.config_dir.ends_with(".kong-mcp"));

        let config = fixture
            .write_config("[admin]\nurl = \"http://kong:8001\"\n")
            .unwrap();
        let parsed: toml::Value = toml::from_str(&std::fs::read_to_string(config).unwrap()).unwrap();
        assert_eq!(parsed["admin"]["url"].as_str(), Some("http://kong:8001"));

        let manifest = fixture
            .write_manifest("tools.json", r#"{"tools": {}}"#)
            .unwrap();
        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(manifest).unwrap()).unwrap();
        assert!(parsed["tools"].as_object().unwrap().is_empty());
    }
}
