//! Connection settings for the Kong Admin API.
//!
//! Values resolve with the precedence explicit > environment > default:
//! [`AdminConfig::from_env`] reads the `KONG_*` variables on top of the
//! defaults, and [`AdminOverrides::apply`] layers explicit values (CLI flags,
//! programmatic callers) over the result.

use std::time::Duration;

pub const DEFAULT_ADMIN_URL: &str = "http://localhost:8001";
pub const DEFAULT_TIMEOUT_SECS: f64 = 30.0;

pub const ENV_ADMIN_URL: &str = "KONG_ADMIN_URL";
pub const ENV_USERNAME: &str = "KONG_USERNAME";
pub const ENV_PASSWORD: &str = "KONG_PASSWORD";
pub const ENV_API_TOKEN: &str = "KONG_API_TOKEN";
pub const ENV_TIMEOUT: &str = "KONG_TIMEOUT";
pub const ENV_VERIFY_SSL: &str = "KONG_VERIFY_SSL";

/// Settings used to build an [`AdminClient`](crate::AdminClient).
///
/// Note: `Debug` is implemented by hand so credentials never reach logs.
#[derive(Clone, PartialEq)]
pub struct AdminConfig {
    /// Admin API base URL, e.g. `http://localhost:8001`.
    pub base_url: String,
    /// Basic-auth username (Community Edition).
    pub username: Option<String>,
    /// Basic-auth password (Community Edition).
    pub password: Option<String>,
    /// Admin API token (Enterprise Edition). Takes precedence over basic auth.
    pub api_token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Verify the gateway's TLS certificate.
    pub verify_tls: bool,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ADMIN_URL.to_string(),
            username: None,
            password: None,
            api_token: None,
            timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
            verify_tls: true,
        }
    }
}

/// How requests authenticate against the admin API.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum AdminAuth<'a> {
    Bearer(&'a str),
    Basic { username: &'a str, password: &'a str },
    None,
}

impl std::fmt::Debug for AdminAuth<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdminAuth::Bearer(_) => f.write_str("Bearer([REDACTED])"),
            AdminAuth::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            AdminAuth::None => f.write_str("None"),
        }
    }
}

impl AdminConfig {
    /// Loads settings from the `KONG_*` environment variables.
    ///
    /// Empty variables count as unset. An unparsable or negative
    /// `KONG_TIMEOUT` falls back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let timeout = env_non_empty(ENV_TIMEOUT)
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .unwrap_or(defaults.timeout);
        let verify_tls = std::env::var(ENV_VERIFY_SSL)
            .map(|raw| parse_bool_flag(&raw))
            .unwrap_or(defaults.verify_tls);

        Self {
            base_url: env_non_empty(ENV_ADMIN_URL).unwrap_or(defaults.base_url),
            username: env_non_empty(ENV_USERNAME),
            password: env_non_empty(ENV_PASSWORD),
            api_token: env_non_empty(ENV_API_TOKEN),
            timeout,
            verify_tls,
        }
    }

    /// Resolves the authentication mode.
    ///
    /// A token wins over basic auth; basic auth needs both username and
    /// password.
    pub fn auth(&self) -> AdminAuth<'_> {
        if let Some(token) = self.api_token.as_deref().filter(|t| !t.is_empty()) {
            return AdminAuth::Bearer(token);
        }
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                AdminAuth::Basic { username, password }
            }
            _ => AdminAuth::None,
        }
    }
}

/// Explicit values that override whatever [`AdminConfig::from_env`] found.
#[derive(Clone, Default)]
pub struct AdminOverrides {
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub api_token: Option<String>,
    pub timeout: Option<Duration>,
    pub verify_tls: Option<bool>,
}

impl AdminOverrides {
    /// Returns `config` with every explicitly set value replaced.
    pub fn apply(self, mut config: AdminConfig) -> AdminConfig {
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }
        if self.username.is_some() {
            config.username = self.username;
        }
        if self.password.is_some() {
            config.password = self.password;
        }
        if self.api_token.is_some() {
            config.api_token = self.api_token;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if let Some(verify_tls) = self.verify_tls {
            config.verify_tls = verify_tls;
        }
        config
    }
}

/// Parses a boolean flag: `true`, `1`, `yes` and `on` (any case) are true,
/// everything else is false.
pub fn parse_bool_flag(raw: &str) -> bool {
    matches!(
        raw.to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
