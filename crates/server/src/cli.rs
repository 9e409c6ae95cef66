use clap::{Args, Parser, Subcommand, ValueEnum};
use kong_mcp_admin::AdminOverrides;
use std::path::PathBuf;
use std::time::Duration;

use crate::tools::rate_limiting::{LimitBy, Policy, WindowLimits};

/// Command-line interface for the `kong-mcp` application.
#[derive(Debug, Parser)]
#[command(
    name = "kong-mcp",
    version,
    about = "MCP server for Kong Gateway services, routes, plugins and rate limiting"
)]
pub struct Cli {
    #[command(flatten)]
    pub admin: AdminArgs,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Kong Admin API connection flags, accepted by every command.
#[derive(Debug, Clone, Default, Args)]
pub struct AdminArgs {
    /// Kong Admin API base URL.
    #[arg(long, global = true, env = "KONG_ADMIN_URL", value_name = "URL")]
    pub admin_url: Option<String>,
    /// Basic-auth username.
    #[arg(long, global = true, env = "KONG_USERNAME")]
    pub username: Option<String>,
    /// Basic-auth password.
    #[arg(long, global = true, env = "KONG_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// Admin API token (takes precedence over basic auth).
    #[arg(long, global = true, env = "KONG_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,
    /// Per-request timeout in seconds.
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<f64>,
    /// Skip TLS certificate verification of the Admin API.
    #[arg(long, global = true, default_value_t = false)]
    pub insecure: bool,
}

impl AdminArgs {
    /// Explicit values to layer over `AdminConfig::from_env`.
    pub fn overrides(&self) -> AdminOverrides {
        AdminOverrides {
            base_url: self.admin_url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            api_token: self.api_token.clone(),
            timeout: self
                .timeout
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok()),
            verify_tls: self.insecure.then_some(false),
        }
    }
}

/// Rate-limit windows as CLI flags.
#[derive(Debug, Clone, Default, Args)]
pub struct WindowArgs {
    #[arg(long)]
    pub second: Option<u64>,
    #[arg(long)]
    pub minute: Option<u64>,
    #[arg(long)]
    pub hour: Option<u64>,
    #[arg(long)]
    pub day: Option<u64>,
    #[arg(long)]
    pub month: Option<u64>,
    #[arg(long)]
    pub year: Option<u64>,
}

impl From<WindowArgs> for WindowLimits {
    fn from(args: WindowArgs) -> Self {
        WindowLimits {
            second: args.second,
            minute: args.minute,
            hour: args.hour,
            day: args.day,
            month: args.month,
            year: args.year,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LimitByArg {
    Consumer,
    Credential,
    Ip,
    Service,
    Header,
    Path,
    ConsumerGroup,
}

impl From<LimitByArg> for LimitBy {
    fn from(arg: LimitByArg) -> Self {
        match arg {
            LimitByArg::Consumer => LimitBy::Consumer,
            LimitByArg::Credential => LimitBy::Credential,
            LimitByArg::Ip => LimitBy::Ip,
            LimitByArg::Service => LimitBy::Service,
            LimitByArg::Header => LimitBy::Header,
            LimitByArg::Path => LimitBy::Path,
            LimitByArg::ConsumerGroup => LimitBy::ConsumerGroup,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    Local,
    Cluster,
    Redis,
}

impl From<PolicyArg> for Policy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Local => Policy::Local,
            PolicyArg::Cluster => Policy::Cluster,
            PolicyArg::Redis => Policy::Redis,
        }
    }
}

/// Available `kong-mcp` commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Runs the MCP server (stdio by default, HTTP with `--http`).
    Serve {
        /// Bind address for the HTTP transport, e.g. `127.0.0.1:8080`.
        #[cfg(feature = "http-transport")]
        #[arg(long, env = "KONG_MCP_HTTP", value_name = "ADDR")]
        http: Option<String>,
        /// Tool manifest replacing the built-in one.
        #[arg(long, env = "KONG_MCP_TOOLS", value_name = "PATH")]
        tools: Option<PathBuf>,
        /// Bearer token required on every HTTP request.
        #[cfg(feature = "http-transport")]
        #[arg(long, env = "KONG_MCP_AUTH_TOKEN", hide_env_values = true)]
        auth_token: Option<String>,
        /// Allowed CORS origins (comma-separated, `*` for any).
        #[cfg(feature = "http-transport")]
        #[arg(long, env = "KONG_MCP_CORS_ORIGINS", value_delimiter = ',')]
        cors_origins: Vec<String>,
        /// TLS certificate (PEM).
        #[cfg(feature = "http-transport")]
        #[arg(long, requires = "tls_key", value_name = "PATH")]
        tls_cert: Option<PathBuf>,
        /// TLS private key (PEM).
        #[cfg(feature = "http-transport")]
        #[arg(long, requires = "tls_cert", value_name = "PATH")]
        tls_key: Option<PathBuf>,
    },
    /// Lists registered tools and any manifest entries that were skipped.
    Tools {
        #[arg(long, env = "KONG_MCP_TOOLS", value_name = "PATH")]
        tools: Option<PathBuf>,
    },
    /// Checks that the Kong Admin API is reachable.
    Status,
    /// Invokes one tool and prints its result as JSON.
    Call {
        /// Tool name, e.g. `kong_get_services`.
        tool: String,
        /// Arguments as a JSON object.
        #[arg(long, value_name = "JSON")]
        args: Option<String>,
        #[arg(long, env = "KONG_MCP_TOOLS", value_name = "PATH")]
        tools: Option<PathBuf>,
    },
    /// Creates or updates the rate-limiting plugin on the route serving a path.
    ProtectRoute {
        /// Path fragment to look for in route `paths`.
        path: String,
        #[command(flatten)]
        windows: WindowArgs,
        #[arg(long, value_enum, default_value = "ip")]
        limit_by: LimitByArg,
        #[arg(long, value_enum, default_value = "local")]
        policy: PolicyArg,
    },
}
