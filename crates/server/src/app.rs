//! Process entry point: logging, config file, CLI dispatch.

use crate::cli::{Cli, Commands};
use crate::commands::{
    handle_call_command, handle_protect_route_command, handle_serve_command,
    handle_status_command, handle_tools_command,
};
use crate::config::apply_config_to_env;
use anyhow::Result;
use clap::Parser;
use kong_mcp_admin::AdminConfig;

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// `serve` as if it had been given with no flags; its env-backed options
/// are read here because clap only applies them to a parsed subcommand.
fn default_serve() -> Commands {
    use crate::config::ENV_TOOLS;
    #[cfg(feature = "http-transport")]
    use crate::config::{ENV_AUTH_TOKEN, ENV_CORS_ORIGINS, ENV_HTTP};

    Commands::Serve {
        #[cfg(feature = "http-transport")]
        http: env_value(ENV_HTTP),
        tools: env_value(ENV_TOOLS).map(Into::into),
        #[cfg(feature = "http-transport")]
        auth_token: env_value(ENV_AUTH_TOKEN),
        #[cfg(feature = "http-transport")]
        cors_origins: env_value(ENV_CORS_ORIGINS)
            .map(|raw| raw.split(',').map(str::to_string).collect())
            .unwrap_or_default(),
        #[cfg(feature = "http-transport")]
        tls_cert: None,
        #[cfg(feature = "http-transport")]
        tls_key: None,
    }
}

/// Runs the `kong-mcp` command line.
///
/// Logs go to stderr so the stdio MCP transport owns stdout. Filtering
/// follows `RUST_LOG`.
pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Before parsing: clap reads the env vars the file may fill in.
    apply_config_to_env();
    let cli = Cli::parse();
    let admin = cli.admin.overrides().apply(AdminConfig::from_env());
    tracing::debug!(target: "kong_mcp::config", ?admin, "Resolved Kong Admin API settings");

    match cli.command.unwrap_or_else(default_serve) {
        Commands::Serve {
            #[cfg(feature = "http-transport")]
            http,
            tools,
            #[cfg(feature = "http-transport")]
            auth_token,
            #[cfg(feature = "http-transport")]
            cors_origins,
            #[cfg(feature = "http-transport")]
            tls_cert,
            #[cfg(feature = "http-transport")]
            tls_key,
        } => handle_serve_command(
            admin,
            tools,
            #[cfg(feature = "http-transport")]
            crate::commands::HttpOptions {
                bind: http,
                security: crate::http_transport::HttpSecurityConfig {
                    auth_token: auth_token.filter(|t| !t.is_empty()),
                    tls_cert,
                    tls_key,
                    cors_origins: cors_origins
                        .into_iter()
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect(),
                },
            },
        ),
        Commands::Tools { tools } => handle_tools_command(admin, tools),
        Commands::Status => handle_status_command(admin),
        Commands::Call { tool, args, tools } => handle_call_command(admin, tool, args, tools),
        Commands::ProtectRoute {
            path,
            windows,
            limit_by,
            policy,
        } => handle_protect_route_command(
            admin,
            path,
            windows.into(),
            limit_by.into(),
            policy.into(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kong_mcp_test_utils::{clear_kong_env, env_guard, set_env_var};
    use serial_test::serial;
    use std::path::PathBuf;

    #[test]
    #[serial]
    fn default_serve_is_stdio_with_builtin_manifest() {
        let _lock = env_guard();
        let _cleared = clear_kong_env();
        match default_serve() {
            Commands::Serve { tools, .. } => assert!(tools.is_none()),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[cfg(feature = "http-transport")]
    #[test]
    #[serial]
    fn default_serve_reads_server_variables() {
        let _lock = env_guard();
        let _cleared = clear_kong_env();
        let _http = set_env_var("KONG_MCP_HTTP", Some("0.0.0.0:9000"));
        let _cors = set_env_var("KONG_MCP_CORS_ORIGINS", Some("http://a.test,http://b.test"));
        let _tools = set_env_var("KONG_MCP_TOOLS", Some("/tmp/tools.json"));
        match default_serve() {
            Commands::Serve {
                http,
                tools,
                cors_origins,
                auth_token,
                ..
            } => {
                assert_eq!(http.as_deref(), Some("0.0.0.0:9000"));
                assert_eq!(tools, Some(PathBuf::from("/tmp/tools.json")));
                assert_eq!(cors_origins, ["http://a.test", "http://b.test"]);
                assert!(auth_token.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
