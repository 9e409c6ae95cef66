//! Handler for the `serve` command.

use super::load_registry;
use crate::handler::KongToolService;
use anyhow::{anyhow, Result};
use kong_mcp_admin::AdminConfig;
use rmcp::service::serve_server;
use rmcp::transport;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Options for the HTTP transport; `None` bind address means stdio.
#[cfg(feature = "http-transport")]
#[derive(Debug, Default)]
pub(crate) struct HttpOptions {
    pub bind: Option<String>,
    pub security: crate::http_transport::HttpSecurityConfig,
}

/// Handle the `serve` command.
pub(crate) fn handle_serve_command(
    admin: AdminConfig,
    tools: Option<PathBuf>,
    #[cfg(feature = "http-transport")] http: HttpOptions,
) -> Result<()> {
    let registry = Arc::new(load_registry(admin, tools.as_deref())?);
    let rt = Runtime::new()?;

    #[cfg(feature = "http-transport")]
    if let Some(bind_addr) = http.bind {
        return rt.block_on(crate::http_transport::serve_http(
            registry,
            &bind_addr,
            http.security,
        ));
    }

    tracing::info!(
        target: "kong_mcp::registry",
        tools = registry.len(),
        "Serving MCP over stdio"
    );
    let service = KongToolService::new(registry);
    let running = rt.block_on(async {
        serve_server(service, transport::stdio())
            .await
            .map_err(|e| anyhow!("failed to start server: {e}"))
    })?;
    rt.block_on(async {
        running
            .waiting()
            .await
            .map_err(|e| anyhow!("server task ended: {e}"))
    })?;
    Ok(())
}
