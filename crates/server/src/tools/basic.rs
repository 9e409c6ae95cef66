//! Diagnostic tools.

use kong_mcp_admin::AdminClient;
use serde_json::Value;

use super::NoArgs;
use crate::error::ToolResult;

pub const GREETING: &str = "Hello World from Kong Rate Limiter MCP Server!";

/// Fixed greeting used to check that tool dispatch works end to end.
pub async fn hello_world(_client: &AdminClient, _args: NoArgs) -> ToolResult<Value> {
    Ok(Value::String(GREETING.to_string()))
}

/// Node status reported by `GET /status`.
pub async fn kong_status(client: &AdminClient, _args: NoArgs) -> ToolResult<Value> {
    Ok(client.health_check().await?)
}
