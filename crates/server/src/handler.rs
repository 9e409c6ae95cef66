//! MCP `ServerHandler` implementation for [`KongToolService`].
//!
//! - `list_tools()` - lists every registered tool with its JSON schema
//! - `call_tool()` - dispatches to the registry and renders the result
//!
//! Unknown tools and malformed arguments are answered with a JSON-RPC error.
//! Failures of the tool itself, including Kong rejections, come back as a
//! successful response with `is_error` set so the client sees the gateway's
//! message.

use crate::error::ToolError;
use crate::registry::ToolRegistry;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, InitializeResult, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities,
};
use rmcp::ServerHandler;
use serde_json::{Map as JsonMap, Value};
use std::sync::Arc;

pub const SERVER_NAME: &str = "Kong Rate Limiter MCP Server";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP service exposing the tool registry. Cheap to clone.
#[derive(Debug, Clone)]
pub struct KongToolService {
    registry: Arc<ToolRegistry>,
}

impl KongToolService {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }
}

/// Text rendering of a tool result: strings as-is, anything else as
/// pretty-printed JSON.
pub fn render_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Structured content must be an object; other values are wrapped.
fn structured(value: Value) -> Value {
    match value {
        Value::Object(_) => value,
        other => {
            let mut wrapped = JsonMap::new();
            wrapped.insert("result".into(), other);
            Value::Object(wrapped)
        }
    }
}

pub(crate) fn success(value: Value) -> CallToolResult {
    CallToolResult {
        content: vec![Content::text(render_text(&value))],
        structured_content: Some(structured(value)),
        is_error: Some(false),
        meta: None,
    }
}

pub(crate) fn failure(err: &ToolError) -> CallToolResult {
    CallToolResult {
        content: vec![Content::text(err.to_string())],
        structured_content: None,
        is_error: Some(true),
        meta: None,
    }
}

impl ServerHandler for KongToolService {
    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, rmcp::ErrorData>> + Send + '_
    {
        std::future::ready(Ok(ListToolsResult {
            tools: self.registry.mcp_tools(),
            next_cursor: None,
        }))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, rmcp::ErrorData>> + Send + '_
    {
        Box::pin(async move {
            match self
                .registry
                .call(request.name.as_ref(), request.arguments)
                .await
            {
                Ok(value) => Ok(success(value)),
                Err(err) if err.is_protocol_error() => Err(err.into()),
                Err(err) => Ok(failure(&err)),
            }
        })
    }

    fn get_info(&self) -> InitializeResult {
        let mut info = InitializeResult {
            capabilities: ServerCapabilities {
                tools: Some(Default::default()),
                ..Default::default()
            },
            instructions: Some(
                "Manage Kong Gateway services, routes, plugins and rate limiting through the Admin API"
                    .into(),
            ),
            ..Default::default()
        };
        info.server_info.name = SERVER_NAME.into();
        info.server_info.version = SERVER_VERSION.into();
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kong_mcp_admin::AdminConfig;
    use serde_json::json;

    fn service() -> KongToolService {
        KongToolService::new(Arc::new(
            ToolRegistry::builtin(AdminConfig::default()).unwrap(),
        ))
    }

    #[test]
    fn render_text_keeps_strings_verbatim() {
        assert_eq!(render_text(&json!("hi")), "hi");
        assert_eq!(render_text(&json!({"a": 1})), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn success_wraps_non_object_results() {
        let result = success(json!([1, 2]));
        assert_eq!(result.is_error, Some(false));
        assert_eq!(result.structured_content, Some(json!({"result": [1, 2]})));
        let result = success(json!({"id": "p1"}));
        assert_eq!(result.structured_content, Some(json!({"id": "p1"})));
    }

    #[test]
    fn failure_carries_error_text() {
        let err = ToolError::Validation("Size must be between 1 and 1000".into());
        let result = failure(&err);
        assert_eq!(result.is_error, Some(true));
        assert_eq!(
            result.content[0].as_text().unwrap().text,
            "Size must be between 1 and 1000"
        );
    }

    #[test]
    fn get_info_advertises_tools_and_server_identity() {
        let info = service().get_info();
        assert!(info.capabilities.tools.is_some());
        assert_eq!(info.server_info.name, SERVER_NAME);
        assert_eq!(info.server_info.version, SERVER_VERSION);
    }
}
