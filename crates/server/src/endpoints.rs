//! Plain HTTP endpoints served beside the Streamable HTTP MCP endpoint.
//!
//! - `GET /api`, `GET /apis` - server discovery
//! - `GET /sse/ping` - liveness
//! - `POST /sse/request` - single JSON-RPC request (`tools/list`, `tools/call`)

use crate::error::{ToolError, INTERNAL_ERROR, INVALID_PARAMS};
use crate::handler::{render_text, SERVER_NAME, SERVER_VERSION};
use crate::registry::ToolRegistry;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Map as JsonMap, Value};
use std::sync::Arc;

pub const PROTOCOL_VERSION: &str = "2025-06-18";

/// Path the Streamable HTTP MCP service is mounted at.
pub const MCP_PATH: &str = "/mcp";

pub fn router(registry: Arc<ToolRegistry>) -> Router {
    Router::new()
        .route("/api", get(discovery))
        .route("/apis", get(discovery))
        .route("/sse/ping", get(ping))
        .route("/sse/request", post(request))
        .with_state(registry)
}

fn discovery_payload() -> Value {
    json!({
        "name": SERVER_NAME,
        "version": SERVER_VERSION,
        "protocol_version": PROTOCOL_VERSION,
        "capabilities": {
            "tools": true,
            "resources": false,
            "prompts": false
        },
        "endpoints": {
            "mcp": MCP_PATH,
            "ping": "/sse/ping",
            "request": "/sse/request"
        }
    })
}

async fn discovery() -> Json<Value> {
    Json(discovery_payload())
}

fn timestamp() -> String {
    use time::format_description::well_known::Rfc3339;
    let now = time::OffsetDateTime::now_utc();
    now.format(&Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}

async fn ping() -> Json<Value> {
    Json(json!({
        "jsonrpc": "2.0",
        "method": "ping",
        "result": {
            "status": "ok",
            "timestamp": timestamp()
        }
    }))
}

#[derive(Debug, Deserialize)]
struct RpcRequest {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    method: String,
    #[serde(default)]
    params: Option<RpcParams>,
}

#[derive(Debug, Default, Deserialize)]
struct RpcParams {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<JsonMap<String, Value>>,
}

fn rpc_result(id: Value, result: Value) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "result": result})
}

fn rpc_error(id: Value, code: i32, message: impl Into<String>) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {"code": code, "message": message.into()}
    })
}

async fn request(
    State(registry): State<Arc<ToolRegistry>>,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let rpc: RpcRequest = match serde_json::from_slice(&body) {
        Ok(rpc) => rpc,
        Err(err) => {
            tracing::debug!(target: "kong_mcp::http", error = %err, "Unparsable JSON-RPC body");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(rpc_error(
                    Value::Null,
                    INTERNAL_ERROR,
                    format!("Internal error: {err}"),
                )),
            );
        }
    };
    tracing::debug!(target: "kong_mcp::http", method = %rpc.method, "JSON-RPC request");

    let response = match rpc.method.as_str() {
        "tools/list" => {
            let tools: Vec<Value> = registry
                .tools()
                .map(|tool| {
                    json!({
                        "name": tool.name,
                        "description": tool.description,
                        "inputSchema": Value::Object((*tool.input_schema()).clone()),
                    })
                })
                .collect();
            rpc_result(rpc.id, json!({"tools": tools}))
        }
        "tools/call" => {
            let params = rpc.params.unwrap_or_default();
            match params.name {
                None => rpc_error(rpc.id, INVALID_PARAMS, "Missing tool name"),
                Some(name) => match registry.call(&name, params.arguments).await {
                    Ok(value) => rpc_result(
                        rpc.id,
                        json!({
                            "content": [{"type": "text", "text": render_text(&value)}],
                            "data": value
                        }),
                    ),
                    Err(err) => rpc_error(rpc.id, err.json_rpc_code(), error_message(&err)),
                },
            }
        }
        other => rpc_result(rpc.id, json!({"status": "received", "method": other})),
    };
    (StatusCode::OK, Json(response))
}

fn error_message(err: &ToolError) -> String {
    match err {
        ToolError::UnknownTool(name) => format!("Tool '{name}' not found"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use kong_mcp_admin::AdminConfig;
    use tower::ServiceExt;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app_with(admin: AdminConfig) -> Router {
        router(Arc::new(ToolRegistry::builtin(admin).unwrap()))
    }

    fn app() -> Router {
        app_with(AdminConfig::default())
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        send(app, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn post_rpc(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
        let req = Request::post("/sse/request")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap();
        send(app, req).await
    }

    #[tokio::test]
    async fn discovery_reports_identity_and_capabilities() {
        let (status, body) = get_json(app(), "/api").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Kong Rate Limiter MCP Server");
        assert_eq!(body["version"], "0.1.2");
        assert_eq!(body["protocol_version"], "2025-06-18");
        assert_eq!(body["capabilities"]["tools"], true);
        assert!(body["endpoints"].is_object());
    }

    #[tokio::test]
    async fn apis_matches_api() {
        let (_, api) = get_json(app(), "/api").await;
        let (_, apis) = get_json(app(), "/apis").await;
        assert_eq!(api, apis);
    }

    #[tokio::test]
    async fn ping_returns_ok_with_timestamp() {
        let (status, body) = get_json(app(), "/sse/ping").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["jsonrpc"], "2.0");
        assert_eq!(body["method"], "ping");
        assert_eq!(body["result"]["status"], "ok");
        assert!(body["result"]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn other_methods_are_acknowledged() {
        let (status, body) = post_rpc(
            app(),
            r#"{"jsonrpc": "2.0", "method": "test_method", "id": 1}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 1);
        assert_eq!(body["result"]["status"], "received");
        assert_eq!(body["result"]["method"], "test_method");
    }

    #[tokio::test]
    async fn tools_list_includes_hello_world() {
        let (_, body) = post_rpc(app(), r#"{"jsonrpc": "2.0", "method": "tools/list", "id": 2}"#).await;
        let tools = body["result"]["tools"].as_array().unwrap();
        let hello = tools.iter().find(|t| t["name"] == "hello_world").unwrap();
        assert_eq!(hello["inputSchema"]["type"], "object");
    }

    #[tokio::test]
    async fn tools_call_returns_text_content() {
        let (_, body) = post_rpc(
            app(),
            r#"{"jsonrpc": "2.0", "method": "tools/call", "params": {"name": "hello_world"}, "id": 3}"#,
        )
        .await;
        assert_eq!(body["id"], 3);
        assert_eq!(body["result"]["content"][0]["type"], "text");
        assert_eq!(
            body["result"]["content"][0]["text"],
            "Hello World from Kong Rate Limiter MCP Server!"
        );
    }

    #[tokio::test]
    async fn unknown_tool_is_method_not_found() {
        let (status, body) = post_rpc(
            app(),
            r#"{"jsonrpc": "2.0", "method": "tools/call", "params": {"name": "test_tool"}, "id": 1}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn missing_or_bad_arguments_are_invalid_params() {
        let (_, body) = post_rpc(app(), r#"{"method": "tools/call", "id": 1}"#).await;
        assert_eq!(body["error"]["code"], -32602);

        let (_, body) = post_rpc(
            app(),
            r#"{"method": "tools/call", "params": {"name": "kong_delete_route", "arguments": {}}, "id": 1}"#,
        )
        .await;
        assert_eq!(body["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn unparsable_body_is_internal_error() {
        let (status, body) = post_rpc(app(), "{not json").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["jsonrpc"], "2.0");
        assert_eq!(body["error"]["code"], -32603);
    }

    #[tokio::test]
    async fn tools_call_reaches_gateway() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/routes/r1/plugins"))
            .and(body_json(json!({
                "name": "rate-limiting",
                "config": {
                    "minute": 120,
                    "limit_by": "ip",
                    "policy": "local",
                    "fault_tolerant": true,
                    "hide_client_headers": false
                },
                "enabled": true
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "p1"})))
            .expect(1)
            .mount(&server)
            .await;

        let admin = AdminConfig {
            base_url: server.uri(),
            ..Default::default()
        };
        let (_, body) = post_rpc(
            app_with(admin),
            r#"{"method": "tools/call", "id": 9, "params": {
                "name": "kong_create_rate_limiting_plugin",
                "arguments": {"route_id": "r1", "minute": 120, "limit_by": "ip"}
            }}"#,
        )
        .await;
        assert_eq!(body["result"]["data"], json!({"id": "p1"}));
    }

    #[tokio::test]
    async fn gateway_failure_is_internal_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/plugins/p1"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not found"})))
            .mount(&server)
            .await;

        let admin = AdminConfig {
            base_url: server.uri(),
            ..Default::default()
        };
        let (_, body) = post_rpc(
            app_with(admin),
            r#"{"method": "tools/call", "id": 4, "params": {
                "name": "kong_delete_rate_limiting_plugin",
                "arguments": {"plugin_id": "p1"}
            }}"#,
        )
        .await;
        assert_eq!(body["error"]["code"], -32603);
        assert!(body["error"]["message"].as_str().unwrap().contains("Not found"));
        assert!(body.get("result").is_none());
    }
}
