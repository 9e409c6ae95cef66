//! MCP tool schema definitions.
//!
//! Input schemas for every tool in the registration table, grouped the way
//! the tools are: diagnostics, services, routes, plugin listing,
//! rate limiting and workflows.

use serde_json::{json, Map as JsonMap, Value};
use std::sync::Arc;

pub type Schema = Arc<JsonMap<String, Value>>;

/// Returns an empty object schema for parameterless tools.
///
/// Clients expect every tool input_schema to include a JSON Schema "type",
/// so parameterless tools are marked as taking an empty object.
pub(crate) fn empty_schema() -> Schema {
    object_schema(json!({}), &[])
}

fn object_schema(properties: Value, required: &[&str]) -> Schema {
    let mut schema = JsonMap::new();
    schema.insert("type".into(), json!("object"));
    schema.insert("properties".into(), properties);
    if !required.is_empty() {
        schema.insert("required".into(), json!(required));
    }
    schema.insert("additionalProperties".into(), json!(false));
    Arc::new(schema)
}

fn merge(parts: &[Value]) -> Value {
    let mut merged = JsonMap::new();
    for part in parts {
        if let Value::Object(map) = part {
            merged.extend(map.clone());
        }
    }
    Value::Object(merged)
}

fn string(description: &str) -> Value {
    json!({"type": "string", "description": description})
}

fn string_list(description: &str) -> Value {
    json!({"type": "array", "items": {"type": "string"}, "description": description})
}

fn pagination() -> Value {
    json!({
        "size": {"type": "integer", "minimum": 1, "description": "Page size"},
        "offset": {"type": "string", "description": "Cursor returned by a previous call"},
        "tags": {"type": "string", "description": "Filter by tags (comma-separated)"}
    })
}

fn scope_properties() -> Value {
    json!({
        "service_id": {"type": "string", "description": "Scope to this service (wins over route_id and consumer_id)"},
        "route_id": {"type": "string", "description": "Scope to this route (wins over consumer_id)"},
        "consumer_id": {"type": "string", "description": "Scope to this consumer"}
    })
}

fn window_properties() -> Value {
    let mut windows = JsonMap::new();
    for window in ["second", "minute", "hour", "day", "month", "year"] {
        windows.insert(
            window.into(),
            json!({
                "type": "integer",
                "minimum": 0,
                "description": format!("Requests allowed per {window}")
            }),
        );
    }
    Value::Object(windows)
}

fn limit_by_property() -> Value {
    json!({
        "type": "string",
        "enum": ["consumer", "credential", "ip", "service", "header", "path", "consumer-group"],
        "description": "Entity to count requests against"
    })
}

fn policy_property() -> Value {
    json!({
        "type": "string",
        "enum": ["local", "cluster", "redis"],
        "description": "Where counters are kept"
    })
}

fn redis_properties() -> Value {
    json!({
        "redis_host": {"type": "string", "description": "Redis host (redis policy only)"},
        "redis_port": {"type": "integer", "description": "Redis port (default 6379)"},
        "redis_password": {"type": "string", "description": "Redis password"},
        "redis_timeout": {"type": "integer", "description": "Redis timeout in milliseconds (default 2000)"},
        "redis_database": {"type": "integer", "description": "Redis database index (default 0)"}
    })
}

fn service_fields() -> Value {
    json!({
        "name": string("Service name"),
        "url": string("Upstream URL, e.g. http://backend:8080/api"),
        "protocol": {"type": "string", "description": "Upstream protocol (default http)"},
        "host": string("Upstream host"),
        "port": {"type": "integer", "minimum": 1, "maximum": 65535, "description": "Upstream port"},
        "path": string("Upstream path"),
        "tags": string_list("Service tags")
    })
}

fn route_fields() -> Value {
    json!({
        "name": string("Route name"),
        "protocols": string_list("Protocols, e.g. [\"http\", \"https\"]"),
        "methods": string_list("HTTP methods"),
        "hosts": string_list("Host names"),
        "paths": string_list("Request paths"),
        "strip_path": {"type": "boolean", "description": "Strip the matched path before proxying"},
        "tags": string_list("Route tags")
    })
}

pub(crate) fn list_services_schema() -> Schema {
    object_schema(pagination(), &[])
}

pub(crate) fn create_service_schema() -> Schema {
    object_schema(service_fields(), &["name", "url"])
}

pub(crate) fn update_service_schema() -> Schema {
    object_schema(
        merge(&[
            json!({"service_id": string("Service id or name")}),
            service_fields(),
        ]),
        &["service_id"],
    )
}

pub(crate) fn delete_service_schema() -> Schema {
    object_schema(
        json!({"service_id": string("Service id or name")}),
        &["service_id"],
    )
}

pub(crate) fn list_routes_schema() -> Schema {
    object_schema(pagination(), &[])
}

pub(crate) fn create_route_schema() -> Schema {
    object_schema(
        merge(&[
            json!({"service_id": string("Id of the owning service")}),
            route_fields(),
        ]),
        &["service_id"],
    )
}

pub(crate) fn update_route_schema() -> Schema {
    object_schema(
        merge(&[
            json!({
                "route_id": string("Route id or name"),
                "service_id": string("Move the route to this service")
            }),
            route_fields(),
        ]),
        &["route_id"],
    )
}

pub(crate) fn delete_route_schema() -> Schema {
    object_schema(json!({"route_id": string("Route id or name")}), &["route_id"])
}

pub(crate) fn get_plugins_schema() -> Schema {
    object_schema(
        json!({
            "name": string("Filter by plugin name, e.g. rate-limiting"),
            "offset": string("Cursor returned by a previous call"),
            "size": {"type": "integer", "minimum": 1, "maximum": 1000, "description": "Page size (1-1000)"}
        }),
        &[],
    )
}

fn entity_plugins_schema(id_key: &str, description: &str) -> Schema {
    let mut properties = JsonMap::new();
    properties.insert(id_key.into(), string(description));
    properties.insert(
        "size".into(),
        json!({"type": "integer", "minimum": 1, "description": "Page size"}),
    );
    properties.insert("offset".into(), string("Cursor returned by a previous call"));
    object_schema(Value::Object(properties), &[id_key])
}

pub(crate) fn service_plugins_schema() -> Schema {
    entity_plugins_schema("service_id", "Service id or name")
}

pub(crate) fn route_plugins_schema() -> Schema {
    entity_plugins_schema("route_id", "Route id or name")
}

pub(crate) fn consumer_plugins_schema() -> Schema {
    entity_plugins_schema("consumer_id", "Consumer id or username")
}

pub(crate) fn plugin_id_schema() -> Schema {
    object_schema(json!({"plugin_id": string("Plugin id")}), &["plugin_id"])
}

pub(crate) fn list_scoped_plugins_schema() -> Schema {
    object_schema(
        merge(&[
            json!({"name": string("Filter by plugin name")}),
            scope_properties(),
            pagination(),
        ]),
        &[],
    )
}

pub(crate) fn create_rate_limiting_schema() -> Schema {
    object_schema(
        merge(&[
            window_properties(),
            json!({
                "limit_by": limit_by_property(),
                "policy": policy_property(),
                "fault_tolerant": {"type": "boolean", "description": "Keep proxying when the counter store is unreachable (default true)"},
                "hide_client_headers": {"type": "boolean", "description": "Hide rate-limit headers from clients (default false)"},
                "enabled": {"type": "boolean", "description": "Enable the plugin (default true)"},
                "tags": string_list("Plugin tags")
            }),
            redis_properties(),
            scope_properties(),
        ]),
        &[],
    )
}

pub(crate) fn list_rate_limiting_schema() -> Schema {
    object_schema(
        merge(&[
            scope_properties(),
            json!({"name": string("Plugin name (default rate-limiting)")}),
            pagination(),
        ]),
        &[],
    )
}

pub(crate) fn update_rate_limiting_schema() -> Schema {
    object_schema(
        merge(&[
            json!({"plugin_id": string("Plugin id")}),
            window_properties(),
            json!({
                "limit_by": limit_by_property(),
                "policy": policy_property(),
                "fault_tolerant": {"type": "boolean"},
                "hide_client_headers": {"type": "boolean"},
                "enabled": {"type": "boolean"},
                "tags": string_list("Replacement plugin tags")
            }),
            redis_properties(),
        ]),
        &["plugin_id"],
    )
}

pub(crate) fn protect_route_schema() -> Schema {
    object_schema(
        merge(&[
            json!({"path": string("Path fragment identifying the route, e.g. /healthz")}),
            window_properties(),
            json!({
                "limit_by": limit_by_property(),
                "policy": policy_property(),
                "fault_tolerant": {"type": "boolean"},
                "hide_client_headers": {"type": "boolean"},
                "tags": string_list("Plugin tags")
            }),
        ]),
        &["path"],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_schema_declares_object_type() {
        let schema = empty_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"], json!({}));
        assert!(schema.get("required").is_none());
    }

    #[test]
    fn rate_limiting_schema_lists_all_parameters() {
        let schema = create_rate_limiting_schema();
        let properties = schema["properties"].as_object().unwrap();
        for key in [
            "second",
            "minute",
            "hour",
            "day",
            "month",
            "year",
            "limit_by",
            "policy",
            "fault_tolerant",
            "hide_client_headers",
            "redis_host",
            "redis_port",
            "redis_password",
            "redis_timeout",
            "redis_database",
            "service_id",
            "route_id",
            "consumer_id",
            "enabled",
            "tags",
        ] {
            assert!(properties.contains_key(key), "missing {key}");
        }
        assert_eq!(schema["additionalProperties"], false);
    }

    #[test]
    fn required_fields_are_declared() {
        assert_eq!(create_service_schema()["required"], json!(["name", "url"]));
        assert_eq!(update_rate_limiting_schema()["required"], json!(["plugin_id"]));
        assert_eq!(route_plugins_schema()["required"], json!(["route_id"]));
        assert_eq!(protect_route_schema()["required"], json!(["path"]));
    }
}
