//! Static binding table from manifest `(module, function)` pairs to handlers.

use futures::future::BoxFuture;
use kong_mcp_admin::AdminClient;
use serde_json::{Map as JsonMap, Value};

use crate::error::ToolResult;
use crate::tool_schemas::{self as schemas, Schema};
use crate::tools::{basic, parse_args, plugins, rate_limiting, routes, services, workflow};

pub(crate) type ToolFuture = BoxFuture<'static, ToolResult<Value>>;

/// Type-erased tool entry point: owns its client and raw arguments.
pub(crate) type Handler = fn(AdminClient, JsonMap<String, Value>) -> ToolFuture;

/// Wraps a typed `async fn(&AdminClient, Args)` into a [`Handler`].
macro_rules! typed_tool {
    ($func:path) => {{
        fn handler(client: AdminClient, args: JsonMap<String, Value>) -> ToolFuture {
            Box::pin(async move {
                let args = parse_args(args)?;
                $func(&client, args).await
            })
        }
        handler as Handler
    }};
}

/// A callable the manifest can refer to.
#[derive(Clone, Copy)]
pub(crate) struct ToolBinding {
    pub module: &'static str,
    pub function: &'static str,
    pub title: &'static str,
    /// Used when the manifest entry has no description.
    pub description: &'static str,
    pub handler: Handler,
    pub schema: fn() -> Schema,
}

impl std::fmt::Debug for ToolBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolBinding")
            .field("module", &self.module)
            .field("function", &self.function)
            .finish_non_exhaustive()
    }
}

fn binding(
    module: &'static str,
    function: &'static str,
    title: &'static str,
    description: &'static str,
    handler: Handler,
    schema: fn() -> Schema,
) -> ToolBinding {
    ToolBinding {
        module,
        function,
        title,
        description,
        handler,
        schema,
    }
}

pub(crate) fn bindings() -> Vec<ToolBinding> {
    vec![
        binding(
            "basic",
            "hello_world",
            "Hello world",
            "Returns a fixed greeting; useful to check the server is reachable.",
            typed_tool!(basic::hello_world),
            schemas::empty_schema,
        ),
        binding(
            "basic",
            "kong_status",
            "Kong node status",
            "Returns the Kong node status report from GET /status.",
            typed_tool!(basic::kong_status),
            schemas::empty_schema,
        ),
        binding(
            "kong_services",
            "get_services",
            "List services",
            "Retrieve Kong services, optionally filtered by tags.",
            typed_tool!(services::get_services),
            schemas::list_services_schema,
        ),
        binding(
            "kong_services",
            "create_service",
            "Create service",
            "Create a Kong service pointing at an upstream URL.",
            typed_tool!(services::create_service),
            schemas::create_service_schema,
        ),
        binding(
            "kong_services",
            "update_service",
            "Update service",
            "Update the supplied fields of a Kong service.",
            typed_tool!(services::update_service),
            schemas::update_service_schema,
        ),
        binding(
            "kong_services",
            "delete_service",
            "Delete service",
            "Delete a Kong service by id or name.",
            typed_tool!(services::delete_service),
            schemas::delete_service_schema,
        ),
        binding(
            "kong_routes",
            "get_routes",
            "List routes",
            "Retrieve Kong routes, optionally filtered by tags.",
            typed_tool!(routes::get_routes),
            schemas::list_routes_schema,
        ),
        binding(
            "kong_routes",
            "create_route",
            "Create route",
            "Create a Kong route attached to a service.",
            typed_tool!(routes::create_route),
            schemas::create_route_schema,
        ),
        binding(
            "kong_routes",
            "update_route",
            "Update route",
            "Update the supplied fields of a Kong route.",
            typed_tool!(routes::update_route),
            schemas::update_route_schema,
        ),
        binding(
            "kong_routes",
            "delete_route",
            "Delete route",
            "Delete a Kong route by id or name.",
            typed_tool!(routes::delete_route),
            schemas::delete_route_schema,
        ),
        binding(
            "kong_plugins",
            "get_plugins",
            "List plugins",
            "Retrieve plugins with an optional name filter and pagination.",
            typed_tool!(plugins::get_plugins),
            schemas::get_plugins_schema,
        ),
        binding(
            "kong_plugins",
            "get_plugins_by_service",
            "List service plugins",
            "Retrieve plugins attached to a service.",
            typed_tool!(plugins::get_plugins_by_service),
            schemas::service_plugins_schema,
        ),
        binding(
            "kong_plugins",
            "get_plugins_by_route",
            "List route plugins",
            "Retrieve plugins attached to a route.",
            typed_tool!(plugins::get_plugins_by_route),
            schemas::route_plugins_schema,
        ),
        binding(
            "kong_plugins",
            "get_plugins_by_consumer",
            "List consumer plugins",
            "Retrieve plugins attached to a consumer.",
            typed_tool!(plugins::get_plugins_by_consumer),
            schemas::consumer_plugins_schema,
        ),
        binding(
            "kong_rate_limiting",
            "get_plugin",
            "Get plugin",
            "Get a plugin by id.",
            typed_tool!(rate_limiting::get_plugin),
            schemas::plugin_id_schema,
        ),
        binding(
            "kong_rate_limiting",
            "list_plugins",
            "List scoped plugins",
            "List plugins in the global, service, route or consumer scope.",
            typed_tool!(rate_limiting::list_plugins),
            schemas::list_scoped_plugins_schema,
        ),
        binding(
            "kong_rate_limiting",
            "create_rate_limiting_plugin",
            "Create rate limit",
            "Create a rate-limiting plugin in the global, service, route or consumer scope.",
            typed_tool!(rate_limiting::create_rate_limiting_plugin),
            schemas::create_rate_limiting_schema,
        ),
        binding(
            "kong_rate_limiting",
            "get_rate_limiting_plugins",
            "List rate limits",
            "Retrieve rate-limiting plugins with scope and tag filters.",
            typed_tool!(rate_limiting::get_rate_limiting_plugins),
            schemas::list_rate_limiting_schema,
        ),
        binding(
            "kong_rate_limiting",
            "update_rate_limiting_plugin",
            "Update rate limit",
            "Update the supplied settings of a rate-limiting plugin.",
            typed_tool!(rate_limiting::update_rate_limiting_plugin),
            schemas::update_rate_limiting_schema,
        ),
        binding(
            "kong_rate_limiting",
            "delete_rate_limiting_plugin",
            "Delete rate limit",
            "Delete a rate-limiting plugin by id.",
            typed_tool!(rate_limiting::delete_rate_limiting_plugin),
            schemas::plugin_id_schema,
        ),
        binding(
            "kong_workflows",
            "protect_route",
            "Protect route",
            "Find the route serving a path and create or update its rate-limiting plugin.",
            typed_tool!(workflow::protect_route),
            schemas::protect_route_schema,
        ),
    ]
}

pub(crate) fn lookup(module: &str, function: &str) -> Option<ToolBinding> {
    bindings()
        .into_iter()
        .find(|b| b.module == module && b.function == function)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn bindings_are_unique() {
        let mut seen = HashSet::new();
        for b in bindings() {
            assert!(
                seen.insert((b.module, b.function)),
                "duplicate binding {}.{}",
                b.module,
                b.function
            );
        }
    }

    #[test]
    fn every_schema_is_an_object() {
        for b in bindings() {
            let schema = (b.schema)();
            assert_eq!(schema["type"], "object", "{}.{}", b.module, b.function);
        }
    }

    #[test]
    fn lookup_misses_unknown_pairs() {
        assert!(lookup("basic", "hello_world").is_some());
        assert!(lookup("basic", "goodbye").is_none());
        assert!(lookup("kong_nope", "hello_world").is_none());
    }
}
