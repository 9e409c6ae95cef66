//! Multi-step workflows built from the single-request tools.

use kong_mcp_admin::{AdminClient, Page};
use serde::Deserialize;
use serde_json::{json, Value};

use super::rate_limiting::{
    self, CreateRateLimitingArgs, LimitBy, ListRateLimitingArgs, Policy, UpdateRateLimitingArgs,
    WindowLimits,
};
use super::{default_true, null_as_default, null_as_true};
use crate::error::{ToolError, ToolResult};

fn default_limit_by() -> LimitBy {
    LimitBy::Ip
}

null_as!(null_as_limit_by, LimitBy, default_limit_by);

/// Largest page size Kong accepts.
const ROUTE_PAGE_SIZE: u32 = 1000;

/// Rate limits to put on the route serving `path`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProtectRouteArgs {
    /// Path fragment matched against each route's `paths`.
    pub path: String,
    #[serde(default)]
    pub second: Option<u64>,
    #[serde(default)]
    pub minute: Option<u64>,
    #[serde(default)]
    pub hour: Option<u64>,
    #[serde(default)]
    pub day: Option<u64>,
    #[serde(default)]
    pub month: Option<u64>,
    #[serde(default)]
    pub year: Option<u64>,
    #[serde(default = "default_limit_by", deserialize_with = "null_as_limit_by")]
    pub limit_by: LimitBy,
    #[serde(default, deserialize_with = "null_as_default")]
    pub policy: Policy,
    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub fault_tolerant: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hide_client_headers: bool,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl ProtectRouteArgs {
    pub fn new(path: impl Into<String>, windows: WindowLimits) -> Self {
        Self {
            path: path.into(),
            second: windows.second,
            minute: windows.minute,
            hour: windows.hour,
            day: windows.day,
            month: windows.month,
            year: windows.year,
            limit_by: default_limit_by(),
            policy: Policy::default(),
            fault_tolerant: true,
            hide_client_headers: false,
            tags: None,
        }
    }

    fn windows(&self) -> WindowLimits {
        WindowLimits {
            second: self.second,
            minute: self.minute,
            hour: self.hour,
            day: self.day,
            month: self.month,
            year: self.year,
        }
    }
}

/// First route with a path containing `fragment`.
pub fn find_route_by_path<'a>(routes: &'a [Value], fragment: &str) -> Option<&'a Value> {
    routes.iter().find(|route| {
        route
            .get("paths")
            .and_then(Value::as_array)
            .is_some_and(|paths| {
                paths
                    .iter()
                    .filter_map(Value::as_str)
                    .any(|path| path.contains(fragment))
            })
    })
}

/// Id of the first route serving `fragment`, following Kong's page cursor
/// until the route is found or the listing ends.
async fn find_route_id(client: &AdminClient, fragment: &str) -> ToolResult<Option<String>> {
    let mut offset: Option<String> = None;
    loop {
        let mut params = vec![("size", ROUTE_PAGE_SIZE.to_string())];
        if let Some(offset) = &offset {
            params.push(("offset", offset.clone()));
        }
        let page = Page::from_value(&client.get("/routes", &params).await?);
        let found = find_route_by_path(&page.data, fragment)
            .and_then(|route| route.get("id"))
            .and_then(Value::as_str);
        if let Some(route_id) = found {
            return Ok(Some(route_id.to_string()));
        }
        match page.next_offset() {
            // A cursor that does not move would loop forever.
            Some(next) if offset.as_deref() != Some(next) => offset = Some(next.to_string()),
            _ => return Ok(None),
        }
    }
}

/// Puts a rate-limiting plugin on the route serving `path`.
///
/// Looks the route up, then updates its existing rate-limiting plugin or
/// creates one. Returns `{action, route_id, plugin}` where `action` is
/// `created` or `updated`.
pub async fn protect_route(client: &AdminClient, args: ProtectRouteArgs) -> ToolResult<Value> {
    let windows = args.windows();
    if windows.is_empty() {
        return Err(ToolError::Validation(
            "at least one time-window limit (second, minute, hour, day, month, year) is required"
                .to_string(),
        ));
    }

    let route_id = find_route_id(client, &args.path)
        .await?
        .ok_or_else(|| ToolError::Validation(format!("no route matches path `{}`", args.path)))?;

    let existing = rate_limiting::get_rate_limiting_plugins(
        client,
        ListRateLimitingArgs {
            route_id: Some(route_id.clone()),
            ..Default::default()
        },
    )
    .await?;
    let existing_id = existing
        .as_array()
        .and_then(|plugins| plugins.first())
        .and_then(|plugin| plugin.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let (action, plugin) = match existing_id {
        Some(plugin_id) => {
            tracing::info!(target: "kong_mcp::tools", %route_id, %plugin_id, "updating rate-limiting plugin");
            let mut update = UpdateRateLimitingArgs {
                plugin_id,
                limit_by: Some(args.limit_by),
                policy: Some(args.policy),
                fault_tolerant: Some(args.fault_tolerant),
                hide_client_headers: Some(args.hide_client_headers),
                tags: args.tags,
                ..Default::default()
            };
            update.set_windows(windows);
            (
                "updated",
                rate_limiting::update_rate_limiting_plugin(client, update).await?,
            )
        }
        None => {
            tracing::info!(target: "kong_mcp::tools", %route_id, "creating rate-limiting plugin");
            let mut create = CreateRateLimitingArgs {
                limit_by: args.limit_by,
                policy: args.policy,
                fault_tolerant: args.fault_tolerant,
                hide_client_headers: args.hide_client_headers,
                route_id: Some(route_id.clone()),
                tags: args.tags,
                ..Default::default()
            };
            create.set_windows(windows);
            (
                "created",
                rate_limiting::create_rate_limiting_plugin(client, create).await?,
            )
        }
    };

    Ok(json!({
        "action": action,
        "route_id": route_id,
        "plugin": plugin,
    }))
}
