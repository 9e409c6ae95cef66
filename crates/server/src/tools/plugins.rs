//! Plugin listing tools.

use kong_mcp_admin::{AdminClient, Page};
use serde::Deserialize;
use serde_json::{json, Value};

use super::query;
use crate::error::{ToolError, ToolResult};

pub const MIN_PAGE_SIZE: i64 = 1;
pub const MAX_PAGE_SIZE: i64 = 1000;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListPluginsArgs {
    /// Plugin name filter, e.g. `rate-limiting`.
    #[serde(default)]
    pub name: Option<String>,
    /// Cursor returned by a previous call.
    #[serde(default)]
    pub offset: Option<String>,
    #[serde(default)]
    pub size: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServicePluginsArgs {
    pub service_id: String,
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub offset: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutePluginsArgs {
    pub route_id: String,
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub offset: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsumerPluginsArgs {
    pub consumer_id: String,
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub offset: Option<String>,
}

pub fn validate_page_size(size: Option<i64>) -> ToolResult<()> {
    match size {
        Some(size) if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&size) => Err(
            ToolError::Validation("Size must be between 1 and 1000".to_string()),
        ),
        _ => Ok(()),
    }
}

/// Lists global plugins as `{data, offset}`.
///
/// `offset` is the next-page cursor, taken from Kong's `next` field when
/// `offset` is absent, and `null` on the last page.
pub async fn get_plugins(client: &AdminClient, args: ListPluginsArgs) -> ToolResult<Value> {
    validate_page_size(args.size)?;
    let params = query([
        ("name", args.name),
        ("offset", args.offset),
        ("size", args.size.map(|s| s.to_string())),
    ]);
    let page = Page::from_value(&client.get_plugins(&params).await?);
    Ok(json!({
        "data": page.data,
        "offset": page.next_offset(),
    }))
}

fn page_query(size: Option<u32>, offset: Option<String>) -> Vec<(&'static str, String)> {
    query([
        ("size", size.filter(|s| *s > 0).map(|s| s.to_string())),
        ("offset", offset),
    ])
}

pub async fn get_plugins_by_service(
    client: &AdminClient,
    args: ServicePluginsArgs,
) -> ToolResult<Value> {
    let params = page_query(args.size, args.offset);
    Ok(client
        .get_plugins_by_service(&args.service_id, &params)
        .await?)
}

pub async fn get_plugins_by_route(
    client: &AdminClient,
    args: RoutePluginsArgs,
) -> ToolResult<Value> {
    let params = page_query(args.size, args.offset);
    Ok(client.get_plugins_by_route(&args.route_id, &params).await?)
}

pub async fn get_plugins_by_consumer(
    client: &AdminClient,
    args: ConsumerPluginsArgs,
) -> ToolResult<Value> {
    let params = page_query(args.size, args.offset);
    Ok(client
        .get_plugins_by_consumer(&args.consumer_id, &params)
        .await?)
}
