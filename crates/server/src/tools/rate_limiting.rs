//! Rate-limiting plugin tools.
//!
//! Create requests always carry `limit_by`, `policy`, `fault_tolerant` and
//! `hide_client_headers`; window limits appear only when supplied, and the
//! Redis connection fields only under the `redis` policy. Updates send only
//! what the caller supplied.

use kong_mcp_admin::AdminClient;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value};

use super::{default_true, insert_opt, null_as_default, null_as_true, query};
use crate::error::ToolResult;
use crate::scope::PluginScope;

pub const PLUGIN_NAME: &str = "rate-limiting";
pub const DEFAULT_REDIS_PORT: u16 = 6379;
pub const DEFAULT_REDIS_TIMEOUT_MS: u64 = 2000;
pub const DEFAULT_LIST_SIZE: u32 = 100;

/// Entity the gateway counts requests against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LimitBy {
    #[default]
    Consumer,
    Credential,
    Ip,
    Service,
    Header,
    Path,
    ConsumerGroup,
}

impl LimitBy {
    pub fn as_str(self) -> &'static str {
        match self {
            LimitBy::Consumer => "consumer",
            LimitBy::Credential => "credential",
            LimitBy::Ip => "ip",
            LimitBy::Service => "service",
            LimitBy::Header => "header",
            LimitBy::Path => "path",
            LimitBy::ConsumerGroup => "consumer-group",
        }
    }
}

/// Where the gateway keeps its counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    #[default]
    Local,
    Cluster,
    Redis,
}

impl Policy {
    pub fn as_str(self) -> &'static str {
        match self {
            Policy::Local => "local",
            Policy::Cluster => "cluster",
            Policy::Redis => "redis",
        }
    }
}

/// Requests allowed per time window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowLimits {
    pub second: Option<u64>,
    pub minute: Option<u64>,
    pub hour: Option<u64>,
    pub day: Option<u64>,
    pub month: Option<u64>,
    pub year: Option<u64>,
}

impl WindowLimits {
    pub fn is_empty(&self) -> bool {
        self.entries().iter().all(|(_, limit)| limit.is_none())
    }

    fn entries(&self) -> [(&'static str, Option<u64>); 6] {
        [
            ("second", self.second),
            ("minute", self.minute),
            ("hour", self.hour),
            ("day", self.day),
            ("month", self.month),
            ("year", self.year),
        ]
    }

    fn write_to(&self, config: &mut JsonMap<String, Value>) {
        for (key, limit) in self.entries() {
            if let Some(limit) = limit {
                config.insert(key.to_string(), Value::from(limit));
            }
        }
    }
}

fn default_redis_port() -> u16 {
    DEFAULT_REDIS_PORT
}

fn default_redis_timeout() -> u64 {
    DEFAULT_REDIS_TIMEOUT_MS
}

fn default_plugin_name() -> String {
    PLUGIN_NAME.to_string()
}

fn default_list_size() -> u32 {
    DEFAULT_LIST_SIZE
}

null_as!(null_as_redis_port, u16, default_redis_port);
null_as!(null_as_redis_timeout, u64, default_redis_timeout);
null_as!(null_as_plugin_name, String, default_plugin_name);
null_as!(null_as_list_size, u32, default_list_size);

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateRateLimitingArgs {
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
    #[serde(default, deserialize_with = "null_as_default")]
    pub limit_by: LimitBy,
    #[serde(default, deserialize_with = "null_as_default")]
    pub policy: Policy,
    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub fault_tolerant: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hide_client_headers: bool,
    #[serde(default)]
    pub redis_host: Option<String>,
    #[serde(default = "default_redis_port", deserialize_with = "null_as_redis_port")]
    pub redis_port: u16,
    #[serde(default)]
    pub redis_password: Option<String>,
    #[serde(default = "default_redis_timeout", deserialize_with = "null_as_redis_timeout")]
    pub redis_timeout: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub redis_database: u32,
    #[serde(default)]
    pub service_id: Option<String>,
    #[serde(default)]
    pub route_id: Option<String>,
    #[serde(default)]
    pub consumer_id: Option<String>,
    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub enabled: bool,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl Default for CreateRateLimitingArgs {
    fn default() -> Self {
        Self {
            second: None,
            minute: None,
            hour: None,
            day: None,
            month: None,
            year: None,
            limit_by: LimitBy::default(),
            policy: Policy::default(),
            fault_tolerant: true,
            hide_client_headers: false,
            redis_host: None,
            redis_port: DEFAULT_REDIS_PORT,
            redis_password: None,
            redis_timeout: DEFAULT_REDIS_TIMEOUT_MS,
            redis_database: 0,
            service_id: None,
            route_id: None,
            consumer_id: None,
            enabled: true,
            tags: None,
        }
    }
}

impl CreateRateLimitingArgs {
    pub fn windows(&self) -> WindowLimits {
        WindowLimits {
            second: self.second,
            minute: self.minute,
            hour: self.hour,
            day: self.day,
            month: self.month,
            year: self.year,
        }
    }

    pub fn set_windows(&mut self, windows: WindowLimits) {
        self.second = windows.second;
        self.minute = windows.minute;
        self.hour = windows.hour;
        self.day = windows.day;
        self.month = windows.month;
        self.year = windows.year;
    }

    pub fn scope(&self) -> PluginScope {
        PluginScope::resolve(
            self.service_id.as_deref(),
            self.route_id.as_deref(),
            self.consumer_id.as_deref(),
        )
    }

    /// The plugin `config` object.
    pub fn config(&self) -> JsonMap<String, Value> {
        let mut config = JsonMap::new();
        config.insert("limit_by".into(), Value::from(self.limit_by.as_str()));
        config.insert("policy".into(), Value::from(self.policy.as_str()));
        config.insert("fault_tolerant".into(), Value::Bool(self.fault_tolerant));
        config.insert(
            "hide_client_headers".into(),
            Value::Bool(self.hide_client_headers),
        );
        self.windows().write_to(&mut config);

        if self.policy == Policy::Redis {
            if let Some(host) = non_empty(&self.redis_host) {
                config.insert("redis_host".into(), Value::from(host));
            }
            config.insert("redis_port".into(), Value::from(self.redis_port));
            config.insert("redis_timeout".into(), Value::from(self.redis_timeout));
            config.insert("redis_database".into(), Value::from(self.redis_database));
            if let Some(password) = non_empty(&self.redis_password) {
                config.insert("redis_password".into(), Value::from(password));
            }
        }
        config
    }

    /// Full create body: `{name, config, enabled, tags?}`.
    pub fn body(&self) -> Value {
        let mut body = JsonMap::new();
        body.insert("name".into(), Value::from(PLUGIN_NAME));
        body.insert("config".into(), Value::Object(self.config()));
        body.insert("enabled".into(), Value::Bool(self.enabled));
        if let Some(tags) = self.tags.as_ref().filter(|tags| !tags.is_empty()) {
            body.insert("tags".into(), Value::from(tags.clone()));
        }
        Value::Object(body)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateRateLimitingArgs {
    pub plugin_id: String,
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
    #[serde(default)]
    pub limit_by: Option<LimitBy>,
    #[serde(default)]
    pub policy: Option<Policy>,
    #[serde(default)]
    pub fault_tolerant: Option<bool>,
    #[serde(default)]
    pub hide_client_headers: Option<bool>,
    #[serde(default)]
    pub redis_host: Option<String>,
    #[serde(default)]
    pub redis_port: Option<u16>,
    #[serde(default)]
    pub redis_password: Option<String>,
    #[serde(default)]
    pub redis_timeout: Option<u64>,
    #[serde(default)]
    pub redis_database: Option<u32>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl UpdateRateLimitingArgs {
    pub fn set_windows(&mut self, windows: WindowLimits) {
        self.second = windows.second;
        self.minute = windows.minute;
        self.hour = windows.hour;
        self.day = windows.day;
        self.month = windows.month;
        self.year = windows.year;
    }

    /// Patch body; `{}` when nothing was supplied.
    pub fn body(&self) -> ToolResult<Value> {
        let mut config = JsonMap::new();
        WindowLimits {
            second: self.second,
            minute: self.minute,
            hour: self.hour,
            day: self.day,
            month: self.month,
            year: self.year,
        }
        .write_to(&mut config);
        insert_opt(&mut config, "limit_by", self.limit_by)?;
        insert_opt(&mut config, "policy", self.policy)?;
        insert_opt(&mut config, "fault_tolerant", self.fault_tolerant)?;
        insert_opt(&mut config, "hide_client_headers", self.hide_client_headers)?;
        insert_opt(&mut config, "redis_host", self.redis_host.as_deref())?;
        insert_opt(&mut config, "redis_port", self.redis_port)?;
        insert_opt(&mut config, "redis_password", self.redis_password.as_deref())?;
        insert_opt(&mut config, "redis_timeout", self.redis_timeout)?;
        insert_opt(&mut config, "redis_database", self.redis_database)?;

        let mut body = JsonMap::new();
        if !config.is_empty() {
            body.insert("config".into(), Value::Object(config));
        }
        insert_opt(&mut body, "enabled", self.enabled)?;
        insert_opt(&mut body, "tags", self.tags.as_ref())?;
        Ok(Value::Object(body))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListRateLimitingArgs {
    #[serde(default)]
    pub service_id: Option<String>,
    #[serde(default)]
    pub route_id: Option<String>,
    #[serde(default)]
    pub consumer_id: Option<String>,
    #[serde(default = "default_plugin_name", deserialize_with = "null_as_plugin_name")]
    pub name: String,
    #[serde(default = "default_list_size", deserialize_with = "null_as_list_size")]
    pub size: u32,
    #[serde(default)]
    pub offset: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
}

impl Default for ListRateLimitingArgs {
    fn default() -> Self {
        Self {
            service_id: None,
            route_id: None,
            consumer_id: None,
            name: default_plugin_name(),
            size: DEFAULT_LIST_SIZE,
            offset: None,
            tags: None,
        }
    }
}

impl ListRateLimitingArgs {
    pub fn scope(&self) -> PluginScope {
        PluginScope::resolve(
            self.service_id.as_deref(),
            self.route_id.as_deref(),
            self.consumer_id.as_deref(),
        )
    }
}

/// Scoped listing of plugins of any name.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListScopedPluginsArgs {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub service_id: Option<String>,
    #[serde(default)]
    pub route_id: Option<String>,
    #[serde(default)]
    pub consumer_id: Option<String>,
    #[serde(default = "default_list_size", deserialize_with = "null_as_list_size")]
    pub size: u32,
    #[serde(default)]
    pub offset: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginIdArgs {
    pub plugin_id: String,
}

pub async fn create_rate_limiting_plugin(
    client: &AdminClient,
    args: CreateRateLimitingArgs,
) -> ToolResult<Value> {
    let scope = args.scope();
    tracing::debug!(target: "kong_mcp::tools", %scope, "creating rate-limiting plugin");
    Ok(client.post(&scope.collection_path(), &args.body()).await?)
}

/// Rate-limiting plugins in the resolved scope, unwrapped from the envelope.
pub async fn get_rate_limiting_plugins(
    client: &AdminClient,
    args: ListRateLimitingArgs,
) -> ToolResult<Value> {
    let scope = args.scope();
    let mut params = vec![("name", args.name), ("size", args.size.to_string())];
    params.extend(query([("offset", args.offset), ("tags", args.tags)]));
    let response = client.get(&scope.collection_path(), &params).await?;
    Ok(Value::Array(kong_mcp_admin::unwrap_data(response)))
}

pub async fn update_rate_limiting_plugin(
    client: &AdminClient,
    args: UpdateRateLimitingArgs,
) -> ToolResult<Value> {
    let body = args.body()?;
    Ok(client.update_plugin(&args.plugin_id, &body).await?)
}

pub async fn delete_rate_limiting_plugin(
    client: &AdminClient,
    args: PluginIdArgs,
) -> ToolResult<Value> {
    client.delete_plugin(&args.plugin_id).await?;
    Ok(super::deleted(
        "Rate limiting plugin deleted successfully",
        "plugin_id",
        &args.plugin_id,
    ))
}

pub async fn get_plugin(client: &AdminClient, args: PluginIdArgs) -> ToolResult<Value> {
    Ok(client.get_plugin(&args.plugin_id).await?)
}

/// Plugins of any name in the resolved scope, unwrapped from the envelope.
pub async fn list_plugins(client: &AdminClient, args: ListScopedPluginsArgs) -> ToolResult<Value> {
    let scope = PluginScope::resolve(
        args.service_id.as_deref(),
        args.route_id.as_deref(),
        args.consumer_id.as_deref(),
    );
    let mut params = vec![("size", args.size.to_string())];
    params.extend(query([
        ("name", args.name),
        ("offset", args.offset),
        ("tags", args.tags),
    ]));
    let response = client.get(&scope.collection_path(), &params).await?;
    Ok(Value::Array(kong_mcp_admin::unwrap_data(response)))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
