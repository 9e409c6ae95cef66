//! Tool implementations over the Kong Admin API.
//!
//! Every tool takes a borrowed [`AdminClient`] and a typed argument struct,
//! builds its request body from the fields the caller actually supplied, and
//! issues its request through the client. Gateway errors propagate untouched.

/// Defines a field deserializer that reads an explicit `null` as `$default()`.
macro_rules! null_as {
    ($name:ident, $ty:ty, $default:path) => {
        fn $name<'de, D>(deserializer: D) -> Result<$ty, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            let value = <Option<$ty> as serde::Deserialize>::deserialize(deserializer)?;
            Ok(value.unwrap_or_else($default))
        }
    };
}

pub mod basic;
pub mod plugins;
pub mod rate_limiting;
pub mod routes;
pub mod services;
pub mod workflow;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map as JsonMap, Value};

use crate::error::{ToolError, ToolResult};

/// Arguments for tools that take none.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoArgs {}

/// Parses a raw argument object into a tool's typed parameters.
pub fn parse_args<T: DeserializeOwned>(args: JsonMap<String, Value>) -> ToolResult<T> {
    serde_json::from_value(Value::Object(args))
        .map_err(|err| ToolError::InvalidArguments(err.to_string()))
}

/// Field deserializer reading an explicit `null` as `T::default()`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn default_true() -> bool {
    true
}

null_as!(null_as_true, bool, default_true);

/// Confirmation returned by delete tools after a successful remote delete.
pub(crate) fn deleted(message: &str, id_key: &str, id: &str) -> Value {
    let mut body = JsonMap::new();
    body.insert("message".into(), Value::String(message.to_string()));
    body.insert(id_key.into(), Value::String(id.to_string()));
    Value::Object(body)
}

/// Query pairs for the values that are present and non-empty.
pub(crate) fn query<I>(pairs: I) -> Vec<(&'static str, String)>
where
    I: IntoIterator<Item = (&'static str, Option<String>)>,
{
    pairs
        .into_iter()
        .filter_map(|(key, value)| value.filter(|v| !v.is_empty()).map(|v| (key, v)))
        .collect()
}

/// Inserts `value` under `key` when present.
pub(crate) fn insert_opt<T: serde::Serialize>(
    body: &mut JsonMap<String, Value>,
    key: &str,
    value: Option<T>,
) -> ToolResult<()> {
    if let Some(value) = value {
        body.insert(key.to_string(), serde_json::to_value(value)?);
    }
    Ok(())
}
