use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Pagination envelope returned by Kong list endpoints.
///
/// Kong reports the cursor for the next page as `offset`; some versions only
/// send a `next` link. A page with neither is the last one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl Page {
    /// Parses an envelope leniently: a missing or non-array `data` yields an
    /// empty page and non-string cursors are ignored.
    pub fn from_value(value: &Value) -> Self {
        let cursor = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            data: value
                .get("data")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            offset: cursor("offset"),
            next: cursor("next"),
        }
    }

    /// Cursor for the next page: `offset`, else `next`.
    pub fn next_offset(&self) -> Option<&str> {
        self.offset.as_deref().or(self.next.as_deref())
    }

    pub fn is_last(&self) -> bool {
        self.next_offset().is_none()
    }
}

/// Extracts the `data` list from a list response, defaulting to empty.
pub fn unwrap_data(value: Value) -> Vec<Value> {
    match value {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}
