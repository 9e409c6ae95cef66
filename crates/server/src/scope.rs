//! Plugin scope routing.
//!
//! A plugin instance applies to at most one entity. When several scope ids
//! are supplied the first match wins, in the order service, route,
//! consumer; with none the plugin is global.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginScope {
    Global,
    Service(String),
    Route(String),
    Consumer(String),
}

impl PluginScope {
    /// Picks the scope from optional ids. Empty ids count as absent.
    pub fn resolve(
        service_id: Option<&str>,
        route_id: Option<&str>,
        consumer_id: Option<&str>,
    ) -> Self {
        let present = |id: Option<&str>| id.filter(|id| !id.is_empty()).map(str::to_string);
        if let Some(id) = present(service_id) {
            PluginScope::Service(id)
        } else if let Some(id) = present(route_id) {
            PluginScope::Route(id)
        } else if let Some(id) = present(consumer_id) {
            PluginScope::Consumer(id)
        } else {
            PluginScope::Global
        }
    }

    /// Admin API path of the plugin collection for this scope.
    pub fn collection_path(&self) -> String {
        match self {
            PluginScope::Global => "/plugins".to_string(),
            PluginScope::Service(id) => format!("/services/{id}/plugins"),
            PluginScope::Route(id) => format!("/routes/{id}/plugins"),
            PluginScope::Consumer(id) => format!("/consumers/{id}/plugins"),
        }
    }
}

impl fmt::Display for PluginScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginScope::Global => f.write_str("global"),
            PluginScope::Service(id) => write!(f, "service {id}"),
            PluginScope::Route(id) => write!(f, "route {id}"),
            PluginScope::Consumer(id) => write!(f, "consumer {id}"),
        }
    }
}
