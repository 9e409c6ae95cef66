//! MCP server exposing the Kong Admin API as tools.
//!
//! Tools are declared in a JSON manifest (a built-in one is compiled in) and
//! bound at startup to the typed functions under [`tools`] through the
//! [`registry`]. Each call runs against a fresh
//! [`AdminClient`](kong_mcp_admin::AdminClient).
//!
//! The server speaks MCP over stdio by default. The `http-transport`
//! feature (on by default) adds Streamable HTTP at `/mcp` plus plain
//! discovery, ping and JSON-RPC request endpoints.
//!
//! The main entry point is [`run`], used by the `kong-mcp` binary.

mod app;
mod cli;
mod commands;
pub mod config;
#[cfg(feature = "http-transport")]
pub mod endpoints;
pub mod error;
pub mod handler;
#[cfg(feature = "http-transport")]
pub mod http_transport;
pub mod registry;
pub mod scope;
mod tool_schemas;
pub mod tools;

pub use app::run;
pub use error::{ToolError, ToolResult};
pub use handler::KongToolService;
pub use registry::{ToolManifest, ToolRegistry};
