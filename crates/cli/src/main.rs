//! Command-line interface for the `kong-mcp` application.
//!
//! This crate is the executable entry point; everything else lives in
//! `kong-mcp-server`.

fn main() -> anyhow::Result<()> {
    kong_mcp_server::run()
}
