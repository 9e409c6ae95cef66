//! Async client for the Kong Admin API.
//!
//! [`AdminClient`] is the single point of HTTP communication with the
//! gateway. It owns a lazily built `reqwest::Client`, authenticates with
//! either a bearer token or HTTP basic auth, and turns every non-2xx
//! response into an [`AdminError::Status`] carrying the status code and the
//! gateway's message.
//!
//! Configuration is resolved by [`AdminConfig::from_env`] and can be layered
//! with explicit values through [`AdminOverrides`]:
//!
//! ```no_run
//! # async fn demo() -> Result<(), kong_mcp_admin::AdminError> {
//! use kong_mcp_admin::{AdminClient, AdminConfig, AdminOverrides};
//!
//! let config = AdminOverrides {
//!     base_url: Some("https://kong.internal:8444".into()),
//!     ..Default::default()
//! }
//! .apply(AdminConfig::from_env());
//! let client = AdminClient::new(config)?;
//! let services = client.get_services(&[]).await?;
//! # let _ = services;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod page;

pub use client::{AdminClient, QueryParams};
pub use config::{
    parse_bool_flag, AdminAuth, AdminConfig, AdminOverrides, DEFAULT_ADMIN_URL,
    DEFAULT_TIMEOUT_SECS, ENV_ADMIN_URL, ENV_API_TOKEN, ENV_PASSWORD, ENV_TIMEOUT, ENV_USERNAME,
    ENV_VERIFY_SSL,
};
pub use error::{AdminError, AdminResult};
pub use page::{unwrap_data, Page};
