//! HTTP transport for remote MCP access.
//!
//! Serves Streamable HTTP MCP at `/mcp` next to the plain endpoints from
//! [`crate::endpoints`], behind optional bearer auth, CORS and TLS.
//!
//! ## Security Features
//!
//! - **Bearer Token Auth**: Validates `Authorization: Bearer <token>` header with constant-time comparison
//! - **TLS/HTTPS**: Supports TLS with custom certificates
//! - **CORS**: Configurable Cross-Origin Resource Sharing for browser clients

use crate::endpoints::{self, MCP_PATH};
use crate::handler::KongToolService;
use crate::registry::ToolRegistry;
use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tower_http::cors::{Any, CorsLayer};

/// Configuration for HTTP transport security.
///
/// Note: `Debug` is manually implemented to prevent auth_token from being logged.
#[derive(Clone, Default)]
pub struct HttpSecurityConfig {
    /// Bearer token for authentication (None = no auth).
    pub auth_token: Option<String>,
    /// TLS certificate path (requires tls_key).
    pub tls_cert: Option<std::path::PathBuf>,
    /// TLS private key path (requires tls_cert).
    pub tls_key: Option<std::path::PathBuf>,
    /// Allowed CORS origins (empty = no CORS).
    pub cors_origins: Vec<String>,
}

// Custom Debug implementation that redacts auth_token to prevent credential leakage in logs.
impl std::fmt::Debug for HttpSecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSecurityConfig")
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("tls_cert", &self.tls_cert)
            .field("tls_key", &self.tls_key)
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

impl HttpSecurityConfig {
    /// Returns true if TLS is configured.
    pub fn has_tls(&self) -> bool {
        self.tls_cert.is_some() && self.tls_key.is_some()
    }

    /// Returns true if auth is required.
    pub fn has_auth(&self) -> bool {
        self.auth_token.is_some()
    }

    fn cors_mode(&self) -> String {
        match self.cors_origins.as_slice() {
            [] => "disabled".to_string(),
            origins if origins.iter().any(|o| o == "*") => "allow-all".to_string(),
            origins => format!("{} origins", origins.len()),
        }
    }
}

/// Checks an `Authorization: Bearer <token>` header in constant time.
///
/// The error is the reason for the rejection, for logging only.
fn check_bearer(headers: &axum::http::HeaderMap, expected: &[u8]) -> Result<(), &'static str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or("missing Authorization header")?
        .to_str()
        .map_err(|_| "Authorization header not valid UTF-8")?;
    let provided = value
        .strip_prefix("Bearer ")
        .ok_or("malformed Authorization header (expected 'Bearer <token>')")?
        .as_bytes();
    if provided.len() == expected.len() && bool::from(provided.ct_eq(expected)) {
        Ok(())
    } else {
        Err("invalid token")
    }
}

/// Bearer token authentication middleware.
async fn auth_middleware(
    expected_token: Arc<String>,
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    match check_bearer(req.headers(), expected_token.as_bytes()) {
        Ok(()) => next.run(req).await,
        Err(reason) => {
            tracing::debug!(
                target: "kong_mcp::http",
                uri = req.uri().path(),
                reason,
                "Auth failed"
            );
            // Same body for every failure.
            (
                StatusCode::UNAUTHORIZED,
                "Invalid or missing authorization token",
            )
                .into_response()
        }
    }
}

/// Builds the CORS layer from allowed origins.
///
/// Empty means no CORS (server-to-server only); `*` allows any origin.
/// Origins that are not valid header values are skipped with a warning.
fn build_cors_layer(origins: &[String], has_auth: bool) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new();
    }
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.iter().any(|o| o == "*") {
        if has_auth {
            tracing::warn!(
                target: "kong_mcp::http",
                "Wildcard CORS ('*') combined with an auth token lets any site send authenticated requests; list explicit origins instead"
            );
        }
        return layer.allow_origin(Any);
    }

    let valid: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(
                    target: "kong_mcp::http",
                    origin,
                    error = %e,
                    "Ignoring unparsable CORS origin"
                );
                None
            }
        })
        .collect();
    if valid.is_empty() {
        tracing::warn!(
            target: "kong_mcp::http",
            "No CORS origin could be parsed; cross-origin requests will be rejected"
        );
    }
    layer.allow_origin(valid)
}

/// Builds the complete HTTP application: MCP at `/mcp`, the plain
/// endpoints, CORS, and bearer auth over everything when a token is set.
pub fn build_router(registry: Arc<ToolRegistry>, security: &HttpSecurityConfig) -> axum::Router {
    let mcp_registry = Arc::clone(&registry);
    let mcp_service = StreamableHttpService::new(
        move || Ok(KongToolService::new(Arc::clone(&mcp_registry))),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig::default(),
    );

    let cors_layer = build_cors_layer(&security.cors_origins, security.has_auth());
    let app = endpoints::router(registry)
        .nest_service(MCP_PATH, mcp_service)
        .layer(cors_layer);

    match security.auth_token.clone() {
        Some(token) => {
            let token = Arc::new(token);
            app.layer(axum::middleware::from_fn(move |req, next| {
                let token = token.clone();
                auth_middleware(token, req, next)
            }))
        }
        None => app,
    }
}

/// Starts the HTTP server.
///
/// # Security
/// Without an auth token the endpoints are open to anyone who can reach
/// `bind_addr`. Only bind to localhost or trusted network interfaces.
pub async fn serve_http(
    registry: Arc<ToolRegistry>,
    bind_addr: &str,
    security: HttpSecurityConfig,
) -> Result<()> {
    let addr: SocketAddr = bind_addr
        .parse()
        .with_context(|| format!("invalid bind address: {bind_addr}"))?;

    let protocol = if security.has_tls() { "HTTPS" } else { "HTTP" };
    let auth = if security.has_auth() { "enabled" } else { "disabled" };

    tracing::info!(
        target: "kong_mcp::http",
        bind = %addr,
        protocol,
        auth,
        cors = %security.cors_mode(),
        tools = registry.len(),
        "Starting MCP server"
    );

    let app = build_router(registry, &security);
    match (security.tls_cert, security.tls_key) {
        (Some(cert_path), Some(key_path)) => serve_with_tls(app, addr, &cert_path, &key_path).await,
        _ => serve_without_tls(app, addr).await,
    }
}

/// Serve HTTP without TLS.
async fn serve_without_tls(app: axum::Router, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    tracing::info!(
        target: "kong_mcp::http",
        bind = %addr,
        "MCP HTTP server listening"
    );

    axum::serve(listener, app)
        .await
        .context("HTTP server error")?;

    Ok(())
}

/// Serve HTTPS with TLS.
async fn serve_with_tls(
    app: axum::Router,
    addr: SocketAddr,
    cert_path: &Path,
    key_path: &Path,
) -> Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    let tls_config = RustlsConfig::from_pem_file(cert_path, key_path)
        .await
        .with_context(|| {
            format!(
                "failed to load TLS config from cert={} key={}",
                cert_path.display(),
                key_path.display()
            )
        })?;

    tracing::info!(
        target: "kong_mcp::http",
        bind = %addr,
        cert = %cert_path.display(),
        "MCP HTTPS server listening (TLS enabled)"
    );

    axum_server::bind_rustls(addr, tls_config)
        .serve(app.into_make_service())
        .await
        .context("HTTPS server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serve_http_rejects_bad_bind_address() {
        let registry = Arc::new(
            ToolRegistry::builtin(kong_mcp_admin::AdminConfig::default()).unwrap(),
        );
        let err = serve_http(registry, "not-an-address", HttpSecurityConfig::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid bind address"));
    }

    #[test]
    fn check_bearer_reports_reason() {
        use axum::http::HeaderMap;
        let mut headers = HeaderMap::new();
        assert_eq!(
            check_bearer(&headers, b"tok"),
            Err("missing Authorization header")
        );
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("tok"));
        assert!(check_bearer(&headers, b"tok").unwrap_err().starts_with("malformed"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer to"));
        assert_eq!(check_bearer(&headers, b"tok"), Err("invalid token"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer tok"));
        assert_eq!(check_bearer(&headers, b"tok"), Ok(()));
    }

    #[test]
    fn cors_mode_summarises_origins() {
        let mut config = HttpSecurityConfig::default();
        assert_eq!(config.cors_mode(), "disabled");
        config.cors_origins = vec!["*".into()];
        assert_eq!(config.cors_mode(), "allow-all");
        config.cors_origins = vec!["http://a".into(), "http://b".into()];
        assert_eq!(config.cors_mode(), "2 origins");
    }

    #[test]
    fn security_config_defaults() {
        let config = HttpSecurityConfig::default();
        assert!(!config.has_tls());
        assert!(!config.has_auth());
    }

    #[test]
    fn security_config_debug_redacts_token() {
        let config = HttpSecurityConfig {
            auth_token: Some("super-secret-token".to_string()),
            ..Default::default()
        };
        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("super-secret"));
        assert!(debug_output.contains("[REDACTED]"));
    }

    // Auth middleware integration tests using axum's test utilities
    mod auth_middleware_tests {
        use super::*;
        use axum::body::Body;
        use axum::http::Request;
        use tower::ServiceExt;

        fn test_app(token: &str) -> axum::Router {
            let token = Arc::new(token.to_string());
            axum::Router::new()
                .route("/test", axum::routing::get(|| async { "OK" }))
                .layer(axum::middleware::from_fn(move |req, next| {
                    let token = token.clone();
                    auth_middleware(token, req, next)
                }))
        }

        #[tokio::test]
        async fn auth_success_with_valid_token() {
            let app = test_app("secret-token");
            let req = Request::builder()
                .uri("/test")
                .header("Authorization", "Bearer secret-token")
                .body(Body::empty())
                .unwrap();

            let response = app.oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        #[tokio::test]
        async fn auth_fails_with_missing_header() {
            let app = test_app("secret-token");
            let req = Request::builder().uri("/test").body(Body::empty()).unwrap();

            let response = app.oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }

        #[tokio::test]
        async fn auth_fails_with_invalid_token() {
            let app = test_app("secret-token");
            let req = Request::builder()
                .uri("/test")
                .header("Authorization", "Bearer wrong-token")
                .body(Body::empty())
                .unwrap();

            let response = app.oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }

        #[tokio::test]
        async fn auth_is_case_sensitive() {
            let app = test_app("Secret-Token");
            // Same token but different case
            let req = Request::builder()
                .uri("/test")
                .header("Authorization", "Bearer secret-token")
                .body(Body::empty())
                .unwrap();

            let response = app.oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }

    mod router_tests {
        use super::*;
        use axum::body::Body;
        use axum::http::Request;
        use kong_mcp_admin::AdminConfig;
        use tower::ServiceExt;

        fn registry() -> Arc<ToolRegistry> {
            Arc::new(ToolRegistry::builtin(AdminConfig::default()).unwrap())
        }

        #[tokio::test]
        async fn endpoints_are_open_without_token() {
            let app = build_router(registry(), &HttpSecurityConfig::default());
            let req = Request::get("/sse/ping").body(Body::empty()).unwrap();
            let response = app.oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        #[tokio::test]
        async fn token_protects_plain_endpoints() {
            let security = HttpSecurityConfig {
                auth_token: Some("secret-token".into()),
                ..Default::default()
            };
            let app = build_router(registry(), &security);

            let req = Request::get("/api").body(Body::empty()).unwrap();
            let response = app.clone().oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

            let req = Request::get("/api")
                .header("Authorization", "Bearer secret-token")
                .body(Body::empty())
                .unwrap();
            let response = app.oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        #[tokio::test]
        async fn token_protects_mcp_endpoint() {
            let security = HttpSecurityConfig {
                auth_token: Some("secret-token".into()),
                ..Default::default()
            };
            let app = build_router(registry(), &security);
            let req = Request::post(MCP_PATH)
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .unwrap();
            let response = app.oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }

        #[tokio::test]
        async fn cors_preflight_echoes_allowed_origin() {
            let security = HttpSecurityConfig {
                cors_origins: vec!["https://app.example.com".into(), "bad\norigin".into()],
                ..Default::default()
            };
            let app = build_router(registry(), &security);
            let req = Request::builder()
                .method(Method::OPTIONS)
                .uri("/api")
                .header(header::ORIGIN, "https://app.example.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap();
            let response = app.oneshot(req).await.unwrap();
            assert_eq!(
                response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
                "https://app.example.com"
            );
        }
    }

    mod tls_tests {
        use super::*;
        use std::io::Write;

        fn loopback() -> SocketAddr {
            "127.0.0.1:0".parse().unwrap()
        }

        #[tokio::test]
        async fn missing_cert_files_fail_before_binding() {
            let err = serve_with_tls(
                axum::Router::new(),
                loopback(),
                Path::new("/nonexistent/cert.pem"),
                Path::new("/nonexistent/key.pem"),
            )
            .await
            .unwrap_err();
            assert!(err.to_string().contains("failed to load TLS config"));
        }

        #[tokio::test]
        async fn invalid_pem_is_rejected() {
            let mut cert_file = tempfile::NamedTempFile::new().unwrap();
            let mut key_file = tempfile::NamedTempFile::new().unwrap();
            writeln!(cert_file, "not a valid certificate").unwrap();
            writeln!(key_file, "not a valid key").unwrap();

            let result =
                serve_with_tls(axum::Router::new(), loopback(), cert_file.path(), key_file.path())
                    .await;
            assert!(result.is_err());
        }

        #[test]
        fn tls_requires_both_cert_and_key() {
            let cert_only = HttpSecurityConfig {
                tls_cert: Some("/path/to/cert.pem".into()),
                ..Default::default()
            };
            assert!(!cert_only.has_tls());

            let key_only = HttpSecurityConfig {
                tls_key: Some("/path/to/key.pem".into()),
                ..Default::default()
            };
            assert!(!key_only.has_tls());

            let both = HttpSecurityConfig {
                tls_cert: Some("/path/to/cert.pem".into()),
                tls_key: Some("/path/to/key.pem".into()),
                ..Default::default()
            };
            assert!(both.has_tls());
        }
    }
}
