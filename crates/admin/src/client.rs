use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde_json::Value;
use tokio::sync::OnceCell;

use crate::config::{AdminAuth, AdminConfig};
use crate::error::{AdminError, AdminResult};
use crate::page::unwrap_data;

/// Query string pairs appended to a request.
pub type QueryParams<'a> = &'a [(&'a str, String)];

const NO_QUERY: QueryParams<'static> = &[];

/// Client for the Kong Admin API.
///
/// The underlying `reqwest::Client` is built on first use and at most once
/// per instance. Dropping the `AdminClient` releases it, so a caller that
/// creates one client per operation releases the connection on every exit
/// path.
pub struct AdminClient {
    config: AdminConfig,
    base_url: String,
    headers: HeaderMap,
    http: OnceCell<reqwest::Client>,
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("config", &self.config)
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl AdminClient {
    /// Validates `config` without opening any connection.
    pub fn new(config: AdminConfig) -> AdminResult<Self> {
        let parsed = Url::parse(&config.base_url).map_err(|err| AdminError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: err.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AdminError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: format!("unsupported scheme `{}`", parsed.scheme()),
            });
        }
        let headers = default_headers(&config)?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            config,
            headers,
            http: OnceCell::new(),
        })
    }

    /// Shorthand for `AdminClient::new(AdminConfig::from_env())`.
    pub fn from_env() -> AdminResult<Self> {
        Self::new(AdminConfig::from_env())
    }

    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    /// Returns the HTTP client, building it on the first call.
    pub async fn acquire(&self) -> AdminResult<&reqwest::Client> {
        self.http
            .get_or_try_init(|| async {
                tracing::debug!(
                    target: "kong_mcp::admin",
                    base_url = %self.base_url,
                    timeout_secs = self.config.timeout.as_secs_f64(),
                    verify_tls = self.config.verify_tls,
                    "opening admin API client"
                );
                reqwest::Client::builder()
                    .default_headers(self.headers.clone())
                    .timeout(self.config.timeout)
                    .danger_accept_invalid_certs(!self.config.verify_tls)
                    .build()
                    .map_err(AdminError::Transport)
            })
            .await
    }

    pub fn is_connected(&self) -> bool {
        self.http.initialized()
    }

    /// Releases the HTTP client. The next request acquires a new one.
    pub fn close(&mut self) {
        if self.http.take().is_some() {
            tracing::debug!(target: "kong_mcp::admin", "closed admin API client");
        }
    }

    fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Issues one request and returns the parsed JSON body.
    ///
    /// Non-2xx responses become [`AdminError::Status`]. An empty 2xx body
    /// decodes to `null`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: QueryParams<'_>,
        body: Option<&Value>,
    ) -> AdminResult<Value> {
        let http = self.acquire().await?;
        tracing::debug!(target: "kong_mcp::admin", %method, path, "admin request");

        let mut builder = http.request(method.clone(), self.endpoint(path));
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        if let AdminAuth::Basic { username, password } = self.config.auth() {
            builder = builder.basic_auth(username, Some(password));
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            tracing::debug!(
                target: "kong_mcp::admin",
                %method,
                path,
                status = status.as_u16(),
                "admin request rejected"
            );
            return Err(AdminError::from_response(status, &text));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(AdminError::Decode)
    }

    pub async fn get(&self, path: &str, query: QueryParams<'_>) -> AdminResult<Value> {
        self.request(Method::GET, path, query, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> AdminResult<Value> {
        self.request(Method::POST, path, NO_QUERY, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> AdminResult<Value> {
        self.request(Method::PUT, path, NO_QUERY, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> AdminResult<Value> {
        self.request(Method::PATCH, path, NO_QUERY, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> AdminResult<Value> {
        self.request(Method::DELETE, path, NO_QUERY, None).await
    }

    /// `GET /status`.
    pub async fn health_check(&self) -> AdminResult<Value> {
        self.get("/status", NO_QUERY).await
    }

    // Services

    pub async fn get_services(&self, query: QueryParams<'_>) -> AdminResult<Vec<Value>> {
        self.get("/services", query).await.map(unwrap_data)
    }

    pub async fn get_service(&self, service_id: &str) -> AdminResult<Value> {
        self.get(&format!("/services/{service_id}"), NO_QUERY).await
    }

    pub async fn create_service(&self, body: &Value) -> AdminResult<Value> {
        self.post("/services", body).await
    }

    pub async fn update_service(&self, service_id: &str, body: &Value) -> AdminResult<Value> {
        self.patch(&format!("/services/{service_id}"), body).await
    }

    pub async fn delete_service(&self, service_id: &str) -> AdminResult<()> {
        self.delete(&format!("/services/{service_id}")).await?;
        Ok(())
    }

    // Routes

    pub async fn get_routes(&self, query: QueryParams<'_>) -> AdminResult<Vec<Value>> {
        self.get("/routes", query).await.map(unwrap_data)
    }

    pub async fn get_route(&self, route_id: &str) -> AdminResult<Value> {
        self.get(&format!("/routes/{route_id}"), NO_QUERY).await
    }

    pub async fn create_route(&self, body: &Value) -> AdminResult<Value> {
        self.post("/routes", body).await
    }

    pub async fn update_route(&self, route_id: &str, body: &Value) -> AdminResult<Value> {
        self.patch(&format!("/routes/{route_id}"), body).await
    }

    pub async fn delete_route(&self, route_id: &str) -> AdminResult<()> {
        self.delete(&format!("/routes/{route_id}")).await?;
        Ok(())
    }

    // Plugins

    /// Global plugin collection, as the raw pagination envelope.
    pub async fn get_plugins(&self, query: QueryParams<'_>) -> AdminResult<Value> {
        self.get("/plugins", query).await
    }

    pub async fn get_plugins_as_list(&self, query: QueryParams<'_>) -> AdminResult<Vec<Value>> {
        self.get_plugins(query).await.map(unwrap_data)
    }

    pub async fn get_plugin(&self, plugin_id: &str) -> AdminResult<Value> {
        self.get(&format!("/plugins/{plugin_id}"), NO_QUERY).await
    }

    pub async fn create_plugin(&self, body: &Value) -> AdminResult<Value> {
        self.post("/plugins", body).await
    }

    pub async fn update_plugin(&self, plugin_id: &str, body: &Value) -> AdminResult<Value> {
        self.patch(&format!("/plugins/{plugin_id}"), body).await
    }

    pub async fn delete_plugin(&self, plugin_id: &str) -> AdminResult<()> {
        self.delete(&format!("/plugins/{plugin_id}")).await?;
        Ok(())
    }

    pub async fn get_plugins_by_service(
        &self,
        service_id: &str,
        query: QueryParams<'_>,
    ) -> AdminResult<Value> {
        self.get(&format!("/services/{service_id}/plugins"), query)
            .await
    }

    pub async fn get_plugins_by_route(
        &self,
        route_id: &str,
        query: QueryParams<'_>,
    ) -> AdminResult<Value> {
        self.get(&format!("/routes/{route_id}/plugins"), query).await
    }

    pub async fn get_plugins_by_consumer(
        &self,
        consumer_id: &str,
        query: QueryParams<'_>,
    ) -> AdminResult<Value> {
        self.get(&format!("/consumers/{consumer_id}/plugins"), query)
            .await
    }
}

fn default_headers(config: &AdminConfig) -> AdminResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if let AdminAuth::Bearer(token) = config.auth() {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| AdminError::InvalidApiToken)?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}
