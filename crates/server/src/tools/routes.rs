//! Route tools.

use kong_mcp_admin::AdminClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::query;
use crate::error::ToolResult;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListRoutesArgs {
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub offset: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
}

/// Reference to the owning service, sent as `{"id": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceRef {
    pub id: String,
}

/// Fields shared by route create and update bodies.
#[derive(Debug, Serialize)]
pub struct RouteFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocols: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosts: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strip_path: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateRouteArgs {
    pub service_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub protocols: Option<Vec<String>>,
    #[serde(default)]
    pub methods: Option<Vec<String>>,
    #[serde(default)]
    pub hosts: Option<Vec<String>>,
    #[serde(default)]
    pub paths: Option<Vec<String>>,
    #[serde(default)]
    pub strip_path: Option<bool>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateRouteArgs {
    pub route_id: String,
    #[serde(default)]
    pub service_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub protocols: Option<Vec<String>>,
    #[serde(default)]
    pub methods: Option<Vec<String>>,
    #[serde(default)]
    pub hosts: Option<Vec<String>>,
    #[serde(default)]
    pub paths: Option<Vec<String>>,
    #[serde(default)]
    pub strip_path: Option<bool>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteRouteArgs {
    pub route_id: String,
}

#[derive(Debug, Serialize)]
struct RouteBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    service: Option<ServiceRef>,
    #[serde(flatten)]
    fields: RouteFields,
}

impl CreateRouteArgs {
    /// Request body; always references the owning service.
    pub fn body(self) -> ToolResult<Value> {
        let body = RouteBody {
            service: Some(ServiceRef {
                id: self.service_id,
            }),
            fields: RouteFields {
                name: self.name,
                protocols: self.protocols,
                methods: self.methods,
                hosts: self.hosts,
                paths: self.paths,
                strip_path: self.strip_path,
                tags: self.tags,
            },
        };
        Ok(serde_json::to_value(body)?)
    }
}

impl UpdateRouteArgs {
    /// Patch body with only the supplied fields, and the route id it applies to.
    pub fn into_patch(self) -> ToolResult<(String, Value)> {
        let body = RouteBody {
            service: self.service_id.map(|id| ServiceRef { id }),
            fields: RouteFields {
                name: self.name,
                protocols: self.protocols,
                methods: self.methods,
                hosts: self.hosts,
                paths: self.paths,
                strip_path: self.strip_path,
                tags: self.tags,
            },
        };
        Ok((self.route_id, serde_json::to_value(body)?))
    }
}

pub async fn get_routes(client: &AdminClient, args: ListRoutesArgs) -> ToolResult<Value> {
    let params = query([
        ("size", args.size.map(|s| s.to_string())),
        ("offset", args.offset),
        ("tags", args.tags),
    ]);
    Ok(Value::Array(client.get_routes(&params).await?))
}

pub async fn create_route(client: &AdminClient, args: CreateRouteArgs) -> ToolResult<Value> {
    let body = args.body()?;
    Ok(client.create_route(&body).await?)
}

pub async fn update_route(client: &AdminClient, args: UpdateRouteArgs) -> ToolResult<Value> {
    let (route_id, body) = args.into_patch()?;
    Ok(client.update_route(&route_id, &body).await?)
}

pub async fn delete_route(client: &AdminClient, args: DeleteRouteArgs) -> ToolResult<Value> {
    client.delete_route(&args.route_id).await?;
    Ok(super::deleted(
        "Route deleted successfully",
        "route_id",
        &args.route_id,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::parse_args;
    use kong_mcp_admin::AdminConfig;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> AdminClient {
        AdminClient::new(AdminConfig {
            base_url: server.uri(),
            ..Default::default()
        })
        .unwrap()
    }

    fn args<T: serde::de::DeserializeOwned>(value: Value) -> T {
        parse_args(value.as_object().cloned().unwrap()).unwrap()
    }

    #[test]
    fn create_body_references_service_by_id() {
        let create: CreateRouteArgs = args(json!({
            "service_id": "s1",
            "paths": ["/healthz"],
            "methods": ["GET"]
        }));
        assert_eq!(
            create.body().unwrap(),
            json!({"service": {"id": "s1"}, "paths": ["/healthz"], "methods": ["GET"]})
        );
    }

    #[test]
    fn update_without_fields_is_empty_patch() {
        let update: UpdateRouteArgs = args(json!({"route_id": "r1"}));
        let (route_id, body) = update.into_patch().unwrap();
        assert_eq!(route_id, "r1");
        assert_eq!(body, json!({}));
    }

    #[test]
    fn update_can_move_route_to_another_service() {
        let update: UpdateRouteArgs = args(json!({
            "route_id": "r1",
            "service_id": "s2",
            "strip_path": false
        }));
        let (_, body) = update.into_patch().unwrap();
        assert_eq!(body, json!({"service": {"id": "s2"}, "strip_path": false}));
    }

    #[tokio::test]
    async fn create_route_posts_to_routes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/routes"))
            .and(body_json(json!({
                "service": {"id": "s1"},
                "name": "health",
                "paths": ["/healthz"]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "r1", "name": "health"})))
            .expect(1)
            .mount(&server)
            .await;

        let created = create_route(
            &client_for(&server),
            args(json!({"service_id": "s1", "name": "health", "paths": ["/healthz"]})),
        )
        .await
        .unwrap();
        assert_eq!(created["id"], "r1");
    }

    #[tokio::test]
    async fn get_routes_returns_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/routes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": "r1"}]})))
            .expect(1)
            .mount(&server)
            .await;

        let routes = get_routes(&client_for(&server), ListRoutesArgs::default())
            .await
            .unwrap();
        assert_eq!(routes, json!([{"id": "r1"}]));
    }

    #[tokio::test]
    async fn update_and_delete_route() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/routes/r1"))
            .and(body_json(json!({"hosts": ["api.example.com"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "r1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/routes/r1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        update_route(
            &client,
            args(json!({"route_id": "r1", "hosts": ["api.example.com"]})),
        )
        .await
        .unwrap();
        let confirmation = delete_route(
            &client,
            DeleteRouteArgs {
                route_id: "r1".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(
            confirmation,
            json!({"message": "Route deleted successfully", "route_id": "r1"})
        );
    }
}
