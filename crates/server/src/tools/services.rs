//! Service tools.

use kong_mcp_admin::AdminClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::query;
use crate::error::ToolResult;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListServicesArgs {
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub offset: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
}

/// Body of `POST /services`. `name`, `url` and `protocol` are always sent.
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CreateServiceArgs {
    pub name: String,
    pub url: String,
    #[serde(default = "default_protocol", deserialize_with = "null_as_protocol")]
    pub protocol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

fn default_protocol() -> String {
    "http".to_string()
}

null_as!(null_as_protocol, String, default_protocol);

/// Partial update; only supplied fields are sent.
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateServiceArgs {
    #[serde(skip_serializing)]
    pub service_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteServiceArgs {
    pub service_id: String,
}

pub async fn get_services(client: &AdminClient, args: ListServicesArgs) -> ToolResult<Value> {
    let params = query([
        ("size", args.size.map(|s| s.to_string())),
        ("offset", args.offset),
        ("tags", args.tags),
    ]);
    Ok(Value::Array(client.get_services(&params).await?))
}

pub async fn create_service(client: &AdminClient, args: CreateServiceArgs) -> ToolResult<Value> {
    let body = serde_json::to_value(&args)?;
    Ok(client.create_service(&body).await?)
}

pub async fn update_service(client: &AdminClient, args: UpdateServiceArgs) -> ToolResult<Value> {
    let body = serde_json::to_value(&args)?;
    Ok(client.update_service(&args.service_id, &body).await?)
}

pub async fn delete_service(client: &AdminClient, args: DeleteServiceArgs) -> ToolResult<Value> {
    client.delete_service(&args.service_id).await?;
    Ok(super::deleted(
        "Service deleted successfully",
        "service_id",
        &args.service_id,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::parse_args;
    use kong_mcp_admin::AdminConfig;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
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
    fn create_body_always_carries_protocol() {
        let create: CreateServiceArgs = args(json!({"name": "svc", "url": "http://up:80"}));
        assert_eq!(
            serde_json::to_value(&create).unwrap(),
            json!({"name": "svc", "url": "http://up:80", "protocol": "http"})
        );
    }

    #[test]
    fn null_protocol_means_http() {
        let create: CreateServiceArgs =
            args(json!({"name": "svc", "url": "http://up:80", "protocol": null}));
        assert_eq!(create.protocol, "http");
    }

    #[test]
    fn update_body_contains_only_supplied_fields() {
        let update: UpdateServiceArgs = args(json!({"service_id": "s1"}));
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({}));

        let update: UpdateServiceArgs = args(json!({"service_id": "s1", "port": 8443}));
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"port": 8443}));
    }

    #[tokio::test]
    async fn get_services_unwraps_data_and_forwards_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/services"))
            .and(query_param("tags", "prod"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": "s1"}, {"id": "s2"}],
                "next": null
            })))
            .expect(1)
            .mount(&server)
            .await;

        let list = get_services(
            &client_for(&server),
            args(json!({"tags": "prod"})),
        )
        .await
        .unwrap();
        assert_eq!(list, json!([{"id": "s1"}, {"id": "s2"}]));
    }

    #[tokio::test]
    async fn create_service_posts_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services"))
            .and(body_json(json!({
                "name": "billing",
                "url": "https://billing.internal",
                "protocol": "https",
                "port": 443
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "s1", "name": "billing"})))
            .expect(1)
            .mount(&server)
            .await;

        let created = create_service(
            &client_for(&server),
            args(json!({
                "name": "billing",
                "url": "https://billing.internal",
                "protocol": "https",
                "port": 443
            })),
        )
        .await
        .unwrap();
        assert_eq!(created["id"], "s1");
    }

    #[tokio::test]
    async fn update_service_patches_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/services/s1"))
            .and(body_json(json!({"name": "renamed"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "s1", "name": "renamed"})))
            .expect(1)
            .mount(&server)
            .await;

        let updated = update_service(
            &client_for(&server),
            args(json!({"service_id": "s1", "name": "renamed"})),
        )
        .await
        .unwrap();
        assert_eq!(updated["name"], "renamed");
    }

    #[tokio::test]
    async fn delete_service_returns_confirmation() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/services/s1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let confirmation = delete_service(
            &client_for(&server),
            DeleteServiceArgs {
                service_id: "s1".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(
            confirmation,
            json!({"message": "Service deleted successfully", "service_id": "s1"})
        );
    }

    #[tokio::test]
    async fn delete_missing_service_propagates_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/services/ghost"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not found"})))
            .mount(&server)
            .await;

        let err = delete_service(
            &client_for(&server),
            DeleteServiceArgs {
                service_id: "ghost".into(),
            },
        )
        .await
        .unwrap_err();
        match err {
            crate::error::ToolError::Admin(admin) => assert!(admin.is_not_found()),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
