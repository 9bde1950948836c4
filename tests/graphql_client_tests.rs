//! Integration tests for the GraphQL client functionality.
//!
//! These tests verify the GraphQL client construction, both transports,
//! error handling, and the `QueryClient` implementation.

use std::collections::HashMap;
use std::sync::Arc;

use commerce_graphql::clients::graphql::{GraphqlClient, GraphqlError};
use commerce_graphql::{CommerceConfig, EndpointUrl, HttpMethod, QueryClient};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, http_method: HttpMethod) -> CommerceConfig {
    CommerceConfig::builder()
        .endpoint(EndpointUrl::new(format!("{}/graphql", server.uri())).unwrap())
        .http_method(http_method)
        .build()
        .unwrap()
}

// ============================================================================
// GraphqlClient Construction Tests
// ============================================================================

#[test]
fn test_graphql_client_uses_configured_method() {
    let config = CommerceConfig::builder()
        .endpoint(EndpointUrl::new("https://shop.example.com/graphql").unwrap())
        .http_method(HttpMethod::Get)
        .build()
        .unwrap();

    assert_eq!(GraphqlClient::new(&config).http_method(), HttpMethod::Get);
}

#[test]
fn test_graphql_client_is_thread_safe() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<GraphqlClient>();
}

// ============================================================================
// Transport Tests
// ============================================================================

#[tokio::test]
async fn test_post_sends_query_and_variables_as_json() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("X-Custom-Header", "custom-value"))
        .and(body_json(json!({
            "query": "query Product($sku: String){products(filter:{sku:{eq:$sku}}){items{sku}}}",
            "variables": {"sku": "MH01"}
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": {"products": {"items": [{"sku": "MH01"}]}}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = GraphqlClient::new(&config_for(&server, HttpMethod::Post));
    let mut headers = HashMap::new();
    headers.insert("X-Custom-Header".to_string(), "custom-value".to_string());

    let response = client
        .query(
            "query Product($sku: String){products(filter:{sku:{eq:$sku}}){items{sku}}}",
            Some(json!({"sku": "MH01"})),
            Some(headers),
        )
        .await
        .unwrap();

    assert_eq!(response.body["data"]["products"]["items"][0]["sku"], "MH01");
}

#[tokio::test]
async fn test_get_sends_query_as_url_parameter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/graphql"))
        .and(query_param("query", "{storeConfig{store_code}}"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": {"storeConfig": {"store_code": "default"}}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = GraphqlClient::new(&config_for(&server, HttpMethod::Get));
    let response = client.execute("{storeConfig{store_code}}").await;

    assert!(response.errors.is_empty());
    assert_eq!(
        response.data.unwrap()["storeConfig"]["store_code"],
        "default"
    );
}

#[tokio::test]
async fn test_execute_splits_data_and_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"products": null},
            "errors": [{"message": "Internal server error", "path": ["products"]}]
        })))
        .mount(&server)
        .await;

    let client: Arc<dyn QueryClient> =
        Arc::new(GraphqlClient::new(&config_for(&server, HttpMethod::Post)));
    let response = client.execute("{products{items{sku}}}").await;

    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].message, "Internal server error");
    assert_eq!(response.errors[0].path, vec![json!("products")]);
}

#[tokio::test]
async fn test_http_failure_surfaces_as_graphql_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .mount(&server)
        .await;

    let client = GraphqlClient::new(&config_for(&server, HttpMethod::Post));

    let result = client.query("{__typename}", None, None).await;
    assert!(matches!(result, Err(GraphqlError::Http(_))));

    let response = client.execute("{__typename}").await;
    assert!(response.data.is_none());
    assert!(response.errors[0].message.contains("Not Found"));
}

// ============================================================================
// Error Type Tests
// ============================================================================

#[test]
fn test_graphql_error_display_is_informative() {
    use commerce_graphql::clients::{HttpError, HttpResponseError};

    let graphql_error = GraphqlError::Http(HttpError::Response(HttpResponseError {
        code: 404,
        message: r#"{"message":"Not Found"}"#.to_string(),
        error_reference: Some("req-12345".to_string()),
    }));

    assert!(graphql_error.to_string().contains("Not Found"));
    let _: &dyn std::error::Error = &graphql_error;
}

#[test]
fn test_types_exported_at_crate_root() {
    let _: fn(commerce_graphql::GraphqlClient) = |_| {};
    let _: fn(commerce_graphql::GraphqlError) = |_| {};
    let _: fn(commerce_graphql::clients::graphql::GraphqlClient) = |_| {};
}

#[test]
fn test_unreachable_endpoint_reports_network_error() {
    let config = CommerceConfig::builder()
        .endpoint(EndpointUrl::new("http://127.0.0.1:1/graphql").unwrap())
        .build()
        .unwrap();
    let client = GraphqlClient::new(&config);

    let result = tokio_test::block_on(client.query("{__typename}", None, None));
    assert!(matches!(result, Err(GraphqlError::Http(_))));

    let response = tokio_test::block_on(client.execute("{__typename}"));
    assert!(response.data.is_none());
    assert!(response.errors[0].message.starts_with("Network error"));
}
