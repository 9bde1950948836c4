//! GraphQL client implementation over [`HttpClient`].
//!
//! This module provides the [`GraphqlClient`] type, the crate's default
//! [`QueryClient`] implementation.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::clients::graphql::GraphqlError;
use crate::clients::{
    DataType, GraphqlResponse, HttpClient, HttpMethod, HttpRequest, HttpResponse, QueryClient,
};
use crate::config::CommerceConfig;

/// GraphQL client for a commerce backend.
///
/// Sends queries as `POST` JSON bodies (`{"query", "variables"}`) or, when the
/// configuration asks for `GET`, as `query`/`variables` URL parameters so that
/// caches in front of the backend can serve them.
///
/// # Thread Safety
///
/// `GraphqlClient` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use commerce_graphql::{
///     CommerceConfig, EndpointUrl, GraphqlClient, Identifier, ProductsRetriever, QueryClient,
/// };
///
/// let config = CommerceConfig::builder()
///     .endpoint(EndpointUrl::new("https://shop.example.com/graphql").unwrap())
///     .build()
///     .unwrap();
///
/// let client: Arc<dyn QueryClient> = Arc::new(GraphqlClient::new(&config));
/// let mut retriever = ProductsRetriever::new(Some(client))?;
/// retriever.set_identifiers([Identifier::sku("24-MG01")])?;
/// let products = retriever.fetch_products().await?;
/// ```
#[derive(Debug)]
pub struct GraphqlClient {
    http_client: HttpClient,
    http_method: HttpMethod,
    tries: u32,
}

// Verify GraphqlClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<GraphqlClient>();
};

impl GraphqlClient {
    /// Creates a new GraphQL client for the configured endpoint.
    #[must_use]
    pub fn new(config: &CommerceConfig) -> Self {
        Self {
            http_client: HttpClient::new(config),
            http_method: config.http_method(),
            tries: config.tries(),
        }
    }

    /// Returns the HTTP method queries are sent with.
    #[must_use]
    pub const fn http_method(&self) -> HttpMethod {
        self.http_method
    }

    /// Executes a GraphQL query and returns the raw HTTP response.
    ///
    /// # Errors
    ///
    /// Returns [`GraphqlError::Http`] for HTTP-level errors (network errors,
    /// non-2xx responses, retry exhaustion).
    ///
    /// GraphQL-level errors arrive with HTTP 200 and are contained in
    /// `response.body["errors"]`.
    pub async fn query(
        &self,
        query: &str,
        variables: Option<serde_json::Value>,
        headers: Option<HashMap<String, String>>,
    ) -> Result<HttpResponse, GraphqlError> {
        let mut builder = match self.http_method {
            HttpMethod::Post => HttpRequest::builder(HttpMethod::Post, "")
                .body(serde_json::json!({
                    "query": query,
                    "variables": variables
                }))
                .body_type(DataType::Json),
            HttpMethod::Get => {
                let builder =
                    HttpRequest::builder(HttpMethod::Get, "").query_param("query", query);
                match variables {
                    Some(variables) => builder.query_param("variables", variables.to_string()),
                    None => builder,
                }
            }
        }
        .tries(self.tries);

        if let Some(extra_headers) = headers {
            builder = builder.extra_headers(extra_headers);
        }

        let request = builder.build().map_err(|e| GraphqlError::Http(e.into()))?;
        self.http_client.request(request).await.map_err(Into::into)
    }
}

#[async_trait]
impl QueryClient for GraphqlClient {
    async fn execute(&self, query: &str) -> GraphqlResponse {
        match self.query(query, None, None).await {
            Ok(response) => {
                let result = GraphqlResponse::from_body(response.body);
                if !result.errors.is_empty() {
                    tracing::warn!(
                        "GraphQL backend reported {} error(s): {}",
                        result.errors.len(),
                        result.errors[0].message
                    );
                }
                result
            }
            Err(error) => {
                tracing::warn!("GraphQL request failed: {}", error);
                GraphqlResponse::from_error(error.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EndpointUrl;

    fn create_test_config(method: HttpMethod) -> CommerceConfig {
        CommerceConfig::builder()
            .endpoint(EndpointUrl::new("http://127.0.0.1:1/graphql").unwrap())
            .http_method(method)
            .build()
            .unwrap()
    }

    #[test]
    fn test_graphql_client_uses_configured_method() {
        let client = GraphqlClient::new(&create_test_config(HttpMethod::Get));
        assert_eq!(client.http_method(), HttpMethod::Get);

        let client = GraphqlClient::new(&create_test_config(HttpMethod::Post));
        assert_eq!(client.http_method(), HttpMethod::Post);
    }

    #[test]
    fn test_graphql_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GraphqlClient>();
    }

    #[tokio::test]
    async fn test_transport_failure_becomes_error_entry() {
        let client = GraphqlClient::new(&create_test_config(HttpMethod::Post));

        let response = client.execute("{storeConfig{store_code}}").await;

        assert!(response.data.is_none());
        assert_eq!(response.errors.len(), 1);
        assert!(response.errors[0].message.contains("Network error"));
    }
}
