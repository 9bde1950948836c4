//! HTTP client for the commerce GraphQL endpoint.
//!
//! This module provides the [`HttpClient`] type for sending requests to the
//! configured endpoint with automatic retry handling.

use std::collections::HashMap;

use crate::clients::errors::{HttpError, HttpResponseError, MaxHttpRetriesExceededError};
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::CommerceConfig;

/// Fixed retry wait time in seconds.
pub const RETRY_WAIT_TIME: u64 = 1;

/// Crate version from Cargo.toml.
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP client for the commerce GraphQL endpoint.
///
/// The client handles:
/// - URL construction from the configured endpoint
/// - Default headers (User-Agent, Accept, `Store`, configured custom headers)
/// - Automatic retry logic for 429 and 500 responses
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`, making it safe to share across async tasks.
#[derive(Debug)]
pub struct HttpClient {
    /// The internal reqwest HTTP client.
    client: reqwest::Client,
    /// Endpoint URL (e.g., `https://shop.example.com/graphql`).
    base_uri: String,
    /// Default headers to include in all requests.
    default_headers: HashMap<String, String>,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new HTTP client for the configured endpoint.
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created. This should
    /// only happen in extremely unusual circumstances (e.g., TLS initialization failure).
    #[must_use]
    pub fn new(config: &CommerceConfig) -> Self {
        let base_uri = config.endpoint().as_ref().to_string();

        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent = format!(
            "{user_agent_prefix}Commerce GraphQL Client v{CLIENT_VERSION} | Rust {rust_version}"
        );

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());

        if let Some(store_code) = config.store_code() {
            default_headers.insert("Store".to_string(), store_code.as_ref().to_string());
        }

        for (key, value) in config.custom_headers() {
            default_headers.insert(key.clone(), value.clone());
        }

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_uri,
            default_headers,
        }
    }

    /// Returns the endpoint URI for this client.
    #[must_use]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Sends an HTTP request to the endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if:
    /// - Request validation fails (`InvalidRequest`)
    /// - Network error occurs (`Network`)
    /// - Non-2xx response received (`Response`)
    /// - Max retries exceeded (`MaxRetries`)
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let url = if request.path.is_empty() {
            self.base_uri.clone()
        } else {
            format!("{}/{}", self.base_uri.trim_end_matches('/'), request.path)
        };

        let mut headers = self.default_headers.clone();
        if let Some(body_type) = &request.body_type {
            headers.insert(
                "Content-Type".to_string(),
                body_type.as_content_type().to_string(),
            );
        }
        if let Some(extra) = &request.extra_headers {
            for (key, value) in extra {
                headers.insert(key.clone(), value.clone());
            }
        }

        let mut tries: u32 = 0;
        loop {
            tries += 1;

            let mut req_builder = match request.http_method {
                HttpMethod::Get => self.client.get(&url),
                HttpMethod::Post => self.client.post(&url),
            };

            for (key, value) in &headers {
                req_builder = req_builder.header(key, value);
            }

            if let Some(query) = &request.query {
                req_builder = req_builder.query(query);
            }

            if let Some(body) = &request.body {
                req_builder = req_builder.body(body.to_string());
            }

            let res = req_builder.send().await?;

            let code = res.status().as_u16();
            let res_headers = Self::parse_response_headers(res.headers());
            let body_text = res.text().await.unwrap_or_default();

            let body = if body_text.is_empty() {
                serde_json::json!({})
            } else {
                serde_json::from_str(&body_text).unwrap_or_else(|_| {
                    if code >= 500 {
                        serde_json::json!({ "raw_body": body_text })
                    } else {
                        serde_json::json!({})
                    }
                })
            };

            let response = HttpResponse::new(code, res_headers, body);

            if response.is_ok() {
                return Ok(response);
            }

            let error_message = Self::serialize_error(&response);

            let should_retry = code == 429 || code == 500;
            if !should_retry {
                return Err(HttpError::Response(HttpResponseError {
                    code,
                    message: error_message,
                    error_reference: response.request_id().map(String::from),
                }));
            }

            if tries >= request.tries {
                if request.tries == 1 {
                    return Err(HttpError::Response(HttpResponseError {
                        code,
                        message: error_message,
                        error_reference: response.request_id().map(String::from),
                    }));
                }
                return Err(HttpError::MaxRetries(MaxHttpRetriesExceededError {
                    code,
                    tries: request.tries,
                    message: error_message,
                    error_reference: response.request_id().map(String::from),
                }));
            }

            let delay = Self::calculate_retry_delay(&response, code);
            tracing::debug!(
                "Retrying GraphQL request after status {} (attempt {} of {}), waiting {:?}",
                code,
                tries,
                request.tries,
                delay
            );
            tokio::time::sleep(delay).await;
        }
    }

    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }

    fn calculate_retry_delay(response: &HttpResponse, status: u16) -> std::time::Duration {
        // For 429: use Retry-After if present, otherwise fixed delay
        // For 500: always use fixed delay (ignore Retry-After)
        if status == 429 {
            if let Some(retry_after) = response.retry_request_after {
                return std::time::Duration::from_secs_f64(retry_after);
            }
        }
        std::time::Duration::from_secs(RETRY_WAIT_TIME)
    }

    fn serialize_error(response: &HttpResponse) -> String {
        let mut error_body = serde_json::Map::new();

        if let Some(errors) = response.body.get("errors") {
            error_body.insert("errors".to_string(), errors.clone());
        }
        if let Some(message) = response.body.get("message") {
            error_body.insert("message".to_string(), message.clone());
        }
        if error_body.is_empty() {
            if let Some(raw) = response.body.get("raw_body") {
                error_body.insert("raw_body".to_string(), raw.clone());
            }
        }

        if let Some(request_id) = response.request_id() {
            error_body.insert(
                "error_reference".to_string(),
                serde_json::json!(format!(
                    "If you report this error, please include this id: {request_id}."
                )),
            );
        }

        serde_json::to_string(&error_body).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EndpointUrl, StoreCode};

    fn create_test_config() -> CommerceConfig {
        CommerceConfig::builder()
            .endpoint(EndpointUrl::new("https://shop.example.com/graphql").unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_client_construction_uses_endpoint() {
        let client = HttpClient::new(&create_test_config());
        assert_eq!(client.base_uri(), "https://shop.example.com/graphql");
    }

    #[test]
    fn test_user_agent_header_format() {
        let client = HttpClient::new(&create_test_config());

        let user_agent = client.default_headers().get("User-Agent").unwrap();
        assert!(user_agent.contains("Commerce GraphQL Client v"));
        assert!(user_agent.contains("Rust"));
    }

    #[test]
    fn test_user_agent_with_prefix() {
        let config = CommerceConfig::builder()
            .endpoint(EndpointUrl::new("https://shop.example.com/graphql").unwrap())
            .user_agent_prefix("Storefront/2.1")
            .build()
            .unwrap();
        let client = HttpClient::new(&config);

        let user_agent = client.default_headers().get("User-Agent").unwrap();
        assert!(user_agent.starts_with("Storefront/2.1 | "));
    }

    #[test]
    fn test_store_header_injection() {
        let config = CommerceConfig::builder()
            .endpoint(EndpointUrl::new("https://shop.example.com/graphql").unwrap())
            .store_code(StoreCode::new("fr_store").unwrap())
            .header("Preview-Version", "1700000000")
            .build()
            .unwrap();
        let client = HttpClient::new(&config);

        assert_eq!(
            client.default_headers().get("Store"),
            Some(&"fr_store".to_string())
        );
        assert_eq!(
            client.default_headers().get("Preview-Version"),
            Some(&"1700000000".to_string())
        );
    }

    #[test]
    fn test_no_store_header_without_store_code() {
        let client = HttpClient::new(&create_test_config());
        assert!(client.default_headers().get("Store").is_none());
    }

    #[test]
    fn test_serialize_error_keeps_errors_and_request_id() {
        let mut headers = HashMap::new();
        headers.insert("x-request-id".to_string(), vec!["req-1".to_string()]);
        let response = HttpResponse::new(
            400,
            headers,
            serde_json::json!({"errors": [{"message": "Syntax Error"}]}),
        );

        let message = HttpClient::serialize_error(&response);
        assert!(message.contains("Syntax Error"));
        assert!(message.contains("req-1"));
    }
}
