//! Configuration types for the commerce GraphQL client.
//!
//! # Overview
//!
//! - [`CommerceConfig`]: settings shared by the transport and the retrievers
//! - [`CommerceConfigBuilder`]: a builder for constructing [`CommerceConfig`] instances
//! - [`EndpointUrl`]: a validated GraphQL endpoint URL
//! - [`StoreCode`]: a validated store view code
//!
//! # Example
//!
//! ```rust
//! use commerce_graphql::{CommerceConfig, EndpointUrl, StoreCode};
//!
//! let config = CommerceConfig::builder()
//!     .endpoint(EndpointUrl::new("https://shop.example.com/graphql").unwrap())
//!     .store_code(StoreCode::new("default").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert!(config.category_uid_enabled());
//! ```

mod newtypes;

use std::collections::HashMap;

pub use newtypes::{EndpointUrl, StoreCode};

use crate::clients::HttpMethod;
use crate::error::ConfigError;

/// Configuration for talking to a commerce GraphQL backend.
///
/// # Thread Safety
///
/// `CommerceConfig` is `Clone`, `Send`, and `Sync`.
///
/// # Category uid support
///
/// `category_uid_enabled` tells the category retrievers whether the backend
/// understands `category_uid` filters. Older deployments only know integer
/// category ids; with the flag off, lookups go through the legacy
/// `category(id:)` field instead.
///
/// # Example
///
/// ```rust
/// use commerce_graphql::{CommerceConfig, EndpointUrl, HttpMethod};
///
/// let config = CommerceConfig::builder()
///     .endpoint(EndpointUrl::new("https://shop.example.com/graphql").unwrap())
///     .http_method(HttpMethod::Get)
///     .category_uid_enabled(false)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.http_method(), HttpMethod::Get);
/// assert!(!config.category_uid_enabled());
/// ```
#[derive(Clone, Debug)]
pub struct CommerceConfig {
    endpoint: EndpointUrl,
    store_code: Option<StoreCode>,
    http_method: HttpMethod,
    category_uid_enabled: bool,
    user_agent_prefix: Option<String>,
    tries: u32,
    custom_headers: HashMap<String, String>,
}

impl CommerceConfig {
    /// Creates a new builder for constructing a `CommerceConfig`.
    #[must_use]
    pub fn builder() -> CommerceConfigBuilder {
        CommerceConfigBuilder::new()
    }

    /// Returns the GraphQL endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &EndpointUrl {
        &self.endpoint
    }

    /// Returns the store view code, if configured.
    #[must_use]
    pub const fn store_code(&self) -> Option<&StoreCode> {
        self.store_code.as_ref()
    }

    /// Returns the HTTP method used for queries.
    #[must_use]
    pub const fn http_method(&self) -> HttpMethod {
        self.http_method
    }

    /// Returns whether the backend supports `category_uid` filters.
    #[must_use]
    pub const fn category_uid_enabled(&self) -> bool {
        self.category_uid_enabled
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns how many times the transport attempts a request.
    #[must_use]
    pub const fn tries(&self) -> u32 {
        self.tries
    }

    /// Returns the extra headers sent with every request.
    #[must_use]
    pub const fn custom_headers(&self) -> &HashMap<String, String> {
        &self.custom_headers
    }
}

// Verify CommerceConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CommerceConfig>();
};

/// Builder for constructing [`CommerceConfig`] instances.
///
/// `endpoint` is required. All other fields have defaults.
///
/// # Defaults
///
/// - `store_code`: `None` (backend default store view)
/// - `http_method`: `POST`
/// - `category_uid_enabled`: `true`
/// - `user_agent_prefix`: `None`
/// - `tries`: `1` (no retries)
/// - `custom_headers`: empty
#[derive(Debug, Default)]
pub struct CommerceConfigBuilder {
    endpoint: Option<EndpointUrl>,
    store_code: Option<StoreCode>,
    http_method: Option<HttpMethod>,
    category_uid_enabled: Option<bool>,
    user_agent_prefix: Option<String>,
    tries: Option<u32>,
    custom_headers: HashMap<String, String>,
}

impl CommerceConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the GraphQL endpoint (required).
    #[must_use]
    pub fn endpoint(mut self, endpoint: EndpointUrl) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Sets the store view code.
    #[must_use]
    pub fn store_code(mut self, code: StoreCode) -> Self {
        self.store_code = Some(code);
        self
    }

    /// Sets the HTTP method used for queries.
    ///
    /// `GET` lets intermediate caches store responses; `POST` is needed for
    /// queries too long for a URL.
    #[must_use]
    pub const fn http_method(mut self, method: HttpMethod) -> Self {
        self.http_method = Some(method);
        self
    }

    /// Sets whether the backend supports `category_uid` filters.
    #[must_use]
    pub const fn category_uid_enabled(mut self, enabled: bool) -> Self {
        self.category_uid_enabled = Some(enabled);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Sets how many times the transport attempts a request on 429/500.
    #[must_use]
    pub const fn tries(mut self, tries: u32) -> Self {
        self.tries = Some(tries);
        self
    }

    /// Adds a header sent with every request.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.insert(key.into(), value.into());
        self
    }

    /// Builds the [`CommerceConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `endpoint` is not set.
    pub fn build(self) -> Result<CommerceConfig, ConfigError> {
        let endpoint = self
            .endpoint
            .ok_or(ConfigError::MissingRequiredField { field: "endpoint" })?;

        Ok(CommerceConfig {
            endpoint,
            store_code: self.store_code,
            http_method: self.http_method.unwrap_or(HttpMethod::Post),
            category_uid_enabled: self.category_uid_enabled.unwrap_or(true),
            user_agent_prefix: self.user_agent_prefix,
            tries: self.tries.unwrap_or(1).max(1),
            custom_headers: self.custom_headers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> EndpointUrl {
        EndpointUrl::new("https://shop.example.com/graphql").unwrap()
    }

    #[test]
    fn test_builder_requires_endpoint() {
        let result = CommerceConfigBuilder::new().build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "endpoint" })
        ));
    }

    #[test]
    fn test_builder_provides_sensible_defaults() {
        let config = CommerceConfig::builder().endpoint(endpoint()).build().unwrap();

        assert_eq!(config.endpoint().as_ref(), "https://shop.example.com/graphql");
        assert!(config.store_code().is_none());
        assert_eq!(config.http_method(), HttpMethod::Post);
        assert!(config.category_uid_enabled());
        assert!(config.user_agent_prefix().is_none());
        assert_eq!(config.tries(), 1);
        assert!(config.custom_headers().is_empty());
    }

    #[test]
    fn test_builder_with_all_optional_fields() {
        let config = CommerceConfig::builder()
            .endpoint(endpoint())
            .store_code(StoreCode::new("fr_store").unwrap())
            .http_method(HttpMethod::Get)
            .category_uid_enabled(false)
            .user_agent_prefix("Storefront/2.1")
            .tries(3)
            .header("Preview-Version", "1700000000")
            .build()
            .unwrap();

        assert_eq!(config.store_code().map(AsRef::as_ref), Some("fr_store"));
        assert_eq!(config.http_method(), HttpMethod::Get);
        assert!(!config.category_uid_enabled());
        assert_eq!(config.user_agent_prefix(), Some("Storefront/2.1"));
        assert_eq!(config.tries(), 3);
        assert_eq!(
            config.custom_headers().get("Preview-Version"),
            Some(&"1700000000".to_string())
        );
    }

    #[test]
    fn test_zero_tries_is_clamped_to_one() {
        let config = CommerceConfig::builder()
            .endpoint(endpoint())
            .tries(0)
            .build()
            .unwrap();

        assert_eq!(config.tries(), 1);
    }

    #[test]
    fn test_config_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CommerceConfig>();
    }
}
