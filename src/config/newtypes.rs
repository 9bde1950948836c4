//! Validated newtype wrappers for configuration values.
//!
//! These wrappers validate their contents on construction. Invalid values are
//! rejected with clear error messages.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// A validated GraphQL endpoint URL.
///
/// The URL must be absolute with an `http` or `https` scheme and a non-empty
/// host. Anything after the host (port, path, query) is kept verbatim.
///
/// # Example
///
/// ```rust
/// use commerce_graphql::EndpointUrl;
///
/// let url = EndpointUrl::new("https://shop.example.com/graphql").unwrap();
/// assert_eq!(url.scheme(), "https");
/// assert_eq!(url.host_name(), "shop.example.com");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointUrl {
    url: String,
    scheme_end: usize,
    host_start: usize,
    host_end: usize,
}

impl EndpointUrl {
    /// Creates a new validated endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEndpointUrl`] if the URL has no `http`/`https`
    /// scheme or no host.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into().trim().to_string();
        let invalid = || ConfigError::InvalidEndpointUrl { url: url.clone() };

        let scheme_end = url.find("://").ok_or_else(invalid)?;
        let scheme = &url[..scheme_end];
        if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
            return Err(invalid());
        }

        let host_start = scheme_end + 3;
        if host_start >= url.len() {
            return Err(invalid());
        }

        // Host ends at port, path, query, or end of string
        let remainder = &url[host_start..];
        let host_end = remainder
            .find([':', '/', '?', '#'])
            .map_or(url.len(), |i| host_start + i);
        if host_end == host_start {
            return Err(invalid());
        }

        Ok(Self {
            url,
            scheme_end,
            host_start,
            host_end,
        })
    }

    /// Returns the URL scheme (e.g., "https").
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.url[..self.scheme_end]
    }

    /// Returns the host name portion of the URL.
    #[must_use]
    pub fn host_name(&self) -> &str {
        &self.url[self.host_start..self.host_end]
    }
}

impl AsRef<str> for EndpointUrl {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

/// A validated store view code, sent to the backend in the `Store` header.
///
/// # Example
///
/// ```rust
/// use commerce_graphql::StoreCode;
///
/// let store = StoreCode::new("default").unwrap();
/// assert_eq!(store.as_ref(), "default");
/// assert!(StoreCode::new("en-us").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StoreCode(String);

impl StoreCode {
    /// Creates a new validated store code.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidStoreCode`] if the code is empty or contains
    /// characters other than ASCII letters, digits and underscores.
    pub fn new(code: impl Into<String>) -> Result<Self, ConfigError> {
        let code = code.into();
        let valid = !code.is_empty()
            && code
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(ConfigError::InvalidStoreCode { code });
        }
        Ok(Self(code))
    }
}

impl AsRef<str> for StoreCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for StoreCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for StoreCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_validates_format() {
        let url = EndpointUrl::new("https://shop.example.com/graphql").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_name(), "shop.example.com");
        assert_eq!(url.as_ref(), "https://shop.example.com/graphql");

        // With port
        let url = EndpointUrl::new("http://127.0.0.1:8080/graphql").unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.host_name(), "127.0.0.1");
    }

    #[test]
    fn test_endpoint_url_trims_whitespace() {
        let url = EndpointUrl::new("  https://shop.example.com/graphql ").unwrap();
        assert_eq!(url.as_ref(), "https://shop.example.com/graphql");
    }

    #[test]
    fn test_endpoint_url_rejects_invalid() {
        assert!(EndpointUrl::new("").is_err());
        assert!(EndpointUrl::new("shop.example.com/graphql").is_err());
        assert!(EndpointUrl::new("https://").is_err());
        assert!(EndpointUrl::new("https:///graphql").is_err());
        assert!(EndpointUrl::new("ftp://shop.example.com").is_err());
    }

    #[test]
    fn test_store_code_rejects_invalid() {
        assert!(StoreCode::new("").is_err());
        assert!(StoreCode::new("en-us").is_err());
        assert!(StoreCode::new("en us").is_err());
        assert!(StoreCode::new("en_us").is_ok());
    }

    #[test]
    fn test_store_code_serde() {
        let code = StoreCode::new("default").unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, r#""default""#);

        let parsed: StoreCode = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, code);

        let invalid: Result<StoreCode, _> = serde_json::from_str(r#""en-us""#);
        assert!(invalid.is_err());
    }
}
