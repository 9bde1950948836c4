//! Filter parameter maps as they appear in search page URLs.

use std::collections::BTreeMap;

use super::FilterAttributeMetadata;
use crate::query::{FilterCondition, FilterInput};

/// The request parameter holding the current page; never part of a filter.
pub const PAGE_PARAMETER: &str = "page";

/// Attribute code to filter value, e.g. `color=49` or `price=10_20`.
///
/// # Example
///
/// ```rust
/// use commerce_graphql::aggregation::FilterParameters;
///
/// let params = FilterParameters::new()
///     .with("color", "49")
///     .with("search_query", "bag & pack");
/// assert_eq!(params.to_query_string(), "color=49&search_query=bag%20%26%20pack");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterParameters {
    values: BTreeMap<String, String>,
}

impl FilterParameters {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Sets `key` to `value`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Sets `key` to `value`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(key.into(), value.into())
    }

    /// Removes `key`.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    /// Returns the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no parameter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Renders `k1=v1&k2=v2` with percent-encoded keys and values.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.values
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Translates the parameters into a product filter.
    ///
    /// Each parameter becomes a predicate of the kind its attribute metadata
    /// declares. Range values use `from_to` with either side optional. The
    /// page parameter and parameters without metadata are skipped.
    #[must_use]
    pub fn to_filter_input(&self, metadata: &[FilterAttributeMetadata]) -> FilterInput {
        let mut filter = FilterInput::new();
        for (key, value) in self.iter() {
            if key == PAGE_PARAMETER {
                continue;
            }
            let Some(attribute) = metadata.iter().find(|m| m.attribute_code == key) else {
                tracing::debug!("Skipping filter parameter '{}' without attribute metadata", key);
                continue;
            };
            let condition = match attribute.filter_input_type.as_deref() {
                Some("FilterMatchTypeInput") => FilterCondition::Match(value.to_string()),
                Some("FilterRangeTypeInput") => parse_range(value),
                _ => FilterCondition::Eq(value.to_string()),
            };
            filter.insert(key, condition);
        }
        filter
    }
}

fn parse_range(value: &str) -> FilterCondition {
    let bound = |s: &str| (!s.is_empty()).then(|| s.to_string());
    match value.split_once('_') {
        Some((from, to)) => FilterCondition::Range {
            from: bound(from),
            to: bound(to),
        },
        None => FilterCondition::Range {
            from: bound(value),
            to: None,
        },
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FilterParameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
