//! The query execution contract retrievers depend on.
//!
//! Retrievers never talk HTTP themselves. They hand a finished GraphQL document
//! to a [`QueryClient`] and get back a [`GraphqlResponse`]: the `data` member
//! plus whatever the backend reported in `errors`. Transport failures are folded
//! into the same error list, so a client call cannot fail from the retriever's
//! point of view.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry of a GraphQL response's `errors` array.
///
/// # Example
///
/// ```rust
/// use commerce_graphql::GraphqlErrorEntry;
/// use serde_json::json;
///
/// let entry: GraphqlErrorEntry = serde_json::from_value(json!({
///     "message": "Field \"foo\" is not defined",
///     "extensions": {"category": "graphql"}
/// })).unwrap();
///
/// assert_eq!(entry.category(), Some("graphql"));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphqlErrorEntry {
    /// Human readable description.
    pub message: String,
    /// Response path the error applies to (field names and list indices).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<Value>,
    /// Backend specific details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,
}

impl GraphqlErrorEntry {
    /// Creates an entry carrying only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Vec::new(),
            extensions: None,
        }
    }

    /// Returns `extensions.category`, if the backend set one.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.extensions
            .as_ref()
            .and_then(|ext| ext.get("category"))
            .and_then(Value::as_str)
    }
}

/// The `{data, errors}` pair a query execution produces.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphqlResponse {
    /// The `data` member; `None` when absent or `null`.
    pub data: Option<Value>,
    /// Every error the backend or transport reported.
    pub errors: Vec<GraphqlErrorEntry>,
}

impl GraphqlResponse {
    /// Creates a successful response.
    #[must_use]
    pub const fn with_data(data: Value) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    /// Creates a response carrying a single error and no data.
    #[must_use]
    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            data: None,
            errors: vec![GraphqlErrorEntry::new(message)],
        }
    }

    /// Splits a raw GraphQL response body into data and errors.
    ///
    /// Error entries that do not have the expected shape are kept, using their
    /// JSON text as the message.
    #[must_use]
    pub fn from_body(mut body: Value) -> Self {
        let data = body
            .get_mut("data")
            .map(Value::take)
            .filter(|data| !data.is_null());

        let errors = match body.get_mut("errors").map(Value::take) {
            Some(Value::Array(entries)) => entries
                .into_iter()
                .map(|entry| {
                    serde_json::from_value(entry.clone())
                        .unwrap_or_else(|_| GraphqlErrorEntry::new(entry.to_string()))
                })
                .collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(other) => vec![GraphqlErrorEntry::new(other.to_string())],
        };

        Self { data, errors }
    }
}

/// Executes GraphQL documents against a commerce backend.
///
/// Implementations must never panic on backend failure; anything that goes
/// wrong is reported through [`GraphqlResponse::errors`].
#[async_trait]
pub trait QueryClient: Send + Sync {
    /// Executes `query` and returns its data and errors.
    async fn execute(&self, query: &str) -> GraphqlResponse;
}
