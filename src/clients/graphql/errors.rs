//! GraphQL-specific error types.
//!
//! Only HTTP-level failures are errors here. GraphQL-level errors (validation,
//! resolver failures) come back with HTTP 200 inside the response body and are
//! handled as data.

use crate::clients::HttpError;
use thiserror::Error;

/// Error type for [`GraphqlClient`](super::GraphqlClient) operations.
#[derive(Debug, Error)]
pub enum GraphqlError {
    /// An HTTP-level error occurred.
    ///
    /// Includes network errors, non-2xx responses, and retry exhaustion.
    #[error(transparent)]
    Http(#[from] HttpError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{HttpResponseError, MaxHttpRetriesExceededError};

    #[test]
    fn test_graphql_error_http_variant_wraps_http_error() {
        let http_error = HttpError::Response(HttpResponseError {
            code: 404,
            message: r#"{"errors":"Not Found"}"#.to_string(),
            error_reference: Some("abc-123".to_string()),
        });

        let graphql_error = GraphqlError::Http(http_error);

        assert!(graphql_error.to_string().contains("Not Found"));
    }

    #[test]
    fn test_http_error_wraps_max_retries_exceeded() {
        let graphql_error: GraphqlError = HttpError::MaxRetries(MaxHttpRetriesExceededError {
            code: 429,
            tries: 3,
            message: r#"{"errors":"Rate limited"}"#.to_string(),
            error_reference: None,
        })
        .into();

        let message = graphql_error.to_string();
        assert!(message.contains("Exceeded maximum retry count"));
        assert!(matches!(graphql_error, GraphqlError::Http(_)));
    }
}
