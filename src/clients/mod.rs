//! Query execution for the retrievers.
//!
//! # Overview
//!
//! - [`QueryClient`]: the contract retrievers execute queries through
//! - [`GraphqlResponse`] / [`GraphqlErrorEntry`]: what an execution yields
//! - [`graphql::GraphqlClient`]: HTTP implementation of [`QueryClient`]
//! - [`HttpClient`], [`HttpRequest`], [`HttpResponse`]: the HTTP layer beneath it
//!
//! # Retry Behavior
//!
//! The HTTP layer retries transient failures when configured with `tries > 1`:
//!
//! - **429 (Rate Limited)**: Retries using `Retry-After` header value, or 1 second if not present
//! - **500 (Server Error)**: Retries with fixed 1-second delay
//! - **Other errors (4xx)**: Returns immediately without retry
//!
//! Retrievers themselves never retry; one retriever issues one query.

mod errors;
pub mod graphql;
mod http_client;
mod http_request;
mod http_response;
mod query_client;

pub use errors::{
    HttpError, HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError,
};
pub use http_client::{HttpClient, CLIENT_VERSION};
pub use http_request::{DataType, HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::HttpResponse;
pub use query_client::{GraphqlErrorEntry, GraphqlResponse, QueryClient};

pub use graphql::{GraphqlClient, GraphqlError};
