//! GraphQL transport over HTTP.
//!
//! - [`GraphqlClient`]: sends GraphQL documents to the configured endpoint and
//!   implements [`QueryClient`](crate::QueryClient)
//! - [`GraphqlError`]: HTTP-level failures of [`GraphqlClient::query`]
//!
//! # Response Structure
//!
//! GraphQL responses contain these fields in the body:
//!
//! - `data`: The query result data
//! - `errors`: Any GraphQL errors (still HTTP 200)
//!
//! When used through [`QueryClient::execute`](crate::QueryClient::execute), HTTP
//! failures are converted into a single error entry instead of an `Err`.

mod client;
mod errors;

pub use client::GraphqlClient;
pub use errors::GraphqlError;
