//! # Commerce GraphQL Retrievers
//!
//! Lazily fetching, single-round-trip retrievers for products, categories,
//! product relations and search facets of a GraphQL commerce backend.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`CommerceConfig`] and [`CommerceConfigBuilder`]
//! - A [`QueryClient`] trait and a reqwest-based [`GraphqlClient`] implementing it
//! - Retrievers that build their query on first access, execute it exactly
//!   once, and memoize entities and errors
//! - Additive selection hooks and composable filter hooks, so independent
//!   call sites can extend one query without coordinating
//! - Aliased batching of several category lookups into one document
//! - Conversion of facet aggregations into display-ready filter options
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use commerce_graphql::{
//!     CommerceConfig, EndpointUrl, GraphqlClient, Identifier, ProductsRetriever, QueryClient,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CommerceConfig::builder()
//!     .endpoint(EndpointUrl::new("https://shop.example.com/graphql")?)
//!     .build()?;
//! let client: Arc<dyn QueryClient> = Arc::new(GraphqlClient::new(&config));
//!
//! let mut retriever = ProductsRetriever::new(Some(client))?;
//! retriever.set_identifiers([Identifier::sku("24-MG01")])?;
//! retriever.extend_query_with(|product| {
//!     product.add_field("meta_title");
//! });
//!
//! for product in retriever.fetch_products().await? {
//!     println!("{:?}", product.name);
//! }
//! if retriever.has_errors()? {
//!     eprintln!("{:?}", retriever.errors()?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! Misuse of a retriever (no client, reading errors before fetching,
//! identifiers that do not fit) is a [`RetrieverError`]. Anything the backend
//! or the transport reports is data: it is stored on the retriever and leaves
//! the entities empty.
//!
//! ## Design Principles
//!
//! - **No global state**: clients and configuration are passed explicitly
//! - **At most one round trip** per retriever instance
//! - **Thread-safe**: all retrievers are `Send + Sync`
//! - **Async-first**: designed for use with the Tokio runtime

pub mod aggregation;
pub mod clients;
pub mod config;
pub mod error;
pub mod model;
pub mod query;
pub mod retriever;

// Re-export public types at crate root for convenience
pub use config::{CommerceConfig, CommerceConfigBuilder, EndpointUrl, StoreCode};
pub use error::{ConfigError, RetrieverError};
pub use model::{Category, EntityType, Identifier, IdentifierType, Product, ProductKind};

// Re-export client types
pub use clients::{
    GraphqlClient, GraphqlError, GraphqlErrorEntry, GraphqlResponse, HttpClient, HttpError,
    HttpMethod, QueryClient,
};

// Re-export retrievers
pub use retriever::{
    CategoriesRetriever, CategoryRetriever, ProductRetriever, ProductsRetriever,
    RelatedProductsRetriever, RelationType, Retriever,
};
