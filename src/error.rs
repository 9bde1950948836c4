//! Error types for the commerce GraphQL retrievers.
//!
//! Two families live here:
//!
//! - [`ConfigError`]: raised while building a [`CommerceConfig`](crate::CommerceConfig)
//!   or one of its validated newtypes.
//! - [`RetrieverError`]: raised when a retriever is misused (no client, errors
//!   read before fetching, identifiers that do not fit the retriever).
//!
//! # Error Handling
//!
//! Errors reported by the commerce backend are *not* represented here. They are
//! data: every retriever stores them as a list of
//! [`GraphqlErrorEntry`](crate::GraphqlErrorEntry) values and exposes them via
//! `errors()` and `has_errors()`.
//!
//! # Example
//!
//! ```rust
//! use commerce_graphql::{EndpointUrl, ConfigError};
//!
//! let result = EndpointUrl::new("");
//! assert!(matches!(result, Err(ConfigError::InvalidEndpointUrl { .. })));
//! ```

use thiserror::Error;

use crate::model::{EntityType, IdentifierType};

/// Errors that can occur during configuration.
///
/// Each variant provides a clear, actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The GraphQL endpoint URL is invalid.
    #[error("Invalid GraphQL endpoint '{url}'. Please provide an absolute URL with scheme (e.g., 'https://shop.example.com/graphql').")]
    InvalidEndpointUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// The store code is invalid.
    #[error("Invalid store code '{code}'. Store codes contain only letters, digits and underscores.")]
    InvalidStoreCode {
        /// The invalid store code that was provided.
        code: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// An identifier type name could not be parsed.
    #[error("Unknown identifier type '{value}'. Expected one of: sku, url_key, uid, url_path, id.")]
    InvalidIdentifierType {
        /// The unrecognized value.
        value: String,
    },
}

/// Errors caused by using a retriever outside of its contract.
///
/// Backend failures never show up here; see the module documentation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RetrieverError {
    /// The retriever was constructed without a query client.
    #[error("No client provided. A retriever cannot be created without a GraphQL query client.")]
    MissingClient,

    /// Errors were requested before any fetch accessor was called.
    #[error("No query has been executed yet. Call a fetch accessor before reading errors.")]
    NotFetched,

    /// A single-entity lookup was fetched without an identifier or query override.
    #[error("No {entity} identifier set. Set an identifier or a query before fetching.")]
    MissingIdentifier {
        /// The entity the retriever looks up.
        entity: EntityType,
    },

    /// The identifier does not fit the retriever it was given to.
    #[error("Identifier of type {id_type} for entity {entity} is not supported here.")]
    UnsupportedIdentifier {
        /// The entity of the rejected identifier.
        entity: EntityType,
        /// The type of the rejected identifier.
        id_type: IdentifierType,
    },

    /// A generated document would contain an invalid GraphQL name.
    #[error("'{name}' is not a valid GraphQL name.")]
    InvalidName {
        /// The rejected name.
        name: String,
    },
}
