//! Typed lookup keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The entity an identifier refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// A catalog product.
    Product,
    /// A catalog category.
    Category,
}

impl EntityType {
    /// Returns the lowercase name used in aliases and messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Category => "category",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which attribute an identifier value is matched against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierType {
    /// Product SKU.
    Sku,
    /// URL key (last URL segment).
    UrlKey,
    /// Opaque backend uid.
    Uid,
    /// Full category URL path (e.g. `men/tops`).
    UrlPath,
    /// Legacy integer id.
    Id,
}

impl IdentifierType {
    /// Returns the snake case name (`sku`, `url_key`, ...).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sku => "sku",
            Self::UrlKey => "url_key",
            Self::Uid => "uid",
            Self::UrlPath => "url_path",
            Self::Id => "id",
        }
    }
}

impl fmt::Display for IdentifierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdentifierType {
    type Err = ConfigError;

    /// Parses the names component configurations use, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sku" => Ok(Self::Sku),
            "url_key" | "urlkey" => Ok(Self::UrlKey),
            "uid" => Ok(Self::Uid),
            "url_path" | "urlpath" => Ok(Self::UrlPath),
            "id" => Ok(Self::Id),
            _ => Err(ConfigError::InvalidIdentifierType {
                value: s.to_string(),
            }),
        }
    }
}

/// A typed key used to look up a product or category.
///
/// # Example
///
/// ```rust
/// use commerce_graphql::{EntityType, Identifier, IdentifierType};
///
/// let id = Identifier::category(IdentifierType::UrlPath, "men/tops");
/// assert_eq!(id.entity(), EntityType::Category);
/// assert_eq!(id.value(), "men/tops");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    entity: EntityType,
    #[serde(rename = "type")]
    id_type: IdentifierType,
    value: String,
}

impl Identifier {
    /// Creates an identifier.
    #[must_use]
    pub fn new(entity: EntityType, id_type: IdentifierType, value: impl Into<String>) -> Self {
        Self {
            entity,
            id_type,
            value: value.into(),
        }
    }

    /// Creates a product identifier.
    #[must_use]
    pub fn product(id_type: IdentifierType, value: impl Into<String>) -> Self {
        Self::new(EntityType::Product, id_type, value)
    }

    /// Creates a category identifier.
    #[must_use]
    pub fn category(id_type: IdentifierType, value: impl Into<String>) -> Self {
        Self::new(EntityType::Category, id_type, value)
    }

    /// Shorthand for a product SKU.
    #[must_use]
    pub fn sku(value: impl Into<String>) -> Self {
        Self::product(IdentifierType::Sku, value)
    }

    /// Returns the entity this identifier refers to.
    #[must_use]
    pub const fn entity(&self) -> EntityType {
        self.entity
    }

    /// Returns the identifier type.
    #[must_use]
    pub const fn id_type(&self) -> IdentifierType {
        self.id_type
    }

    /// Returns the raw value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}
