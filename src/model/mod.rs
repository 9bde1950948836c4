//! Entities the retrievers map responses into.

mod category;
mod identifier;
mod product;

pub use category::{Category, CategoryProducts};
pub use identifier::{EntityType, Identifier, IdentifierType};
pub use product::{
    ConfigurableOption, ConfigurableOptionValue, Money, PriceRange, Product, ProductDiscount,
    ProductImage, ProductKind, ProductPrice, Variant, VariantAttribute,
};

use serde::{Deserialize, Deserializer};

/// Deserializes a list that the backend may return as `null`.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}
