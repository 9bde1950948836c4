//! Product entities as returned by `products { items { ... } }`.
//!
//! Every scalar field is optional: the selection a retriever sends depends on
//! the hooks registered on it, and fields that were not selected are simply
//! absent. Fields selected by hooks that this model does not know about are
//! kept verbatim in [`Product::extra`].

use serde::Deserialize;
use serde_json::{Map, Value};

use super::null_as_empty;

/// A monetary amount.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Money {
    /// The amount.
    pub value: Option<f64>,
    /// ISO currency code.
    pub currency: Option<String>,
}

/// Discount applied to a price.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ProductDiscount {
    /// Absolute discount.
    pub amount_off: Option<f64>,
    /// Relative discount in percent.
    pub percent_off: Option<f64>,
}

/// Regular and final price of a product.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ProductPrice {
    /// Price before discounts.
    pub regular_price: Option<Money>,
    /// Price after discounts.
    pub final_price: Option<Money>,
    /// The applied discount.
    pub discount: Option<ProductDiscount>,
}

/// Lowest and highest price of a product.
///
/// The two only differ for configurable and bundle products.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PriceRange {
    /// Lowest price.
    pub minimum_price: Option<ProductPrice>,
    /// Highest price.
    pub maximum_price: Option<ProductPrice>,
}

impl PriceRange {
    /// Returns `true` if minimum and maximum final prices differ.
    #[must_use]
    pub fn is_range(&self) -> bool {
        let final_value = |price: &Option<ProductPrice>| {
            price
                .as_ref()
                .and_then(|p| p.final_price.as_ref())
                .and_then(|m| m.value)
        };
        match (final_value(&self.minimum_price), final_value(&self.maximum_price)) {
            (Some(min), Some(max)) => (max - min).abs() > f64::EPSILON,
            _ => false,
        }
    }
}

/// A product image.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ProductImage {
    /// Image URL.
    pub url: Option<String>,
    /// Alt label.
    pub label: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
struct ComplexText {
    html: Option<String>,
}

/// One selectable value of a configurable option.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ConfigurableOptionValue {
    /// Index referenced by [`VariantAttribute::value_index`].
    pub value_index: Option<i64>,
    /// Display label.
    pub label: Option<String>,
}

/// An attribute a configurable product varies on (e.g. color).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ConfigurableOption {
    /// Attribute code, e.g. `color`.
    pub attribute_code: Option<String>,
    /// Display label.
    pub label: Option<String>,
    /// The selectable values.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub values: Vec<ConfigurableOptionValue>,
}

/// An attribute value that identifies a variant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct VariantAttribute {
    /// Attribute code.
    pub code: Option<String>,
    /// Index into the matching [`ConfigurableOption::values`].
    pub value_index: Option<i64>,
    /// Display label.
    pub label: Option<String>,
}

/// A concrete variant of a configurable product.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Variant {
    /// The attribute values selecting this variant.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub attributes: Vec<VariantAttribute>,
    /// The simple product behind the variant.
    pub product: Option<Product>,
}

/// Type-specific product data, chosen by `__typename`.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ProductKind {
    /// `SimpleProduct`, or an item that did not select `__typename`.
    #[default]
    Simple,
    /// `VirtualProduct`
    Virtual,
    /// `ConfigurableProduct`
    Configurable {
        /// Attributes the product varies on.
        options: Vec<ConfigurableOption>,
        /// The variants.
        variants: Vec<Variant>,
    },
    /// `BundleProduct`
    Bundle {
        /// Highest price for the bundle.
        maximum_price: Option<ProductPrice>,
    },
    /// Any other product type, by its `__typename`.
    Other(String),
}

/// A catalog product.
///
/// # Example
///
/// ```rust
/// use commerce_graphql::model::{Product, ProductKind};
///
/// let product: Product = serde_json::from_value(serde_json::json!({
///     "__typename": "ConfigurableProduct",
///     "sku": "MH01",
///     "meta_title": "Chaz Kangeroo Hoodie",
///     "variants": [{"attributes": [], "product": {"sku": "MH01-XS-Black"}}]
/// }))
/// .unwrap();
///
/// assert_eq!(product.sku.as_deref(), Some("MH01"));
/// assert!(matches!(product.kind, ProductKind::Configurable { ref variants, .. } if variants.len() == 1));
/// assert_eq!(product.extra["meta_title"], "Chaz Kangeroo Hoodie");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(from = "RawProduct")]
pub struct Product {
    /// The `__typename` of the item.
    pub type_name: Option<String>,
    /// Opaque id.
    pub uid: Option<String>,
    /// SKU.
    pub sku: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// URL key.
    pub url_key: Option<String>,
    /// `IN_STOCK` / `OUT_OF_STOCK`.
    pub stock_status: Option<String>,
    /// HTML description.
    pub description: Option<String>,
    /// Price range.
    pub price_range: Option<PriceRange>,
    /// Listing image.
    pub small_image: Option<ProductImage>,
    /// Gallery images.
    pub media_gallery: Vec<ProductImage>,
    /// Type-specific data.
    pub kind: ProductKind,
    /// `related_products`
    pub related_products: Vec<Product>,
    /// `upsell_products`
    pub upsell_products: Vec<Product>,
    /// `crosssell_products`
    pub crosssell_products: Vec<Product>,
    /// Every other selected field, keyed by response key.
    pub extra: Map<String, Value>,
}

impl Product {
    /// Returns the variants of a configurable product, or an empty slice.
    #[must_use]
    pub fn variants(&self) -> &[Variant] {
        match &self.kind {
            ProductKind::Configurable { variants, .. } => variants,
            _ => &[],
        }
    }
}

#[derive(Deserialize)]
struct RawProduct {
    #[serde(rename = "__typename")]
    type_name: Option<String>,
    uid: Option<String>,
    sku: Option<String>,
    name: Option<String>,
    url_key: Option<String>,
    stock_status: Option<String>,
    description: Option<ComplexText>,
    price_range: Option<PriceRange>,
    small_image: Option<ProductImage>,
    #[serde(default, deserialize_with = "null_as_empty")]
    media_gallery: Vec<ProductImage>,
    #[serde(default, deserialize_with = "null_as_empty")]
    configurable_options: Vec<ConfigurableOption>,
    #[serde(default, deserialize_with = "null_as_empty")]
    variants: Vec<Variant>,
    #[serde(default, deserialize_with = "null_as_empty")]
    related_products: Vec<Product>,
    #[serde(default, deserialize_with = "null_as_empty")]
    upsell_products: Vec<Product>,
    #[serde(default, deserialize_with = "null_as_empty")]
    crosssell_products: Vec<Product>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawProduct> for Product {
    fn from(raw: RawProduct) -> Self {
        let kind = match raw.type_name.as_deref() {
            None | Some("SimpleProduct") => ProductKind::Simple,
            Some("VirtualProduct") => ProductKind::Virtual,
            Some("ConfigurableProduct") => ProductKind::Configurable {
                options: raw.configurable_options,
                variants: raw.variants,
            },
            Some("BundleProduct") => ProductKind::Bundle {
                maximum_price: raw
                    .price_range
                    .as_ref()
                    .and_then(|range| range.maximum_price.clone()),
            },
            Some(other) => ProductKind::Other(other.to_string()),
        };

        Self {
            type_name: raw.type_name,
            uid: raw.uid,
            sku: raw.sku,
            name: raw.name,
            url_key: raw.url_key,
            stock_status: raw.stock_status,
            description: raw.description.and_then(|text| text.html),
            price_range: raw.price_range,
            small_image: raw.small_image,
            media_gallery: raw.media_gallery,
            kind,
            related_products: raw.related_products,
            upsell_products: raw.upsell_products,
            crosssell_products: raw.crosssell_products,
            extra: raw.extra,
        }
    }
}
