//! Related, upsell and cross-sell products of a base product.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::base::{parse_member, Retriever};
use super::product::{product_filter_attribute, products_operation, ProductItems};
use super::selection;
use crate::clients::{GraphqlErrorEntry, QueryClient};
use crate::error::RetrieverError;
use crate::model::{EntityType, Identifier, Product};
use crate::query::{FilterInput, SelectionExtension, SelectionHooks, SelectionSet};

/// Which relation list of the base product is retrieved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RelationType {
    /// `related_products`
    #[default]
    Related,
    /// `upsell_products`
    Upsell,
    /// `crosssell_products`
    CrossSell,
}

impl RelationType {
    /// Returns the product field holding the relation.
    #[must_use]
    pub const fn field_name(&self) -> &'static str {
        match self {
            Self::Related => "related_products",
            Self::Upsell => "upsell_products",
            Self::CrossSell => "crosssell_products",
        }
    }

    fn take_from(self, product: &mut Product) -> Vec<Product> {
        std::mem::take(match self {
            Self::Related => &mut product.related_products,
            Self::Upsell => &mut product.upsell_products,
            Self::CrossSell => &mut product.crosssell_products,
        })
    }
}

/// The base product's SKU and its relation list.
#[derive(Debug, Default)]
struct RelatedProducts {
    base_sku: Option<String>,
    products: Vec<Product>,
}

struct RelatedQueryBuilder {
    identifier: Option<Identifier>,
    relation: RelationType,
    product_hooks: SelectionHooks,
}

impl RelatedQueryBuilder {
    fn build(&self) -> Result<String, RetrieverError> {
        let identifier = self
            .identifier
            .as_ref()
            .ok_or(RetrieverError::MissingIdentifier {
                entity: EntityType::Product,
            })?;
        let attribute = product_filter_attribute(identifier)?;
        let filter = FilterInput::equals(attribute, identifier.value());

        let mut related = selection::product_summary();
        self.product_hooks.apply(&mut related);
        let base = SelectionSet::new()
            .fields(&["__typename", "sku"])
            .nested(self.relation.field_name(), related);

        products_operation(&filter, SelectionSet::new().nested("items", base))
    }

    fn parse(&self, data: Option<Value>) -> Result<RelatedProducts, serde_json::Error> {
        let page: ProductItems = parse_member(data, "products")?;
        let Some(mut base) = page.items.into_iter().next() else {
            tracing::debug!("No base product found for {} lookup", self.relation.field_name());
            return Ok(RelatedProducts::default());
        };
        Ok(RelatedProducts {
            products: self.relation.take_from(&mut base),
            base_sku: base.sku,
        })
    }
}

/// Retrieves one relation list of a base product.
///
/// The base product and its relation are fetched in one query; the result is
/// the relation list, not the base product. When the base product does not
/// exist the list is empty and [`fetch_sku`](Self::fetch_sku) returns `None`.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use commerce_graphql::{Identifier, QueryClient, RelatedProductsRetriever, RelationType};
///
/// # async fn run(client: Arc<dyn QueryClient>) -> Result<(), commerce_graphql::RetrieverError> {
/// let mut retriever = RelatedProductsRetriever::new(Some(client), RelationType::Upsell)?;
/// retriever.set_identifier(Identifier::sku("MH01"))?;
///
/// let upsells = retriever.fetch_products().await?.len();
/// println!("{upsells} upsells for {:?}", retriever.fetch_sku().await?);
/// # Ok(())
/// # }
/// ```
pub struct RelatedProductsRetriever {
    base: Retriever<RelatedProducts>,
    builder: RelatedQueryBuilder,
}

impl RelatedProductsRetriever {
    /// Creates a retriever for `relation`.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::MissingClient`] if `client` is `None`.
    pub fn new(
        client: Option<Arc<dyn QueryClient>>,
        relation: RelationType,
    ) -> Result<Self, RetrieverError> {
        Ok(Self {
            base: Retriever::new(client)?,
            builder: RelatedQueryBuilder {
                identifier: None,
                relation,
                product_hooks: SelectionHooks::new(),
            },
        })
    }

    /// Returns the relation this retriever fetches.
    #[must_use]
    pub const fn relation(&self) -> RelationType {
        self.builder.relation
    }

    /// Sets the base product.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::UnsupportedIdentifier`] unless `identifier`
    /// is a product SKU or URL key.
    pub fn set_identifier(&mut self, identifier: Identifier) -> Result<(), RetrieverError> {
        product_filter_attribute(&identifier)?;
        self.builder.identifier = Some(identifier);
        Ok(())
    }

    /// Replaces the generated query.
    ///
    /// The query must select the relation field under `products.items`.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.base.set_query(query);
    }

    /// Adds fields to the selection of every related product.
    pub fn extend_query_with<F>(&mut self, hook: F)
    where
        F: Fn(&mut SelectionExtension<'_>) + Send + Sync + 'static,
    {
        self.builder.product_hooks.push(hook);
    }

    async fn fetch(&mut self) -> Result<&RelatedProducts, RetrieverError> {
        let builder = &self.builder;
        self.base
            .fetch_with(|| builder.build(), |data| builder.parse(data))
            .await
    }

    /// Fetches once and returns the relation list in backend order.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::MissingIdentifier`] when neither an
    /// identifier nor a query is set.
    pub async fn fetch_products(&mut self) -> Result<&[Product], RetrieverError> {
        Ok(&self.fetch().await?.products)
    }

    /// Fetches once and returns the SKU of the base product, if it exists.
    ///
    /// # Errors
    ///
    /// See [`fetch_products`](Self::fetch_products).
    pub async fn fetch_sku(&mut self) -> Result<Option<&str>, RetrieverError> {
        Ok(self.fetch().await?.base_sku.as_deref())
    }

    /// See [`Retriever::errors`].
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::NotFetched`] before the first fetch.
    pub fn errors(&self) -> Result<&[GraphqlErrorEntry], RetrieverError> {
        self.base.errors()
    }

    /// See [`Retriever::has_errors`].
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::NotFetched`] before the first fetch.
    pub fn has_errors(&self) -> Result<bool, RetrieverError> {
        self.base.has_errors()
    }
}

impl fmt::Debug for RelatedProductsRetriever {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelatedProductsRetriever")
            .field("base", &self.base)
            .field("relation", &self.builder.relation)
            .field("identifier", &self.builder.identifier)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::document::compact;
    use crate::retriever::base::testing::{client, MockClient};
    use serde_json::json;

    #[tokio::test]
    async fn test_related_products_are_projected_from_base_product() {
        let mock = MockClient::with_data(json!({"products": {"items": [{
            "__typename": "SimpleProduct",
            "sku": "24-MB01",
            "related_products": [{"sku": "24-MB04"}, {"sku": "24-MB03"}]
        }]}}));
        let mut retriever = RelatedProductsRetriever::new(client(&mock), RelationType::Related).unwrap();
        retriever.set_identifier(Identifier::sku("24-MB01")).unwrap();

        let skus: Vec<_> = retriever
            .fetch_products()
            .await
            .unwrap()
            .iter()
            .filter_map(|p| p.sku.clone())
            .collect();
        assert_eq!(skus, ["24-MB04", "24-MB03"]);
        assert_eq!(retriever.fetch_sku().await.unwrap(), Some("24-MB01"));
        assert_eq!(mock.calls(), 1);

        let query = compact(&mock.last_query().unwrap());
        assert!(query.starts_with(
            r#"{products(filter:{sku:{eq:"24-MB01"}}){items{__typenameskurelated_products{"#
        ));
    }

    #[tokio::test]
    async fn test_upsell_selects_upsell_field_with_hooks() {
        let mock = MockClient::with_data(json!({"products": {"items": [{
            "sku": "MH01",
            "related_products": [{"sku": "ignored"}],
            "upsell_products": [{"sku": "MH02", "meta_title": "Upsell"}]
        }]}}));
        let mut retriever = RelatedProductsRetriever::new(client(&mock), RelationType::Upsell).unwrap();
        retriever.set_identifier(Identifier::sku("MH01")).unwrap();
        retriever.extend_query_with(|product| {
            product.add_field("meta_title");
        });

        let products = retriever.fetch_products().await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].extra["meta_title"], "Upsell");

        let query = compact(&mock.last_query().unwrap());
        assert!(query.contains("upsell_products{"));
        assert!(!query.contains("related_products"));
        assert!(query.contains("meta_title}"));
    }

    #[tokio::test]
    async fn test_missing_base_product() {
        let mock = MockClient::with_data(json!({"products": {"items": []}}));
        let mut retriever =
            RelatedProductsRetriever::new(client(&mock), RelationType::CrossSell).unwrap();
        retriever.set_identifier(Identifier::sku("nope")).unwrap();

        assert!(retriever.fetch_products().await.unwrap().is_empty());
        assert_eq!(retriever.fetch_sku().await.unwrap(), None);
        assert_eq!(mock.calls(), 1);
        assert_eq!(retriever.has_errors(), Ok(false));
    }

    #[tokio::test]
    async fn test_fetch_sku_first() {
        let mock = MockClient::with_data(json!({"products": {"items": [{"sku": "MH01"}]}}));
        let mut retriever = RelatedProductsRetriever::new(client(&mock), RelationType::Related).unwrap();
        retriever.set_identifier(Identifier::sku("MH01")).unwrap();

        assert_eq!(retriever.fetch_sku().await.unwrap(), Some("MH01"));
        assert!(retriever.fetch_products().await.unwrap().is_empty());
        assert_eq!(mock.calls(), 1);
    }

    #[test]
    fn test_relation_field_names() {
        assert_eq!(RelationType::Related.field_name(), "related_products");
        assert_eq!(RelationType::Upsell.field_name(), "upsell_products");
        assert_eq!(RelationType::CrossSell.field_name(), "crosssell_products");
    }
}
