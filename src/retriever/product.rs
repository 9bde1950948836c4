//! Single product lookup by SKU or URL key.

use std::fmt;
use std::sync::Arc;

use apollo_compiler::name;
use serde::Deserialize;
use serde_json::Value;

use super::base::{parse_member, Retriever};
use super::selection;
use crate::clients::{GraphqlErrorEntry, QueryClient};
use crate::error::RetrieverError;
use crate::model::{null_as_empty, EntityType, Identifier, IdentifierType, Product};
use crate::query::{Field, FilterInput, Operation, SelectionExtension, SelectionHooks, SelectionSet};

/// The `products { items }` member shared by the product retrievers.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProductItems {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub(crate) items: Vec<Product>,
}

/// Returns the filter attribute `identifier` is matched against.
pub(crate) fn product_filter_attribute(
    identifier: &Identifier,
) -> Result<&'static str, RetrieverError> {
    match (identifier.entity(), identifier.id_type()) {
        (EntityType::Product, IdentifierType::Sku) => Ok("sku"),
        (EntityType::Product, IdentifierType::UrlKey) => Ok("url_key"),
        (entity, id_type) => Err(RetrieverError::UnsupportedIdentifier { entity, id_type }),
    }
}

/// Renders `{products(filter:...){<selection>}}`.
pub(crate) fn products_operation(
    filter: &FilterInput,
    selection: SelectionSet,
) -> Result<String, RetrieverError> {
    let products = Field::new(name!("products"))
        .argument(name!("filter"), filter.to_value()?)
        .with_selection(selection);
    Ok(Operation::query(SelectionSet::new().with(products)).to_string())
}

#[derive(Default)]
struct ProductQueryBuilder {
    identifier: Option<Identifier>,
    product_hooks: SelectionHooks,
    variant_hooks: SelectionHooks,
}

impl ProductQueryBuilder {
    fn build(&self) -> Result<String, RetrieverError> {
        let identifier = self
            .identifier
            .as_ref()
            .ok_or(RetrieverError::MissingIdentifier {
                entity: EntityType::Product,
            })?;
        let attribute = product_filter_attribute(identifier)?;
        let filter = FilterInput::equals(attribute, identifier.value());

        let mut items = selection::product_detail(&self.variant_hooks);
        self.product_hooks.apply(&mut items);

        products_operation(&filter, SelectionSet::new().nested("items", items))
    }
}

fn parse_first_product(data: Option<Value>) -> Result<Option<Product>, serde_json::Error> {
    let products: ProductItems = parse_member(data, "products")?;
    Ok(products.items.into_iter().next())
}

/// Retrieves one product with its detail fields.
///
/// The first item the backend returns is the product; no item means the
/// product does not exist, which is not an error.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use commerce_graphql::{Identifier, ProductRetriever, QueryClient};
///
/// # async fn run(client: Arc<dyn QueryClient>) -> Result<(), commerce_graphql::RetrieverError> {
/// let mut retriever = ProductRetriever::new(Some(client))?;
/// retriever.set_identifier(Identifier::sku("MH01"))?;
/// retriever.extend_query_with(|product| {
///     product.add_fields(&["meta_title", "meta_description"]);
/// });
///
/// if let Some(product) = retriever.fetch_product().await? {
///     println!("{:?}", product.name);
/// }
/// # Ok(())
/// # }
/// ```
pub struct ProductRetriever {
    base: Retriever<Option<Product>>,
    builder: ProductQueryBuilder,
}

impl ProductRetriever {
    /// Creates a retriever.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::MissingClient`] if `client` is `None`.
    pub fn new(client: Option<Arc<dyn QueryClient>>) -> Result<Self, RetrieverError> {
        Ok(Self {
            base: Retriever::new(client)?,
            builder: ProductQueryBuilder::default(),
        })
    }

    /// Sets the product to look up.
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
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.base.set_query(query);
    }

    /// Adds fields to the product selection.
    pub fn extend_query_with<F>(&mut self, hook: F)
    where
        F: Fn(&mut SelectionExtension<'_>) + Send + Sync + 'static,
    {
        self.builder.product_hooks.push(hook);
    }

    /// Adds fields to the product selection of every variant.
    pub fn extend_variant_query_with<F>(&mut self, hook: F)
    where
        F: Fn(&mut SelectionExtension<'_>) + Send + Sync + 'static,
    {
        self.builder.variant_hooks.push(hook);
    }

    /// Fetches once and returns the product, if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::MissingIdentifier`] when neither an
    /// identifier nor a query is set.
    pub async fn fetch_product(&mut self) -> Result<Option<&Product>, RetrieverError> {
        let builder = &self.builder;
        let product = self
            .base
            .fetch_with(|| builder.build(), parse_first_product)
            .await?;
        Ok(product.as_ref())
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

    /// Returns `true` once the query has been executed.
    #[must_use]
    pub const fn is_fetched(&self) -> bool {
        self.base.is_fetched()
    }
}

impl fmt::Debug for ProductRetriever {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProductRetriever")
            .field("base", &self.base)
            .field("identifier", &self.builder.identifier)
            .field("product_hooks", &self.builder.product_hooks)
            .field("variant_hooks", &self.builder.variant_hooks)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProductKind;
    use crate::query::document::compact;
    use crate::retriever::base::testing::{client, MockClient};
    use serde_json::json;

    fn configurable_response() -> Value {
        json!({"products": {"items": [{
            "__typename": "ConfigurableProduct",
            "sku": "MH01",
            "name": "Chaz Kangeroo Hoodie",
            "meta_title": "Hoodie",
            "variants": [{
                "attributes": [{"code": "size", "value_index": 167, "label": "XS"}],
                "product": {"sku": "MH01-XS-Black", "weight": 1.0}
            }]
        }]}})
    }

    #[tokio::test]
    async fn test_sku_lookup_with_hooks() {
        let mock = MockClient::with_data(configurable_response());
        let mut retriever = ProductRetriever::new(client(&mock)).unwrap();
        retriever.set_identifier(Identifier::sku("MH01")).unwrap();
        retriever.extend_query_with(|product| {
            product.add_field("meta_title");
        });
        retriever.extend_variant_query_with(|variant| {
            variant.add_field("weight");
        });

        let product = retriever.fetch_product().await.unwrap().unwrap();
        assert_eq!(product.sku.as_deref(), Some("MH01"));
        assert!(matches!(product.kind, ProductKind::Configurable { .. }));
        assert_eq!(product.extra["meta_title"], "Hoodie");
        assert_eq!(
            product.variants()[0].product.as_ref().unwrap().extra["weight"],
            1.0
        );

        let query = compact(&mock.last_query().unwrap());
        assert!(query.starts_with(r#"{products(filter:{sku:{eq:"MH01"}}){items{__typename"#));
        assert!(query.contains("product{__typenameuidskunamestock_status"));
        assert!(query.contains("weight}"));
        assert!(query.ends_with("meta_title}}}"));
    }

    #[tokio::test]
    async fn test_hook_fragment_cannot_realias_base_field() {
        let mock = MockClient::with_data(json!({"products": {"items": [{"sku": "MH01"}]}}));
        let mut retriever = ProductRetriever::new(client(&mock)).unwrap();
        retriever.set_identifier(Identifier::sku("MH01")).unwrap();
        retriever.extend_query_with(|product| {
            product.add_fragment(
                "SimpleProduct",
                SelectionSet::new()
                    .with(Field::new(name!("name")).alias(name!("sku")))
                    .field("weight"),
            );
        });

        let product = retriever.fetch_product().await.unwrap().unwrap();
        assert_eq!(product.sku.as_deref(), Some("MH01"));

        let query = compact(&mock.last_query().unwrap());
        assert!(!query.contains("sku:name"));
        assert!(query.contains("...onSimpleProduct{weight}"));
    }

    #[tokio::test]
    async fn test_url_key_lookup() {
        let mock = MockClient::with_data(json!({"products": {"items": []}}));
        let mut retriever = ProductRetriever::new(client(&mock)).unwrap();
        retriever
            .set_identifier(Identifier::product(IdentifierType::UrlKey, "chaz-hoodie"))
            .unwrap();

        assert!(retriever.fetch_product().await.unwrap().is_none());
        assert!(retriever.fetch_product().await.unwrap().is_none());
        assert_eq!(mock.calls(), 1);
        assert!(compact(&mock.last_query().unwrap())
            .contains(r#"products(filter:{url_key:{eq:"chaz-hoodie"}})"#));
        assert_eq!(retriever.has_errors(), Ok(false));
    }

    #[test]
    fn test_unsupported_identifiers_are_rejected() {
        let mock = MockClient::with_data(json!({}));
        let mut retriever = ProductRetriever::new(client(&mock)).unwrap();

        let result = retriever.set_identifier(Identifier::product(IdentifierType::Uid, "MTI="));
        assert_eq!(
            result,
            Err(RetrieverError::UnsupportedIdentifier {
                entity: EntityType::Product,
                id_type: IdentifierType::Uid,
            })
        );

        let result = retriever.set_identifier(Identifier::category(IdentifierType::UrlKey, "tops"));
        assert!(matches!(
            result,
            Err(RetrieverError::UnsupportedIdentifier {
                entity: EntityType::Category,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_fetch_without_identifier() {
        let mock = MockClient::with_data(json!({}));
        let mut retriever = ProductRetriever::new(client(&mock)).unwrap();

        let result = retriever.fetch_product().await;
        assert_eq!(
            result.map(|p| p.cloned()),
            Err(RetrieverError::MissingIdentifier {
                entity: EntityType::Product
            })
        );
        assert_eq!(mock.calls(), 0);
        assert_eq!(retriever.errors(), Err(RetrieverError::NotFetched));
    }

    #[tokio::test]
    async fn test_query_override_without_identifier() {
        let mock = MockClient::with_data(configurable_response());
        let mut retriever = ProductRetriever::new(client(&mock)).unwrap();
        retriever.set_query(r#"{products(filter:{sku:{eq:"MH01"}}){items{sku}}}"#);

        assert!(retriever.fetch_product().await.unwrap().is_some());
        assert_eq!(
            mock.last_query().as_deref(),
            Some(r#"{products(filter:{sku:{eq:"MH01"}}){items{sku}}}"#)
        );
    }
}
