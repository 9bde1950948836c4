//! Product list lookup by SKUs or URL keys.

use std::fmt;
use std::sync::Arc;

use apollo_compiler::name;
use serde::Deserialize;
use serde_json::Value;

use super::base::{parse_member, Retriever};
use super::product::product_filter_attribute;
use super::selection;
use crate::aggregation::Aggregation;
use crate::clients::{GraphqlErrorEntry, QueryClient};
use crate::error::RetrieverError;
use crate::model::{null_as_empty, Identifier, Product};
use crate::query::document::int_value;
use crate::query::{
    Field, FilterHooks, FilterInput, Operation, SelectionExtension, SelectionHooks, SelectionSet,
};

#[derive(Debug, Default, Deserialize)]
struct ProductPage {
    total_count: Option<i64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    items: Vec<Product>,
    #[serde(default, deserialize_with = "null_as_empty")]
    aggregations: Vec<Aggregation>,
}

#[derive(Default)]
struct ProductsQueryBuilder {
    identifiers: Vec<Identifier>,
    attribute: Option<&'static str>,
    product_hooks: SelectionHooks,
    filter_hooks: FilterHooks,
    page_size: Option<u32>,
    current_page: Option<u32>,
    aggregations: bool,
}

impl ProductsQueryBuilder {
    fn default_filter(&self) -> FilterInput {
        FilterInput::one_of(
            self.attribute.unwrap_or("sku"),
            self.identifiers.iter().map(|id| id.value().to_string()),
        )
    }

    fn page_size(&self) -> Option<u32> {
        self.page_size.or_else(|| {
            u32::try_from(self.identifiers.len())
                .ok()
                .filter(|count| *count > 0)
        })
    }

    fn build(&self) -> Result<String, RetrieverError> {
        let filter = self.filter_hooks.fold(self.default_filter());

        let mut items = selection::product_summary();
        self.product_hooks.apply(&mut items);

        let mut page = SelectionSet::new()
            .field("total_count")
            .nested("items", items);
        if self.aggregations {
            page = page.nested("aggregations", selection::aggregations());
        }

        let mut products = Field::new(name!("products")).argument(name!("filter"), filter.to_value()?);
        if let Some(page_size) = self.page_size() {
            products = products.argument(name!("pageSize"), int_value(page_size));
        }
        if let Some(current_page) = self.current_page {
            products = products.argument(name!("currentPage"), int_value(current_page));
        }

        Ok(Operation::query(SelectionSet::new().with(products.with_selection(page))).to_string())
    }
}

fn parse_page(data: Option<Value>) -> Result<ProductPage, serde_json::Error> {
    parse_member(data, "products")
}

/// Retrieves a list of products in one query.
///
/// The default filter selects the given identifiers with an `in` predicate;
/// filter hooks may extend or replace it. Items are returned in backend
/// order.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use commerce_graphql::query::FilterCondition;
/// use commerce_graphql::{Identifier, ProductsRetriever, QueryClient};
///
/// # async fn run(client: Arc<dyn QueryClient>) -> Result<(), commerce_graphql::RetrieverError> {
/// let mut retriever = ProductsRetriever::new(Some(client))?;
/// retriever.set_identifiers([Identifier::sku("24-MG01"), Identifier::sku("24-MG02")])?;
/// retriever.extend_filter_with(|filter| {
///     filter.with("category_uid", FilterCondition::Eq("MTI=".to_string()))
/// });
///
/// for product in retriever.fetch_products().await? {
///     println!("{:?}", product.sku);
/// }
/// # Ok(())
/// # }
/// ```
pub struct ProductsRetriever {
    base: Retriever<ProductPage>,
    builder: ProductsQueryBuilder,
}

impl ProductsRetriever {
    /// Creates a retriever.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::MissingClient`] if `client` is `None`.
    pub fn new(client: Option<Arc<dyn QueryClient>>) -> Result<Self, RetrieverError> {
        Ok(Self {
            base: Retriever::new(client)?,
            builder: ProductsQueryBuilder::default(),
        })
    }

    /// Sets the products to look up.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::UnsupportedIdentifier`] unless every
    /// identifier is a product SKU or URL key and all share one type. The
    /// previous identifiers are kept in that case.
    pub fn set_identifiers<I>(&mut self, identifiers: I) -> Result<(), RetrieverError>
    where
        I: IntoIterator<Item = Identifier>,
    {
        let identifiers: Vec<Identifier> = identifiers.into_iter().collect();
        let mut attribute = None;
        for identifier in &identifiers {
            let current = product_filter_attribute(identifier)?;
            if attribute.is_some_and(|first| first != current) {
                return Err(RetrieverError::UnsupportedIdentifier {
                    entity: identifier.entity(),
                    id_type: identifier.id_type(),
                });
            }
            attribute = Some(current);
        }

        self.builder.identifiers = identifiers;
        self.builder.attribute = attribute;
        Ok(())
    }

    /// Replaces the generated query.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.base.set_query(query);
    }

    /// Adds fields to the selection of every item.
    pub fn extend_query_with<F>(&mut self, hook: F)
    where
        F: Fn(&mut SelectionExtension<'_>) + Send + Sync + 'static,
    {
        self.builder.product_hooks.push(hook);
    }

    /// Transforms the filter; hooks run in registration order.
    pub fn extend_filter_with<F>(&mut self, hook: F)
    where
        F: Fn(FilterInput) -> FilterInput + Send + Sync + 'static,
    {
        self.builder.filter_hooks.push(hook);
    }

    /// Sets `pageSize`. Defaults to the number of identifiers.
    pub fn set_page_size(&mut self, page_size: u32) {
        self.builder.page_size = Some(page_size);
    }

    /// Sets `currentPage` (1-based).
    pub fn set_current_page(&mut self, current_page: u32) {
        self.builder.current_page = Some(current_page);
    }

    /// Selects the facet aggregations of the search.
    pub fn with_aggregations(&mut self, enabled: bool) {
        self.builder.aggregations = enabled;
    }

    async fn fetch(&mut self) -> Result<&ProductPage, RetrieverError> {
        let builder = &self.builder;
        self.base
            .fetch_with(|| builder.build(), parse_page)
            .await
    }

    /// Fetches once and returns the products in backend order.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::InvalidName`] when a filter hook used an
    /// attribute that is not a GraphQL name. Backend errors are reported
    /// through [`errors`](Self::errors).
    pub async fn fetch_products(&mut self) -> Result<&[Product], RetrieverError> {
        Ok(&self.fetch().await?.items)
    }

    /// Fetches once and returns the facet aggregations.
    ///
    /// Empty unless [`with_aggregations`](Self::with_aggregations) was enabled.
    ///
    /// # Errors
    ///
    /// See [`fetch_products`](Self::fetch_products).
    pub async fn fetch_aggregations(&mut self) -> Result<&[Aggregation], RetrieverError> {
        Ok(&self.fetch().await?.aggregations)
    }

    /// Fetches once and returns the number of matches across all pages.
    ///
    /// # Errors
    ///
    /// See [`fetch_products`](Self::fetch_products).
    pub async fn fetch_total_count(&mut self) -> Result<Option<i64>, RetrieverError> {
        Ok(self.fetch().await?.total_count)
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

impl fmt::Debug for ProductsRetriever {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProductsRetriever")
            .field("base", &self.base)
            .field("identifiers", &self.builder.identifiers)
            .field("filter_hooks", &self.builder.filter_hooks)
            .field("product_hooks", &self.builder.product_hooks)
            .finish_non_exhaustive()
    }
}
