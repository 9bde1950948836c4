//! Single category lookup, optionally with a page of its products.
//!
//! How an identifier is resolved depends on whether the backend supports
//! `category_uid` filters:
//!
//! | identifier | uid support on                  | uid support off                           |
//! |------------|---------------------------------|-------------------------------------------|
//! | `UrlPath`  | `categoryList(url_path: eq)`    | `categoryList(url_path: eq)`              |
//! | `UrlKey`   | `categoryList(url_key: eq)`     | `categoryList(url_key: eq)`               |
//! | `Uid`      | `categoryList(category_uid: eq)`| `category(id:)` with the decoded uid      |
//! | `Id`       | `categoryList(category_uid: eq)` with the encoded id | `category(id:)` |
//!
//! Legacy ids that are not 32-bit integers, and uids that do not decode to
//! one, fall back to `categoryList(ids: eq)`.

use std::fmt;
use std::sync::Arc;

use apollo_compiler::ast;
use apollo_compiler::name;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

use super::base::Retriever;
use super::selection;
use crate::clients::{GraphqlErrorEntry, QueryClient};
use crate::config::CommerceConfig;
use crate::error::RetrieverError;
use crate::model::{Category, EntityType, Identifier, IdentifierType};
use crate::query::document::int_value;
use crate::query::{Field, FilterInput, Operation, SelectionExtension, SelectionHooks, SelectionSet};

/// How a category identifier is looked up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum CategoryLookup {
    /// `category(id: Int)`; returns an object.
    Legacy(i32),
    /// `categoryList(filters: ...)`; returns a list.
    List(FilterInput),
}

impl CategoryLookup {
    /// Resolves `identifier` according to the table in the module docs.
    pub(crate) fn resolve(
        identifier: &Identifier,
        uid_enabled: bool,
    ) -> Result<Self, RetrieverError> {
        let value = identifier.value();
        match (identifier.entity(), identifier.id_type()) {
            (EntityType::Category, IdentifierType::UrlPath) => {
                Ok(Self::List(FilterInput::equals("url_path", value)))
            }
            (EntityType::Category, IdentifierType::UrlKey) => {
                Ok(Self::List(FilterInput::equals("url_key", value)))
            }
            (EntityType::Category, IdentifierType::Uid) if uid_enabled => {
                Ok(Self::List(FilterInput::equals("category_uid", value)))
            }
            (EntityType::Category, IdentifierType::Id) if uid_enabled => Ok(Self::List(
                FilterInput::equals("category_uid", STANDARD.encode(value)),
            )),
            (EntityType::Category, IdentifierType::Id) => Ok(Self::legacy(value)),
            (EntityType::Category, IdentifierType::Uid) => {
                let decoded = STANDARD
                    .decode(value)
                    .ok()
                    .and_then(|bytes| String::from_utf8(bytes).ok());
                match decoded {
                    Some(id) => Ok(Self::legacy(&id)),
                    None => {
                        tracing::debug!("Category uid '{}' is not base64, using ids filter", value);
                        Ok(Self::List(FilterInput::equals("ids", value)))
                    }
                }
            }
            (entity, id_type) => Err(RetrieverError::UnsupportedIdentifier { entity, id_type }),
        }
    }

    fn legacy(id: &str) -> Self {
        id.trim().parse().map_or_else(
            |_| Self::List(FilterInput::equals("ids", id)),
            Self::Legacy,
        )
    }

    /// Returns the lookup field with `selection`.
    pub(crate) fn field(&self, selection: SelectionSet) -> Result<Field, RetrieverError> {
        let field = match self {
            Self::Legacy(id) => {
                Field::new(name!("category")).argument(name!("id"), ast::Value::Int((*id).into()))
            }
            Self::List(filter) => {
                Field::new(name!("categoryList")).argument(name!("filters"), filter.to_value()?)
            }
        };
        Ok(field.with_selection(selection))
    }
}

/// Maps a `category` object or the first entry of a `categoryList` array.
pub(crate) fn parse_category(value: Value) -> Result<Option<Category>, serde_json::Error> {
    match value {
        Value::Null => Ok(None),
        Value::Array(entries) => match entries.into_iter().find(|entry| !entry.is_null()) {
            Some(entry) => serde_json::from_value(entry).map(Some),
            None => Ok(None),
        },
        object => serde_json::from_value(object).map(Some),
    }
}

/// `currentPage` and `pageSize` of the category's product page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct ProductPageRequest {
    current_page: Option<u32>,
    page_size: Option<u32>,
}

struct CategoryQueryBuilder {
    identifier: Option<Identifier>,
    uid_enabled: bool,
    category_hooks: SelectionHooks,
    product_hooks: SelectionHooks,
    products: Option<ProductPageRequest>,
}

impl CategoryQueryBuilder {
    fn lookup(&self) -> Result<CategoryLookup, RetrieverError> {
        let identifier = self
            .identifier
            .as_ref()
            .ok_or(RetrieverError::MissingIdentifier {
                entity: EntityType::Category,
            })?;
        CategoryLookup::resolve(identifier, self.uid_enabled)
    }

    fn build(&self) -> Result<String, RetrieverError> {
        let lookup = self.lookup()?;

        let mut category = selection::category(self.uid_enabled);
        if let Some(page) = self.products {
            let mut items = selection::product_summary();
            self.product_hooks.apply(&mut items);

            let mut products = Field::new(name!("products"));
            if let Some(current_page) = page.current_page {
                products = products.argument(name!("currentPage"), int_value(current_page));
            }
            if let Some(page_size) = page.page_size {
                products = products.argument(name!("pageSize"), int_value(page_size));
            }
            category = category.with(products.with_selection(
                SelectionSet::new().field("total_count").nested("items", items),
            ));
        }
        self.category_hooks.apply(&mut category);

        let root = SelectionSet::new().with(lookup.field(category)?);
        Ok(Operation::query(root).to_string())
    }

    fn parse(&self, data: Option<Value>) -> Result<Option<Category>, serde_json::Error> {
        let Some(mut data) = data else {
            return Ok(None);
        };
        let value = ["category", "categoryList"]
            .iter()
            .find_map(|key| data.get_mut(*key).map(Value::take))
            .unwrap_or(Value::Null);
        parse_category(value)
    }
}

/// Retrieves one category.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use commerce_graphql::{CategoryRetriever, Identifier, IdentifierType, QueryClient};
///
/// # async fn run(client: Arc<dyn QueryClient>) -> Result<(), commerce_graphql::RetrieverError> {
/// let mut retriever = CategoryRetriever::new(Some(client))?;
/// retriever.set_identifier(Identifier::category(IdentifierType::UrlPath, "men/tops"))?;
/// retriever.set_page_size(12);
///
/// if let Some(category) = retriever.fetch_category().await? {
///     println!("{:?}: {:?}", category.name, category.products.as_ref().map(|p| p.total_count));
/// }
/// # Ok(())
/// # }
/// ```
pub struct CategoryRetriever {
    base: Retriever<Option<Category>>,
    builder: CategoryQueryBuilder,
}

impl CategoryRetriever {
    /// Creates a retriever for a backend with `category_uid` support.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::MissingClient`] if `client` is `None`.
    pub fn new(client: Option<Arc<dyn QueryClient>>) -> Result<Self, RetrieverError> {
        Self::with_uid_enabled(client, true)
    }

    /// Creates a retriever using
    /// [`CommerceConfig::category_uid_enabled`] of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::MissingClient`] if `client` is `None`.
    pub fn from_config(
        client: Option<Arc<dyn QueryClient>>,
        config: &CommerceConfig,
    ) -> Result<Self, RetrieverError> {
        Self::with_uid_enabled(client, config.category_uid_enabled())
    }

    fn with_uid_enabled(
        client: Option<Arc<dyn QueryClient>>,
        uid_enabled: bool,
    ) -> Result<Self, RetrieverError> {
        Ok(Self {
            base: Retriever::new(client)?,
            builder: CategoryQueryBuilder {
                identifier: None,
                uid_enabled,
                category_hooks: SelectionHooks::new(),
                product_hooks: SelectionHooks::new(),
                products: None,
            },
        })
    }

    /// Switches between uid lookups and legacy integer id lookups.
    pub fn set_uid_enabled(&mut self, enabled: bool) {
        self.builder.uid_enabled = enabled;
    }

    /// Sets the category to look up.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::UnsupportedIdentifier`] for product
    /// identifiers and SKUs.
    pub fn set_identifier(&mut self, identifier: Identifier) -> Result<(), RetrieverError> {
        CategoryLookup::resolve(&identifier, self.builder.uid_enabled)?;
        self.builder.identifier = Some(identifier);
        Ok(())
    }

    /// Replaces the generated query.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.base.set_query(query);
    }

    /// Adds fields to the category selection.
    pub fn extend_query_with<F>(&mut self, hook: F)
    where
        F: Fn(&mut SelectionExtension<'_>) + Send + Sync + 'static,
    {
        self.builder.category_hooks.push(hook);
    }

    /// Adds fields to every product of the category's product page.
    ///
    /// Selects the product page.
    pub fn extend_product_query_with<F>(&mut self, hook: F)
    where
        F: Fn(&mut SelectionExtension<'_>) + Send + Sync + 'static,
    {
        self.products_mut();
        self.builder.product_hooks.push(hook);
    }

    /// Sets `currentPage` of the product page and selects it.
    pub fn set_current_page(&mut self, current_page: u32) {
        self.products_mut().current_page = Some(current_page);
    }

    /// Sets `pageSize` of the product page and selects it.
    pub fn set_page_size(&mut self, page_size: u32) {
        self.products_mut().page_size = Some(page_size);
    }

    fn products_mut(&mut self) -> &mut ProductPageRequest {
        self.builder.products.get_or_insert_with(ProductPageRequest::default)
    }

    /// Fetches once and returns the category, if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::MissingIdentifier`] when neither an
    /// identifier nor a query is set.
    pub async fn fetch_category(&mut self) -> Result<Option<&Category>, RetrieverError> {
        let builder = &self.builder;
        let category = self
            .base
            .fetch_with(|| builder.build(), |data| builder.parse(data))
            .await?;
        Ok(category.as_ref())
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

impl fmt::Debug for CategoryRetriever {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategoryRetriever")
            .field("base", &self.base)
            .field("identifier", &self.builder.identifier)
            .field("uid_enabled", &self.builder.uid_enabled)
            .field("products", &self.builder.products)
            .finish_non_exhaustive()
    }
}
