//! Several categories in one round trip, one aliased lookup per identifier.

use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;

use serde_json::Value;

use super::base::Retriever;
use super::category::{parse_category, CategoryLookup};
use super::selection;
use crate::clients::{GraphqlErrorEntry, QueryClient};
use crate::config::CommerceConfig;
use crate::error::RetrieverError;
use crate::model::{Category, EntityType, Identifier, IdentifierType};
use crate::query::document::graphql_name;
use crate::query::{Operation, SelectionExtension, SelectionHooks, SelectionSet};

const ALIAS_PREFIX: &str = "category__category_";

/// Derives the response alias of a category lookup.
///
/// ASCII letters and digits are kept; every other byte, `_` included, becomes
/// `_` followed by two hex digits. Distinct values therefore always yield
/// distinct aliases.
pub(crate) fn category_alias(value: &str) -> String {
    let mut alias = String::with_capacity(ALIAS_PREFIX.len() + value.len());
    alias.push_str(ALIAS_PREFIX);
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() {
            alias.push(char::from(byte));
        } else {
            let _ = write!(alias, "_{byte:02x}");
        }
    }
    alias
}

struct CategoriesQueryBuilder {
    values: Vec<String>,
    id_type: IdentifierType,
    uid_enabled: bool,
    category_hooks: SelectionHooks,
}

impl CategoriesQueryBuilder {
    /// One `(alias, identifier)` per distinct value, in request order.
    fn plan(&self) -> Vec<(String, Identifier)> {
        let mut plan: Vec<(String, Identifier)> = Vec::with_capacity(self.values.len());
        for value in &self.values {
            let alias = category_alias(value);
            if plan.iter().any(|(existing, _)| *existing == alias) {
                continue;
            }
            plan.push((alias, Identifier::category(self.id_type, value.as_str())));
        }
        plan
    }

    fn build(&self) -> Result<String, RetrieverError> {
        let mut category = selection::category(self.uid_enabled);
        self.category_hooks.apply(&mut category);

        let plan = self.plan();
        tracing::debug!(
            "Batching {} category lookup(s): {:?}",
            plan.len(),
            plan.iter().map(|(alias, _)| alias).collect::<Vec<_>>()
        );

        let mut root = SelectionSet::new();
        for (alias, identifier) in &plan {
            let lookup = CategoryLookup::resolve(identifier, self.uid_enabled)?;
            root = root.with(lookup.field(category.clone())?.alias(graphql_name(alias)?));
        }
        if root.is_empty() {
            root = root.field("__typename");
        }
        Ok(Operation::query(root).to_string())
    }

    fn parse(&self, data: Option<Value>) -> Result<Vec<Category>, serde_json::Error> {
        let Some(mut data) = data else {
            return Ok(Vec::new());
        };
        let mut categories = Vec::new();
        for (alias, _) in self.plan() {
            let value = data.get_mut(&alias).map(Value::take).unwrap_or(Value::Null);
            match parse_category(value)? {
                Some(category) => categories.push(category),
                None => tracing::debug!("No category returned for alias '{}'", alias),
            }
        }
        Ok(categories)
    }
}

/// Retrieves several categories with a single query.
///
/// Each identifier becomes its own aliased `category` or `categoryList`
/// lookup. Categories come back in request order; identifiers with no match
/// are left out.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use commerce_graphql::{CategoriesRetriever, IdentifierType, QueryClient};
///
/// # async fn run(client: Arc<dyn QueryClient>) -> Result<(), commerce_graphql::RetrieverError> {
/// let mut retriever = CategoriesRetriever::new(Some(client))?;
/// retriever.set_category_id_type(IdentifierType::Id)?;
/// retriever.set_identifiers(["31", "45"]);
///
/// for category in retriever.fetch_categories().await? {
///     println!("{:?}", category.name);
/// }
/// # Ok(())
/// # }
/// ```
pub struct CategoriesRetriever {
    base: Retriever<Vec<Category>>,
    builder: CategoriesQueryBuilder,
}

impl CategoriesRetriever {
    /// Creates a retriever looking up uids on a backend with uid support.
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
    /// Without uid support, identifier values are looked up as legacy ids.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::MissingClient`] if `client` is `None`.
    pub fn from_config(
        client: Option<Arc<dyn QueryClient>>,
        config: &CommerceConfig,
    ) -> Result<Self, RetrieverError> {
        let uid_enabled = config.category_uid_enabled();
        let mut retriever = Self::with_uid_enabled(client, uid_enabled)?;
        if !uid_enabled {
            retriever.builder.id_type = IdentifierType::Id;
        }
        Ok(retriever)
    }

    fn with_uid_enabled(
        client: Option<Arc<dyn QueryClient>>,
        uid_enabled: bool,
    ) -> Result<Self, RetrieverError> {
        Ok(Self {
            base: Retriever::new(client)?,
            builder: CategoriesQueryBuilder {
                values: Vec::new(),
                id_type: IdentifierType::Uid,
                uid_enabled,
                category_hooks: SelectionHooks::new(),
            },
        })
    }

    /// Switches between uid lookups and legacy integer id lookups.
    pub fn set_uid_enabled(&mut self, enabled: bool) {
        self.builder.uid_enabled = enabled;
    }

    /// Sets how the identifier values are interpreted.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::UnsupportedIdentifier`] for
    /// [`IdentifierType::Sku`].
    pub fn set_category_id_type(&mut self, id_type: IdentifierType) -> Result<(), RetrieverError> {
        if id_type == IdentifierType::Sku {
            return Err(RetrieverError::UnsupportedIdentifier {
                entity: EntityType::Category,
                id_type,
            });
        }
        self.builder.id_type = id_type;
        Ok(())
    }

    /// Sets the identifier values to look up.
    pub fn set_identifiers<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.builder.values = values.into_iter().map(Into::into).collect();
    }

    /// Replaces the generated query.
    ///
    /// Results are still read from the aliases derived from the identifiers.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.base.set_query(query);
    }

    /// Adds fields to the selection of every category.
    pub fn extend_query_with<F>(&mut self, hook: F)
    where
        F: Fn(&mut SelectionExtension<'_>) + Send + Sync + 'static,
    {
        self.builder.category_hooks.push(hook);
    }

    /// Returns the alias each identifier value is looked up under.
    #[must_use]
    pub fn aliases(&self) -> Vec<(String, Identifier)> {
        self.builder.plan()
    }

    /// Fetches once and returns the categories found, in request order.
    ///
    /// # Errors
    ///
    /// Never fails once constructed; backend errors are reported through
    /// [`errors`](Self::errors).
    pub async fn fetch_categories(&mut self) -> Result<&[Category], RetrieverError> {
        let builder = &self.builder;
        let categories = self
            .base
            .fetch_with(|| builder.build(), |data| builder.parse(data))
            .await?;
        Ok(categories)
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

impl fmt::Debug for CategoriesRetriever {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategoriesRetriever")
            .field("base", &self.base)
            .field("values", &self.builder.values)
            .field("id_type", &self.builder.id_type)
            .field("uid_enabled", &self.builder.uid_enabled)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::GraphqlResponse;
    use crate::config::EndpointUrl;
    use crate::query::document::compact;
    use crate::retriever::base::testing::{client, MockClient};
    use serde_json::json;

    #[test]
    fn test_alias_encoding_is_injective() {
        assert_eq!(category_alias("31"), "category__category_31");
        assert_eq!(category_alias("MTI="), "category__category_MTI_3d");
        assert_eq!(category_alias("men/tops"), "category__category_men_2ftops");
        assert_ne!(category_alias("a_2f"), category_alias("a/"));
        assert_ne!(category_alias("a-b"), category_alias("a_b"));
    }

    #[tokio::test]
    async fn test_legacy_ids_batch_into_one_document() {
        let mock = MockClient::with_data(json!({
            "category__category_31": {"id": 31, "name": "Tops"},
            "category__category_45": {"id": 45, "name": "Bottoms"}
        }));
        let mut retriever = CategoriesRetriever::new(client(&mock)).unwrap();
        retriever.set_uid_enabled(false);
        retriever.set_category_id_type(IdentifierType::Id).unwrap();
        retriever.set_identifiers(["31", "45"]);

        let names: Vec<_> = retriever
            .fetch_categories()
            .await
            .unwrap()
            .iter()
            .filter_map(|c| c.name.clone())
            .collect();
        assert_eq!(names, ["Tops", "Bottoms"]);
        assert_eq!(mock.calls(), 1);
        assert_eq!(
            compact(&mock.last_query().unwrap()),
            compact(
                "{category__category_31:category(id:31){id name url_key url_path description image} \
                 category__category_45:category(id:45){id name url_key url_path description image}}"
            )
        );
    }

    #[tokio::test]
    async fn test_uid_lookups_use_category_list_and_skip_missing() {
        let mock = MockClient::with_data(json!({
            "category__category_MTI_3d": [{"uid": "MTI=", "name": "Tops", "meta_title": "T"}],
            "category__category_MTM_3d": [],
            "category__category_MTQ_3d": null
        }));
        let mut retriever = CategoriesRetriever::new(client(&mock)).unwrap();
        retriever.set_identifiers(["MTI=", "MTM=", "MTQ=", "MTI="]);
        retriever.extend_query_with(|category| {
            category.add_field("meta_title");
        });

        let categories = retriever.fetch_categories().await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].extra["meta_title"], "T");

        let query = compact(&mock.last_query().unwrap());
        assert!(query.starts_with(&compact(
            r#"{category__category_MTI_3d:categoryList(filters:{category_uid:{eq:"MTI="}}){uid name url_key url_path description image meta_title}"#
        )));
        assert_eq!(query.matches("categoryList").count(), 3);
        assert_eq!(retriever.aliases().len(), 3);
    }

    #[tokio::test]
    async fn test_backend_errors_leave_no_categories() {
        let mock = MockClient::new(GraphqlResponse::from_error("Category not found"));
        let mut retriever = CategoriesRetriever::new(client(&mock)).unwrap();
        retriever.set_identifiers(["MTI="]);

        assert!(retriever.fetch_categories().await.unwrap().is_empty());
        assert_eq!(retriever.has_errors(), Ok(true));
        assert_eq!(retriever.errors().unwrap()[0].message, "Category not found");
    }

    #[test]
    fn test_sku_id_type_is_rejected() {
        let mock = MockClient::with_data(json!({}));
        let mut retriever = CategoriesRetriever::new(client(&mock)).unwrap();

        assert!(matches!(
            retriever.set_category_id_type(IdentifierType::Sku),
            Err(RetrieverError::UnsupportedIdentifier { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_identifier_list_still_fetches_once() {
        let mock = MockClient::with_data(json!({}));
        let mut retriever = CategoriesRetriever::new(client(&mock)).unwrap();

        assert!(retriever.fetch_categories().await.unwrap().is_empty());
        assert!(retriever.fetch_categories().await.unwrap().is_empty());
        assert_eq!(mock.calls(), 1);
        assert_eq!(compact(&mock.last_query().unwrap()), "{__typename}");
    }

    #[tokio::test]
    async fn test_config_without_uid_support_batches_legacy_ids() {
        let config = CommerceConfig::builder()
            .endpoint(EndpointUrl::new("https://shop.example.com/graphql").unwrap())
            .category_uid_enabled(false)
            .build()
            .unwrap();
        let mock = MockClient::with_data(json!({
            "category__category_31": {"id": 31, "name": "Tops"}
        }));
        let mut retriever = CategoriesRetriever::from_config(client(&mock), &config).unwrap();
        retriever.set_identifiers(["31"]);

        assert_eq!(retriever.fetch_categories().await.unwrap().len(), 1);
        assert!(compact(&mock.last_query().unwrap())
            .starts_with("{category__category_31:category(id:31){idname"));
    }
}
