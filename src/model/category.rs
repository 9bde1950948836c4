//! Category entities (`CategoryTree`).

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{null_as_empty, Product};

/// A page of products assigned to a category.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct CategoryProducts {
    /// Number of products across all pages.
    pub total_count: Option<i64>,
    /// Products of the requested page.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<Product>,
}

/// A catalog category.
///
/// Which of `uid` and `id` is populated depends on whether the retriever
/// selects uids or legacy ids.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Category {
    /// Opaque id.
    pub uid: Option<String>,
    /// Legacy integer id.
    pub id: Option<i64>,
    /// Display name.
    pub name: Option<String>,
    /// URL key.
    pub url_key: Option<String>,
    /// Full URL path.
    pub url_path: Option<String>,
    /// HTML description.
    pub description: Option<String>,
    /// Image URL.
    pub image: Option<String>,
    /// Products of the category, when selected.
    pub products: Option<CategoryProducts>,
    /// Every other selected field, keyed by response key.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_with_products_page() {
        let category: Category = serde_json::from_value(json!({
            "uid": "MTI=",
            "name": "Tops",
            "url_path": "men/tops",
            "meta_title": "Men's Tops",
            "products": {
                "total_count": 2,
                "items": [{"sku": "MH01"}, {"sku": "MH02"}]
            }
        }))
        .unwrap();

        assert_eq!(category.uid.as_deref(), Some("MTI="));
        assert!(category.id.is_none());
        let products = category.products.unwrap();
        assert_eq!(products.total_count, Some(2));
        assert_eq!(products.items[1].sku.as_deref(), Some("MH02"));
        assert_eq!(category.extra["meta_title"], "Men's Tops");
    }

    #[test]
    fn test_legacy_category_with_null_items() {
        let category: Category = serde_json::from_value(json!({
            "id": 12,
            "name": "Tops",
            "products": {"total_count": 0, "items": null}
        }))
        .unwrap();

        assert_eq!(category.id, Some(12));
        assert!(category.products.unwrap().items.is_empty());
    }
}
