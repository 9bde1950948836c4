//! Lazily fetching, memoizing entity retrievers.
//!
//! Every retriever wraps a [`Retriever`] and a query builder for its entity
//! shape. Call sites configure identifiers and register hooks, then await a
//! `fetch_*` accessor. The first accessor builds and executes the query; every
//! later accessor returns the stored result.
//!
//! | Retriever                    | Looks up                                   |
//! |------------------------------|--------------------------------------------|
//! | [`ProductRetriever`]         | one product by SKU or URL key              |
//! | [`ProductsRetriever`]        | a list of products, with filter hooks      |
//! | [`RelatedProductsRetriever`] | a relation list of a base product          |
//! | [`CategoryRetriever`]        | one category, optionally with its products |
//! | [`CategoriesRetriever`]      | several categories in one aliased query    |

mod base;
mod categories;
mod category;
mod product;
mod products;
mod related;
mod selection;

pub use base::Retriever;
pub use categories::CategoriesRetriever;
pub use category::CategoryRetriever;
pub use product::ProductRetriever;
pub use products::ProductsRetriever;
pub use related::{RelatedProductsRetriever, RelationType};

// Retrievers hold only boxed `Send + Sync` hooks and an `Arc<dyn QueryClient>`
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ProductRetriever>();
    assert_send_sync::<ProductsRetriever>();
    assert_send_sync::<RelatedProductsRetriever>();
    assert_send_sync::<CategoryRetriever>();
    assert_send_sync::<CategoriesRetriever>();
};
