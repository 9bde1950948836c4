//! Base selections the retrievers start from before hooks run.

use crate::query::{SelectionHooks, SelectionSet};

fn money() -> SelectionSet {
    SelectionSet::new().fields(&["value", "currency"])
}

fn product_price() -> SelectionSet {
    SelectionSet::new()
        .nested("regular_price", money())
        .nested("final_price", money())
        .nested(
            "discount",
            SelectionSet::new().fields(&["amount_off", "percent_off"]),
        )
}

fn image() -> SelectionSet {
    SelectionSet::new().fields(&["url", "label"])
}

fn minimum_price_range() -> SelectionSet {
    SelectionSet::new().nested("minimum_price", product_price())
}

fn maximum_price_range() -> SelectionSet {
    SelectionSet::new().nested("maximum_price", product_price())
}

/// Fields shown wherever a product is listed.
pub(crate) fn product_summary() -> SelectionSet {
    SelectionSet::new()
        .fields(&["__typename", "uid", "sku", "name", "url_key", "stock_status"])
        .nested("small_image", image())
        .nested("price_range", minimum_price_range())
        .on(
            "ConfigurableProduct",
            SelectionSet::new().nested("price_range", maximum_price_range()),
        )
        .on(
            "BundleProduct",
            SelectionSet::new().nested("price_range", maximum_price_range()),
        )
}

/// The simple product behind a variant, extended by `variant_hooks`.
pub(crate) fn variant_product(variant_hooks: &SelectionHooks) -> SelectionSet {
    let mut selection = SelectionSet::new()
        .fields(&["__typename", "uid", "sku", "name", "stock_status"])
        .nested("small_image", image())
        .nested("price_range", minimum_price_range());
    variant_hooks.apply(&mut selection);
    selection
}

/// Fields of a product detail page.
pub(crate) fn product_detail(variant_hooks: &SelectionHooks) -> SelectionSet {
    let configurable = SelectionSet::new()
        .nested(
            "configurable_options",
            SelectionSet::new().fields(&["attribute_code", "label"]).nested(
                "values",
                SelectionSet::new().fields(&["value_index", "label"]),
            ),
        )
        .nested(
            "variants",
            SelectionSet::new()
                .nested(
                    "attributes",
                    SelectionSet::new().fields(&["code", "value_index", "label"]),
                )
                .nested("product", variant_product(variant_hooks)),
        );

    product_summary()
        .nested("description", SelectionSet::new().field("html"))
        .nested("media_gallery", image())
        .on("ConfigurableProduct", configurable)
}

/// Category fields; `uid` or the legacy `id` depending on backend support.
pub(crate) fn category(uid_enabled: bool) -> SelectionSet {
    SelectionSet::new()
        .field(if uid_enabled { "uid" } else { "id" })
        .fields(&["name", "url_key", "url_path", "description", "image"])
}

/// `aggregations { ... }` of a product search.
pub(crate) fn aggregations() -> SelectionSet {
    SelectionSet::new()
        .fields(&["attribute_code", "label", "count"])
        .nested(
            "options",
            SelectionSet::new().fields(&["label", "value", "count"]),
        )
}
