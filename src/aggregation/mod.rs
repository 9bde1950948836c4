//! Facet aggregations and their conversion into display-ready filters.
//!
//! The backend returns [`Aggregation`] buckets alongside a product search.
//! [`convert_aggregations`] combines them with the filter attribute metadata
//! and the filters currently applied to the page, producing one
//! [`SearchAggregation`] per bucket with ready-made "add" and "remove" filter
//! maps for every option.
//!
//! # Example
//!
//! ```rust
//! use commerce_graphql::aggregation::{
//!     convert_aggregations, Aggregation, AggregationOption, FilterAttributeMetadata,
//!     FilterParameters,
//! };
//!
//! let aggregation = Aggregation {
//!     attribute_code: "new".to_string(),
//!     label: Some("New".to_string()),
//!     count: Some(2),
//!     options: vec![
//!         AggregationOption { label: Some("0".to_string()), value: "0".to_string(), count: Some(5) },
//!         AggregationOption { label: Some("1".to_string()), value: "1".to_string(), count: Some(3) },
//!     ],
//! };
//! let metadata = FilterAttributeMetadata {
//!     attribute_code: "new".to_string(),
//!     filter_input_type: Some("FilterEqualTypeInput".to_string()),
//!     attribute_type: Some("Int".to_string()),
//!     attribute_input_type: Some("boolean".to_string()),
//! };
//!
//! let converted = convert_aggregations(&[aggregation], &FilterParameters::new(), &[metadata]);
//! assert_eq!(converted[0].options[0].display_label, "No");
//! assert_eq!(converted[0].options[1].display_label, "Yes");
//! ```

mod parameters;

pub use parameters::{FilterParameters, PAGE_PARAMETER};

use serde::Deserialize;

use crate::model::null_as_empty;

/// One bucket of a facet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct AggregationOption {
    /// Backend label; boolean attributes are relabeled by `value` instead.
    pub label: Option<String>,
    /// Filter value selecting this bucket.
    pub value: String,
    /// Number of matching products.
    pub count: Option<i64>,
}

/// A facet returned with a product search.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Aggregation {
    /// Attribute the facet groups by.
    pub attribute_code: String,
    /// Display label.
    pub label: Option<String>,
    /// Number of buckets.
    pub count: Option<i64>,
    /// The buckets.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub options: Vec<AggregationOption>,
}

/// How an attribute can be filtered.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct FilterAttributeMetadata {
    /// Attribute code.
    pub attribute_code: String,
    /// `FilterEqualTypeInput`, `FilterMatchTypeInput` or `FilterRangeTypeInput`.
    pub filter_input_type: Option<String>,
    /// Backend data type, e.g. `Int`.
    pub attribute_type: Option<String>,
    /// Admin input type, e.g. `boolean` or `select`.
    pub attribute_input_type: Option<String>,
}

impl FilterAttributeMetadata {
    /// Returns `true` for yes/no attributes.
    #[must_use]
    pub fn is_boolean(&self) -> bool {
        self.attribute_input_type.as_deref() == Some("boolean")
    }
}

/// A display-ready facet option.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchAggregationOption {
    /// Value to filter by.
    pub filter_value: String,
    /// Label to show.
    pub display_label: String,
    /// Number of matching products.
    pub count: i64,
    /// Current filters plus this option, without the page parameter.
    pub add_filter_map: FilterParameters,
}

/// A display-ready facet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchAggregation {
    /// Attribute code.
    pub identifier: String,
    /// Label to show.
    pub display_label: String,
    /// Whether metadata exists for the attribute.
    pub filterable: bool,
    /// Value currently applied for this attribute.
    pub applied_filter_value: Option<String>,
    /// Label of the applied value.
    pub applied_filter_display_label: Option<String>,
    /// Current filters minus this attribute.
    pub remove_filter_map: FilterParameters,
    /// Options in backend order.
    pub options: Vec<SearchAggregationOption>,
}

/// Converts every aggregation; see the module documentation.
#[must_use]
pub fn convert_aggregations(
    aggregations: &[Aggregation],
    filters: &FilterParameters,
    metadata: &[FilterAttributeMetadata],
) -> Vec<SearchAggregation> {
    aggregations
        .iter()
        .map(|aggregation| {
            let attribute = metadata
                .iter()
                .find(|m| m.attribute_code == aggregation.attribute_code);
            convert(aggregation, filters, attribute)
        })
        .collect()
}

fn convert(
    aggregation: &Aggregation,
    filters: &FilterParameters,
    attribute: Option<&FilterAttributeMetadata>,
) -> SearchAggregation {
    let code = aggregation.attribute_code.as_str();
    let boolean = attribute.is_some_and(FilterAttributeMetadata::is_boolean);

    let options: Vec<SearchAggregationOption> = aggregation
        .options
        .iter()
        .map(|option| {
            let mut add_filter_map = filters.clone().with(code, option.value.as_str());
            add_filter_map.remove(PAGE_PARAMETER);
            SearchAggregationOption {
                filter_value: option.value.clone(),
                display_label: option_label(option, boolean),
                count: option.count.unwrap_or(0),
                add_filter_map,
            }
        })
        .collect();

    let mut remove_filter_map = filters.clone();
    remove_filter_map.remove(code);

    let applied_filter_value = filters.get(code).map(str::to_string);
    let applied_filter_display_label = applied_filter_value
        .as_deref()
        .map(|value| applied_label(code, value, &options));

    SearchAggregation {
        identifier: aggregation.attribute_code.clone(),
        display_label: aggregation.label.clone().unwrap_or_else(|| code.to_string()),
        filterable: attribute.is_some(),
        applied_filter_value,
        applied_filter_display_label,
        remove_filter_map,
        options,
    }
}

fn option_label(option: &AggregationOption, boolean: bool) -> String {
    if boolean {
        match option.value.as_str() {
            "0" => return "No".to_string(),
            "1" => return "Yes".to_string(),
            _ => {}
        }
    }
    option.label.as_deref().unwrap_or(&option.value).to_string()
}

fn applied_label(code: &str, value: &str, options: &[SearchAggregationOption]) -> String {
    if let Some(option) = options.iter().find(|o| o.filter_value == value) {
        return option.display_label.clone();
    }
    if code == "price" {
        let normalized = value.replace('_', "-");
        return options
            .iter()
            .find(|o| o.display_label == normalized)
            .map_or(normalized, |o| o.display_label.clone());
    }
    value.to_string()
}
