//! Attribute filter inputs (`ProductAttributeFilterInput`, `CategoryFilterInput`).

use std::collections::BTreeMap;

use apollo_compiler::ast::Value;
use apollo_compiler::{name, Node};

use super::document::graphql_name;
use crate::error::RetrieverError;

/// A single attribute predicate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterCondition {
    /// `{eq: "value"}`
    Eq(String),
    /// `{in: ["a", "b"]}`
    In(Vec<String>),
    /// `{match: "text"}`
    Match(String),
    /// `{from: "10", to: "20"}`; either bound may be open.
    Range {
        /// Lower bound.
        from: Option<String>,
        /// Upper bound.
        to: Option<String>,
    },
}

impl FilterCondition {
    /// Returns the condition as an input object literal.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let string = |value: &str| Node::new(Value::String(value.to_string()));
        let entries = match self {
            Self::Eq(value) => vec![(name!("eq"), string(value))],
            Self::In(values) => vec![(
                name!("in"),
                Node::new(Value::List(values.iter().map(|v| string(v)).collect())),
            )],
            Self::Match(value) => vec![(name!("match"), string(value))],
            Self::Range { from, to } => {
                let mut entries = Vec::new();
                if let Some(from) = from {
                    entries.push((name!("from"), string(from)));
                }
                if let Some(to) = to {
                    entries.push((name!("to"), string(to)));
                }
                entries
            }
        };
        Value::Object(entries)
    }
}

/// A filter predicate over entity attributes.
///
/// Attributes render in name order, so equal filters always produce the same
/// query text.
///
/// # Example
///
/// ```rust
/// use commerce_graphql::query::{FilterCondition, FilterInput};
///
/// # fn main() -> Result<(), commerce_graphql::RetrieverError> {
/// let filter = FilterInput::one_of("sku", ["24-MG01", "24-MG02"])
///     .with("category_uid", FilterCondition::Eq("MTI=".to_string()));
///
/// let rendered: String = filter
///     .to_value()?
///     .to_string()
///     .chars()
///     .filter(|c| !c.is_whitespace() && *c != ',')
///     .collect();
/// assert_eq!(rendered, r#"{category_uid:{eq:"MTI="}sku:{in:["24-MG01""24-MG02"]}}"#);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterInput {
    conditions: BTreeMap<String, FilterCondition>,
}

impl FilterInput {
    /// Creates an empty filter.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            conditions: BTreeMap::new(),
        }
    }

    /// Creates a filter with a single `eq` predicate.
    #[must_use]
    pub fn equals(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new().with(attribute, FilterCondition::Eq(value.into()))
    }

    /// Creates a filter with a single `in` predicate.
    #[must_use]
    pub fn one_of<I, S>(attribute: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new().with(
            attribute,
            FilterCondition::In(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Sets the predicate for `attribute`, replacing any previous one.
    #[must_use]
    pub fn with(mut self, attribute: impl Into<String>, condition: FilterCondition) -> Self {
        self.conditions.insert(attribute.into(), condition);
        self
    }

    /// Sets the predicate for `attribute`, returning the previous one.
    pub fn insert(
        &mut self,
        attribute: impl Into<String>,
        condition: FilterCondition,
    ) -> Option<FilterCondition> {
        self.conditions.insert(attribute.into(), condition)
    }

    /// Removes the predicate for `attribute`.
    pub fn remove(&mut self, attribute: &str) -> Option<FilterCondition> {
        self.conditions.remove(attribute)
    }

    /// Returns the predicate for `attribute`.
    #[must_use]
    pub fn get(&self, attribute: &str) -> Option<&FilterCondition> {
        self.conditions.get(attribute)
    }

    /// Returns `true` if no predicate is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Iterates predicates in attribute order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterCondition)> {
        self.conditions.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Adds every predicate of `other`; `other` wins on shared attributes.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.conditions.extend(other.conditions);
        self
    }

    /// Returns the filter as an input object literal.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::InvalidName`] if an attribute is not a valid
    /// GraphQL name.
    pub fn to_value(&self) -> Result<Value, RetrieverError> {
        let entries = self
            .conditions
            .iter()
            .map(|(attribute, condition)| {
                Ok((graphql_name(attribute)?, Node::new(condition.to_value())))
            })
            .collect::<Result<Vec<_>, RetrieverError>>()?;
        Ok(Value::Object(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::document::compact;

    fn render(filter: &FilterInput) -> String {
        compact(&filter.to_value().unwrap().to_string())
    }

    #[test]
    fn test_conditions_render() {
        let filter = FilterInput::new()
            .with("name", FilterCondition::Match("mug".to_string()))
            .with(
                "price",
                FilterCondition::Range {
                    from: Some("10".to_string()),
                    to: None,
                },
            )
            .with("sku", FilterCondition::Eq("24-MG01".to_string()));

        assert_eq!(
            render(&filter),
            r#"{name:{match:"mug"}price:{from:"10"}sku:{eq:"24-MG01"}}"#
        );
    }

    #[test]
    fn test_merge_prefers_incoming_predicates() {
        let base = FilterInput::one_of("sku", ["a"]).with(
            "category_uid",
            FilterCondition::Eq("MTI=".to_string()),
        );
        let merged = base.merge(FilterInput::equals("sku", "b"));

        assert_eq!(merged.get("sku"), Some(&FilterCondition::Eq("b".to_string())));
        assert!(merged.get("category_uid").is_some());
    }

    #[test]
    fn test_insert_and_remove() {
        let mut filter = FilterInput::new();
        assert!(filter.is_empty());

        assert!(filter
            .insert("url_key", FilterCondition::Eq("mug".to_string()))
            .is_none());
        assert_eq!(filter.iter().count(), 1);

        assert!(filter.remove("url_key").is_some());
        assert!(filter.is_empty());
    }

    #[test]
    fn test_empty_in_list_renders() {
        let filter = FilterInput::one_of("sku", Vec::<String>::new());
        assert_eq!(render(&filter), "{sku:{in:[]}}");
    }

    #[test]
    fn test_invalid_attribute_is_rejected() {
        let filter = FilterInput::equals("category-uid", "MTI=");
        assert_eq!(
            filter.to_value(),
            Err(RetrieverError::InvalidName {
                name: "category-uid".to_string()
            })
        );
    }
}
