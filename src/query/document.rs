//! GraphQL documents built on the `apollo-compiler` AST.
//!
//! [`Field`], [`SelectionSet`] and [`Operation`] wrap `apollo_compiler::ast`
//! nodes and print through its serializer. What this module adds is the merge
//! layer: selections only ever grow, and two selections of the same response
//! key merge instead of duplicating or replacing each other.
//!
//! ```rust
//! use commerce_graphql::query::{Field, Name, Operation, SelectionSet, Value};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let items = SelectionSet::new().field("sku").field("name");
//! let products = Field::new(Name::new("products")?)
//!     .argument(Name::new("search")?, Value::String("mug".to_string()))
//!     .with_selection(SelectionSet::new().nested("items", items));
//!
//! let operation = Operation::query(SelectionSet::new().with(products));
//! let rendered: String = operation.to_string().split_whitespace().collect();
//! assert_eq!(rendered, r#"{products(search:"mug"){items{skuname}}}"#);
//! # Ok(())
//! # }
//! ```
//!
//! A field is dropped when its response key is already taken, anywhere in the
//! enclosing selection including its inline fragments, by a different schema
//! field or by the same field with different arguments. Such a document would
//! fail validation on the backend.

use std::fmt;

use apollo_compiler::ast;
use apollo_compiler::{Name, Node};

use crate::error::RetrieverError;

/// Validates a GraphQL name used in generated documents.
pub(crate) fn graphql_name(value: &str) -> Result<Name, RetrieverError> {
    Name::new(value).map_err(|_| RetrieverError::InvalidName {
        name: value.to_string(),
    })
}

/// Converts a page argument to a GraphQL `Int`, saturating at `i32::MAX`.
pub(crate) fn int_value(value: u32) -> ast::Value {
    ast::Value::Int(i32::try_from(value).unwrap_or(i32::MAX).into())
}

/// Like [`graphql_name`], for the string conveniences that cannot fail.
fn checked_name(value: &str) -> Option<Name> {
    let name = Name::new(value).ok();
    if name.is_none() {
        tracing::warn!("Skipping selection of invalid GraphQL name '{}'", value);
    }
    name
}

fn key_of(field: &ast::Field) -> &Name {
    field.alias.as_ref().unwrap_or(&field.name)
}

fn same_field(a: &ast::Field, b: &ast::Field) -> bool {
    a.name == b.name && a.arguments == b.arguments
}

/// Collects the fields selected under `key`, looking through inline fragments.
fn fields_for_key<'s>(scope: &'s [ast::Selection], key: &str, out: &mut Vec<&'s ast::Field>) {
    for item in scope {
        match item {
            ast::Selection::Field(field) if key_of(field).as_str() == key => {
                out.push(&**field);
            }
            ast::Selection::InlineFragment(fragment) => {
                fields_for_key(&fragment.selection_set, key, out);
            }
            _ => {}
        }
    }
}

fn prune(scope: &[ast::Selection], incoming: Vec<ast::Selection>) -> Vec<ast::Selection> {
    incoming
        .into_iter()
        .filter_map(|item| prune_selection(scope, item))
        .collect()
}

/// Removes what `item` selects under response keys that `scope` already uses
/// for something else.
///
/// Returns `None` when `item` itself clashes, or when it had a sub-selection
/// and nothing of it survives.
fn prune_selection(scope: &[ast::Selection], mut item: ast::Selection) -> Option<ast::Selection> {
    let emptied = match &mut item {
        ast::Selection::Field(field) => {
            let incoming: &ast::Field = field;
            let mut existing = Vec::new();
            fields_for_key(scope, key_of(incoming).as_str(), &mut existing);
            if let Some(taken) = existing.iter().find(|other| !same_field(other, incoming)) {
                tracing::debug!(
                    "Ignoring selection of '{}' under response key '{}' already used by '{}'",
                    incoming.name,
                    key_of(incoming),
                    taken.name
                );
                return None;
            }
            if existing.is_empty() || incoming.selection_set.is_empty() {
                return Some(item);
            }
            let nested_scope: Vec<ast::Selection> = existing
                .iter()
                .flat_map(|other| other.selection_set.iter().cloned())
                .collect();
            let field = field.make_mut();
            field.selection_set = prune(&nested_scope, std::mem::take(&mut field.selection_set));
            field.selection_set.is_empty()
        }
        ast::Selection::InlineFragment(fragment) => {
            let fragment = fragment.make_mut();
            fragment.selection_set = prune(scope, std::mem::take(&mut fragment.selection_set));
            fragment.selection_set.is_empty()
        }
        ast::Selection::FragmentSpread(_) => false,
    };
    if emptied {
        None
    } else {
        Some(item)
    }
}

/// Adds `item` to `target`, merging by response key and type condition.
fn merge_into(target: &mut Vec<ast::Selection>, item: ast::Selection) {
    let Some(item) = prune_selection(target, item) else {
        return;
    };
    match item {
        ast::Selection::Field(mut field) => {
            let existing = target.iter_mut().find_map(|selected| match selected {
                ast::Selection::Field(selected) if key_of(selected) == key_of(&field) => {
                    Some(selected)
                }
                _ => None,
            });
            match existing {
                Some(existing) => {
                    let incoming = std::mem::take(&mut field.make_mut().selection_set);
                    let existing = existing.make_mut();
                    for selection in incoming {
                        merge_into(&mut existing.selection_set, selection);
                    }
                }
                None => target.push(ast::Selection::Field(field)),
            }
        }
        ast::Selection::InlineFragment(mut fragment) => {
            let existing = target.iter_mut().find_map(|selected| match selected {
                ast::Selection::InlineFragment(selected)
                    if selected.type_condition == fragment.type_condition
                        && selected.directives == fragment.directives =>
                {
                    Some(selected)
                }
                _ => None,
            });
            match existing {
                Some(existing) => {
                    let incoming = std::mem::take(&mut fragment.make_mut().selection_set);
                    let existing = existing.make_mut();
                    for selection in incoming {
                        merge_into(&mut existing.selection_set, selection);
                    }
                }
                None => target.push(ast::Selection::InlineFragment(fragment)),
            }
        }
        spread @ ast::Selection::FragmentSpread(_) => {
            if !target.contains(&spread) {
                target.push(spread);
            }
        }
    }
}

/// A field selection, optionally aliased, with arguments and a sub-selection.
#[derive(Clone, Debug, PartialEq)]
pub struct Field(ast::Field);

impl Field {
    /// Creates a field with no alias, arguments or sub-selection.
    #[must_use]
    pub fn new(name: Name) -> Self {
        Self(ast::Field {
            alias: None,
            name,
            arguments: Vec::new(),
            directives: ast::DirectiveList(Vec::new()),
            selection_set: Vec::new(),
        })
    }

    /// Sets the response alias.
    #[must_use]
    pub fn alias(mut self, alias: Name) -> Self {
        self.0.alias = Some(alias);
        self
    }

    /// Appends an argument.
    #[must_use]
    pub fn argument(mut self, name: Name, value: ast::Value) -> Self {
        self.0.arguments.push(Node::new(ast::Argument {
            name,
            value: Node::new(value),
        }));
        self
    }

    /// Sets the sub-selection.
    #[must_use]
    pub fn with_selection(mut self, selection: SelectionSet) -> Self {
        self.0.selection_set = selection.items;
        self
    }

    /// Returns the schema field name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.name.as_str()
    }

    /// Returns the key this field appears under in the response.
    #[must_use]
    pub fn response_key(&self) -> &str {
        key_of(&self.0).as_str()
    }

    /// Returns a copy of the sub-selection.
    #[must_use]
    pub fn selection(&self) -> SelectionSet {
        SelectionSet {
            items: self.0.selection_set.clone(),
        }
    }

    /// Returns the underlying AST node.
    #[must_use]
    pub const fn as_ast(&self) -> &ast::Field {
        &self.0
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.serialize().no_indent())
    }
}

/// An ordered, merge-on-insert set of selections.
///
/// The `&str` conveniences skip names that are not valid GraphQL names and
/// log a warning; use [`with`](Self::with) with a [`Field`] to validate names
/// up front.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionSet {
    items: Vec<ast::Selection>,
}

impl SelectionSet {
    /// Creates an empty selection set.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Adds a leaf field.
    #[must_use]
    pub fn field(mut self, name: &str) -> Self {
        if let Some(name) = checked_name(name) {
            self.merge_field(Field::new(name));
        }
        self
    }

    /// Adds several leaf fields.
    #[must_use]
    pub fn fields(self, names: &[&str]) -> Self {
        names.iter().fold(self, |selection, name| selection.field(name))
    }

    /// Adds a field with a sub-selection.
    #[must_use]
    pub fn nested(mut self, name: &str, selection: Self) -> Self {
        if let Some(name) = checked_name(name) {
            self.merge_field(Field::new(name).with_selection(selection));
        }
        self
    }

    /// Adds a fully built field.
    #[must_use]
    pub fn with(mut self, field: Field) -> Self {
        self.merge_field(field);
        self
    }

    /// Adds an inline fragment.
    #[must_use]
    pub fn on(mut self, type_condition: &str, selection: Self) -> Self {
        if let Some(type_condition) = checked_name(type_condition) {
            self.merge_fragment(type_condition, selection);
        }
        self
    }

    /// Returns `true` if nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the selections in order.
    #[must_use]
    pub fn items(&self) -> &[ast::Selection] {
        &self.items
    }

    /// Returns the field selected under `response_key` at this level.
    #[must_use]
    pub fn get(&self, response_key: &str) -> Option<Field> {
        self.items.iter().find_map(|item| match item {
            ast::Selection::Field(field) if key_of(field).as_str() == response_key => {
                Some(Field((**field).clone()))
            }
            _ => None,
        })
    }

    /// Returns `true` if a field is selected under `response_key` at this level.
    #[must_use]
    pub fn contains(&self, response_key: &str) -> bool {
        self.get(response_key).is_some()
    }

    /// Returns a copy of the inline fragment for `type_condition`, if any.
    #[must_use]
    pub fn fragment(&self, type_condition: &str) -> Option<Self> {
        self.items.iter().find_map(|item| match item {
            ast::Selection::InlineFragment(fragment)
                if fragment
                    .type_condition
                    .as_ref()
                    .is_some_and(|condition| condition.as_str() == type_condition) =>
            {
                Some(Self {
                    items: fragment.selection_set.clone(),
                })
            }
            _ => None,
        })
    }

    fn get_mut(&mut self, response_key: &str) -> Option<&mut ast::Field> {
        self.items.iter_mut().find_map(|item| match item {
            ast::Selection::Field(field) if key_of(field).as_str() == response_key => {
                Some(field.make_mut())
            }
            _ => None,
        })
    }

    /// Adds `field`, merging into an existing field with the same response key.
    pub(crate) fn merge_field(&mut self, field: Field) {
        merge_into(&mut self.items, ast::Selection::Field(Node::new(field.0)));
    }

    pub(crate) fn merge_fragment(&mut self, type_condition: Name, selection: Self) {
        let fragment = ast::InlineFragment {
            type_condition: Some(type_condition),
            directives: ast::DirectiveList(Vec::new()),
            selection_set: selection.items,
        };
        merge_into(&mut self.items, ast::Selection::InlineFragment(Node::new(fragment)));
    }

    /// Merges every selection of `other` into `self`.
    pub(crate) fn merge(&mut self, other: Self) {
        for item in other.items {
            merge_into(&mut self.items, item);
        }
    }
}

impl fmt::Display for SelectionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Operation::query(self.clone()), f)
    }
}

/// Append-only view of a selection set handed to selection hooks.
///
/// Hooks can add fields, nested fields and fragments, and extend nested
/// selections that already exist. Nothing can be removed or renamed, and
/// additions that reuse a taken response key are dropped.
///
/// # Example
///
/// ```rust
/// use commerce_graphql::query::{SelectionExtension, SelectionSet};
///
/// let mut selection = SelectionSet::new().field("sku");
/// SelectionExtension::new(&mut selection)
///     .add_field("meta_title")
///     .add_field("sku");
///
/// assert!(selection.contains("meta_title"));
/// assert_eq!(selection.items().len(), 2);
/// ```
#[derive(Debug)]
pub struct SelectionExtension<'a> {
    selection: &'a mut SelectionSet,
}

impl<'a> SelectionExtension<'a> {
    /// Wraps a selection set.
    pub fn new(selection: &'a mut SelectionSet) -> Self {
        Self { selection }
    }

    /// Adds a leaf field.
    pub fn add_field(&mut self, name: &str) -> &mut Self {
        if let Some(name) = checked_name(name) {
            self.selection.merge_field(Field::new(name));
        }
        self
    }

    /// Adds several leaf fields.
    pub fn add_fields(&mut self, names: &[&str]) -> &mut Self {
        for name in names {
            self.add_field(name);
        }
        self
    }

    /// Adds a field with a sub-selection.
    pub fn add_nested(&mut self, name: &str, selection: SelectionSet) -> &mut Self {
        if let Some(name) = checked_name(name) {
            self.selection
                .merge_field(Field::new(name).with_selection(selection));
        }
        self
    }

    /// Adds a fully built field (aliases and arguments allowed).
    pub fn add(&mut self, field: Field) -> &mut Self {
        self.selection.merge_field(field);
        self
    }

    /// Adds an inline fragment.
    pub fn add_fragment(&mut self, type_condition: &str, selection: SelectionSet) -> &mut Self {
        if let Some(type_condition) = checked_name(type_condition) {
            self.selection.merge_fragment(type_condition, selection);
        }
        self
    }

    /// Extends the sub-selection of an already selected field.
    ///
    /// Does nothing when `response_key` is not selected.
    pub fn extend(
        &mut self,
        response_key: &str,
        extend: impl FnOnce(&mut SelectionExtension<'_>),
    ) -> &mut Self {
        if let Some(field) = self.selection.get_mut(response_key) {
            let mut nested = SelectionSet {
                items: std::mem::take(&mut field.selection_set),
            };
            extend(&mut SelectionExtension::new(&mut nested));
            field.selection_set = nested.items;
        }
        self
    }
}

/// A complete query operation.
#[derive(Clone, Debug, PartialEq)]
pub struct Operation(ast::OperationDefinition);

impl Operation {
    /// Creates an anonymous query; it prints in shorthand form.
    #[must_use]
    pub fn query(selection: SelectionSet) -> Self {
        Self(ast::OperationDefinition {
            operation_type: ast::OperationType::Query,
            name: None,
            variables: Vec::new(),
            directives: ast::DirectiveList(Vec::new()),
            selection_set: selection.items,
        })
    }

    /// Names the operation.
    #[must_use]
    pub fn named(mut self, name: Name) -> Self {
        self.0.name = Some(name);
        self
    }

    /// Returns the root selections.
    #[must_use]
    pub fn selection(&self) -> &[ast::Selection] {
        &self.0.selection_set
    }

    /// Returns the underlying AST node.
    #[must_use]
    pub const fn as_ast(&self) -> &ast::OperationDefinition {
        &self.0
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.serialize().no_indent())
    }
}

/// Strips insignificant whitespace and commas so rendered documents compare
/// independently of printer layout.
#[cfg(test)]
pub(crate) fn compact(document: &str) -> String {
    document
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use apollo_compiler::name;

    #[test]
    fn test_field_renders_alias_arguments_and_selection() {
        let field = Field::new(name!("category"))
            .alias(name!("category__category_31"))
            .argument(name!("id"), ast::Value::Int(31.into()))
            .with_selection(SelectionSet::new().field("name"));

        assert_eq!(field.response_key(), "category__category_31");
        assert_eq!(
            compact(&field.to_string()),
            "category__category_31:category(id:31){name}"
        );
    }

    #[test]
    fn test_string_arguments_are_escaped() {
        let field = Field::new(name!("products"))
            .argument(name!("search"), ast::Value::String(r#"say "hi""#.to_string()));

        assert!(field.to_string().contains(r#""say \"hi\"""#));
    }

    #[test]
    fn test_rendered_documents_parse() {
        let selection = SelectionSet::new()
            .field("__typename")
            .nested("items", SelectionSet::new().fields(&["sku", "name"]))
            .on("BundleProduct", SelectionSet::new().field("dynamic_sku"));

        let rendered = Operation::query(selection).to_string();
        assert!(ast::Document::parse(rendered, "query.graphql").is_ok());
    }

    #[test]
    fn test_duplicate_fields_merge_sub_selections() {
        let selection = SelectionSet::new()
            .nested("price_range", SelectionSet::new().field("minimum_price"))
            .nested("price_range", SelectionSet::new().field("maximum_price"))
            .field("sku")
            .field("sku");

        assert_eq!(
            compact(&selection.to_string()),
            "{price_range{minimum_pricemaximum_price}sku}"
        );
    }

    #[test]
    fn test_conflicting_response_key_keeps_existing_field() {
        let selection = SelectionSet::new()
            .field("sku")
            .with(Field::new(name!("name")).alias(name!("sku")));

        assert_eq!(compact(&selection.to_string()), "{sku}");
        assert_eq!(selection.get("sku").unwrap().name(), "sku");
    }

    #[test]
    fn test_fragment_cannot_reuse_enclosing_response_key() {
        let mut selection = SelectionSet::new().field("__typename").field("sku");

        SelectionExtension::new(&mut selection).add_fragment(
            "SimpleProduct",
            SelectionSet::new()
                .with(Field::new(name!("name")).alias(name!("sku")))
                .field("weight"),
        );

        let rendered = compact(&selection.to_string());
        assert!(!rendered.contains("sku:name"));
        assert_eq!(rendered, "{__typenamesku...onSimpleProduct{weight}}");
    }

    #[test]
    fn test_conflicts_are_found_through_fragments_and_nesting() {
        let mut selection = SelectionSet::new()
            .nested("small_image", SelectionSet::new().field("url"))
            .on(
                "ConfigurableProduct",
                SelectionSet::new().nested("variants", SelectionSet::new().field("sku")),
            );

        SelectionExtension::new(&mut selection)
            .add_nested(
                "small_image",
                SelectionSet::new().with(Field::new(name!("label")).alias(name!("url"))),
            )
            .add(Field::new(name!("media_gallery")).alias(name!("variants")))
            .add_fragment(
                "SimpleProduct",
                SelectionSet::new().with(Field::new(name!("sku")).alias(name!("small_image"))),
            );

        assert_eq!(
            compact(&selection.to_string()),
            "{small_image{url}...onConfigurableProduct{variants{sku}}}"
        );
    }

    #[test]
    fn test_inline_fragments_merge_by_type_condition() {
        let selection = SelectionSet::new()
            .field("__typename")
            .on("BundleProduct", SelectionSet::new().field("dynamic_sku"))
            .on("BundleProduct", SelectionSet::new().field("dynamic_price"));

        assert_eq!(
            compact(&selection.to_string()),
            "{__typename...onBundleProduct{dynamic_skudynamic_price}}"
        );
        assert!(selection.fragment("BundleProduct").is_some());
        assert!(selection.fragment("ConfigurableProduct").is_none());
    }

    #[test]
    fn test_extension_is_additive() {
        let mut selection = SelectionSet::new()
            .field("sku")
            .nested("small_image", SelectionSet::new().field("url"));

        SelectionExtension::new(&mut selection)
            .add_fields(&["sku", "meta_description"])
            .extend("small_image", |image| {
                image.add_field("label");
            })
            .extend("not_selected", |missing| {
                missing.add_field("ignored");
            })
            .add_fragment("ConfigurableProduct", SelectionSet::new().field("variants"));

        assert_eq!(
            compact(&selection.to_string()),
            "{sku small_image{url label} meta_description ...on ConfigurableProduct{variants}}"
                .replace(' ', "")
        );
    }

    #[test]
    fn test_invalid_names_are_skipped() {
        let mut selection = SelectionSet::new().field("sku").field("not a field");
        SelectionExtension::new(&mut selection)
            .add_field("meta-title")
            .add_fragment("1Product", SelectionSet::new().field("name"));

        assert_eq!(compact(&selection.to_string()), "{sku}");
        assert_eq!(
            graphql_name("meta-title"),
            Err(RetrieverError::InvalidName {
                name: "meta-title".to_string()
            })
        );
    }

    #[test]
    fn test_named_operation() {
        let operation =
            Operation::query(SelectionSet::new().field("__typename")).named(name!("StoreCheck"));
        assert_eq!(compact(&operation.to_string()), "queryStoreCheck{__typename}");
    }
}
