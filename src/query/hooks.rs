//! Extension points call sites register on a retriever before it fetches.
//!
//! - Selection hooks add fields to one sub-object of the generated query. They
//!   only ever see a [`SelectionExtension`], so they cannot drop or rename the
//!   fields the retriever needs to map results back.
//! - Filter hooks are pure `FilterInput -> FilterInput` functions. They are
//!   folded over the retriever's default filter in registration order; a hook
//!   may extend its input or ignore it and return a new filter.

use std::fmt;

use crate::query::{FilterInput, SelectionExtension, SelectionSet};

/// An additive extension of a selection set.
pub type SelectionHook = Box<dyn Fn(&mut SelectionExtension<'_>) + Send + Sync>;

/// A transformation of a filter predicate.
pub type FilterHook = Box<dyn Fn(FilterInput) -> FilterInput + Send + Sync>;

/// Selection hooks for one query target, applied in registration order.
#[derive(Default)]
pub struct SelectionHooks {
    hooks: Vec<SelectionHook>,
}

impl SelectionHooks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a hook after every hook registered so far.
    pub fn push<F>(&mut self, hook: F)
    where
        F: Fn(&mut SelectionExtension<'_>) + Send + Sync + 'static,
    {
        self.hooks.push(Box::new(hook));
    }

    /// Applies every hook to `selection`.
    pub fn apply(&self, selection: &mut SelectionSet) {
        let mut extension = SelectionExtension::new(selection);
        for hook in &self.hooks {
            hook(&mut extension);
        }
    }

    /// Returns the number of registered hooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Returns `true` if no hook is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl fmt::Debug for SelectionHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionHooks")
            .field("len", &self.hooks.len())
            .finish()
    }
}

/// Filter hooks, folded in registration order.
#[derive(Default)]
pub struct FilterHooks {
    hooks: Vec<FilterHook>,
}

impl FilterHooks {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a hook to the chain.
    pub fn push<F>(&mut self, hook: F)
    where
        F: Fn(FilterInput) -> FilterInput + Send + Sync + 'static,
    {
        self.hooks.push(Box::new(hook));
    }

    /// Returns `hN(...h2(h1(initial)))`.
    #[must_use]
    pub fn fold(&self, initial: FilterInput) -> FilterInput {
        self.hooks.iter().fold(initial, |filter, hook| hook(filter))
    }

    /// Returns the number of registered hooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Returns `true` if no hook is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl fmt::Debug for FilterHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterHooks")
            .field("len", &self.hooks.len())
            .finish()
    }
}
