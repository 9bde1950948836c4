//! Query-building primitives shared by the retrievers.
//!
//! - [`document`]: fields, selection sets and operations over the
//!   `apollo-compiler` AST, merged by response key
//! - [`filter`]: attribute filter inputs that filter hooks transform
//! - [`hooks`]: selection and filter hook registries

pub mod document;
pub mod filter;
pub mod hooks;

pub use apollo_compiler::ast::{Selection, Value};
pub use apollo_compiler::Name;
pub use document::{Field, Operation, SelectionExtension, SelectionSet};
pub use filter::{FilterCondition, FilterInput};
pub use hooks::{FilterHook, FilterHooks, SelectionHook, SelectionHooks};
