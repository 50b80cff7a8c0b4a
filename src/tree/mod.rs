//! The in-memory element tree of a build file.
//!
//! [`DslTree`] owns every [`DslElement`]; parents own their children through
//! ordered id lists and children point back with a plain index. Statements
//! are stored as written, with the semantic effect bound at attach time, so
//! reading a property folds its statements and writing one edits them.

mod arena;
mod element;
mod scope;
mod value;

pub use arena::DslTree;
pub use element::{BlockSyntax, Declaration, DslElement, ElementId, ElementKind, ExternalSyntax, NewElement};
pub use value::{DslValue, FromDslValue, ValueType};
