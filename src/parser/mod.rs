//! Reading build scripts into a [`DslTree`](crate::tree::DslTree).
//!
//! - [`lexer`] splits text into tokens (logos)
//! - [`parse`] builds the tree, keeping anything it cannot model verbatim
//! - [`Diagnostic`] reports what was kept opaque or could not be read

mod diagnostics;
pub mod lexer;
#[allow(clippy::module_inception)]
mod parser;

pub use diagnostics::{Diagnostic, DiagnosticCollector, Severity, codes};
pub use parser::{ParseResult, parse};
