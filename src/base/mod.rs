//! Foundation types shared by every other module.
//!
//! - [`NameSegment`] and helpers for dotted/indexed script names
//! - [`TextRange`], [`TextSize`], [`LineCol`], [`LineIndex`] for source positions
//!
//! This module has NO dependencies on other crate modules.

pub mod name;
mod span;

pub use name::NameSegment;
pub use span::{LineCol, LineIndex, TextRange, TextSize, range_of};
