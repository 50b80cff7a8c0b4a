//! # gradle-dsl
//!
//! Reads Gradle build scripts in Groovy and Kotlin syntax, exposes their
//! properties through a dialect-independent model, and writes edits back.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! model     → BuildFileModel, BlockModel, ResolvedPropertyModel, PluginModel
//!   ↓
//! writer    → Canonical text regeneration per dialect
//! parser    → Lexer (logos) + statement parser, diagnostics
//!   ↓
//! tree      → Element arena, values, scope and reference resolution
//!   ↓
//! semantics → Block kinds, property schema, surface-to-model tables
//!   ↓
//! base      → Primitives (TextRange, LineIndex, name segments)
//! ```
//!
//! ## Example
//!
//! ```
//! use gradle_dsl::{BlockKind, BuildFileModel, Dialect, properties};
//!
//! let mut file = BuildFileModel::parse("android {\n    compileSdkVersion 30\n}\n", Dialect::Groovy);
//! let mut android = file.block(BlockKind::Android).unwrap();
//! assert_eq!(android.property(properties::COMPILE_SDK_VERSION).value::<i64>(), Some(30));
//!
//! android.property(properties::COMPILE_SDK_VERSION).set_value(31).unwrap();
//! assert_eq!(file.apply_changes(), "android {\n    compileSdkVersion 31\n}\n");
//! ```

/// Foundation types: text positions, name segments
pub mod base;

/// Error type shared by all mutating operations
pub mod error;

/// Property schema and per-dialect semantics tables
pub mod semantics;

/// The element tree every build file is parsed into
pub mod tree;

/// Lexer, parser and diagnostics
pub mod parser;

/// Text regeneration
pub mod writer;

/// Build file, block and property models
pub mod model;

pub use base::{LineCol, LineIndex, TextRange, TextSize};
pub use error::{DslError, Result};
pub use model::{
    BlockModel, BuildFileModel, PluginDeclaration, PluginModel, PropertyModelBuilder, PropertyTarget,
    ResolvedPropertyModel,
};
pub use parser::{Diagnostic, ParseResult, Severity, parse};
pub use semantics::{
    Arity, BlockKind, Dialect, EffectKind, ExternalToModelMap, LanguageLevel, ModelEffectDescription,
    ModelPropertyDescription, PropertyShape, properties,
};
pub use tree::{DslElement, DslTree, DslValue, ElementId, ElementKind, ExternalSyntax, FromDslValue, ValueType};
pub use writer::{FormatOptions, write_tree};
