//! Problems found while reading a build script.
//!
//! Parsing never fails outright. Anything the parser cannot model is kept as
//! an opaque statement and reported here instead.

use std::sync::Arc;

use crate::base::{LineCol, LineIndex, TextRange};

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A diagnostic message with location.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// Byte range in the script.
    pub range: TextRange,
    /// Start position (0-indexed).
    pub start: LineCol,
    /// Severity level.
    pub severity: Severity,
    /// Stable code, see [`codes`].
    pub code: Option<Arc<str>>,
    /// The diagnostic message.
    pub message: Arc<str>,
}

impl Diagnostic {
    fn new(severity: Severity, range: TextRange, start: LineCol, message: impl Into<Arc<str>>) -> Self {
        Self {
            range,
            start,
            severity,
            code: None,
            message: message.into(),
        }
    }

    /// Create a new error diagnostic.
    pub fn error(range: TextRange, start: LineCol, message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Error, range, start, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(range: TextRange, start: LineCol, message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Warning, range, start, message)
    }

    pub fn info(range: TextRange, start: LineCol, message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Info, range, start, message)
    }

    /// Set the diagnostic code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Stable diagnostic codes.
pub mod codes {
    /// Characters the lexer does not recognise.
    pub const INVALID_TOKEN: &str = "E0001";
    /// Unbalanced `{`, `(` or `[`.
    pub const UNBALANCED_DELIMITER: &str = "E0002";

    /// Statement kept verbatim because it could not be modelled.
    pub const UNPARSED_STATEMENT: &str = "W0001";

    /// Block name with no schema; its contents are kept unmodelled.
    pub const UNKNOWN_BLOCK: &str = "I0001";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics while parsing one script.
#[derive(Clone, Debug)]
pub struct DiagnosticCollector {
    index: LineIndex,
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new(text: &str) -> Self {
        Self {
            index: LineIndex::new(text),
            diagnostics: Vec::new(),
        }
    }

    /// Add a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn invalid_token(&mut self, range: TextRange, text: &str) {
        let start = self.index.start_of(range);
        self.add(
            Diagnostic::error(range, start, format!("unrecognised input '{text}'"))
                .with_code(codes::INVALID_TOKEN),
        );
    }

    pub fn unbalanced(&mut self, range: TextRange) {
        let start = self.index.start_of(range);
        self.add(
            Diagnostic::error(range, start, "unbalanced delimiter").with_code(codes::UNBALANCED_DELIMITER),
        );
    }

    pub fn unparsed_statement(&mut self, range: TextRange) {
        let start = self.index.start_of(range);
        self.add(
            Diagnostic::warning(range, start, "statement kept as written; it is not part of the model")
                .with_code(codes::UNPARSED_STATEMENT),
        );
    }

    pub fn unknown_block(&mut self, range: TextRange, name: &str) {
        let start = self.index.start_of(range);
        self.add(
            Diagnostic::info(range, start, format!("block '{name}' is not modelled"))
                .with_code(codes::UNKNOWN_BLOCK),
        );
    }

    /// Get all diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get the number of errors.
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error).count()
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    /// Position to roll back to with [`rollback`](Self::rollback).
    pub(crate) fn mark(&self) -> usize {
        self.diagnostics.len()
    }

    /// Drops diagnostics added after `mark`.
    pub(crate) fn rollback(&mut self, mark: usize) {
        self.diagnostics.truncate(mark);
    }

    /// Consume the collector, returning its diagnostics in source order.
    pub fn finish(mut self) -> Vec<Diagnostic> {
        self.diagnostics.sort_by_key(|d| d.range.start());
        self.diagnostics
    }
}
