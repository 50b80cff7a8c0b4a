//! Dotted and indexed names as they appear in build scripts.
//!
//! A reference such as `rootProject.ext.versions["kotlin"]` is split into
//! segments that the tree walks one at a time.

use smol_str::SmolStr;

/// One step of a reference path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NameSegment {
    /// `.name`, or the leading name.
    Field(SmolStr),
    /// `[0]` or `["key"]`, with quotes removed.
    Index(SmolStr),
}

impl NameSegment {
    pub fn as_str(&self) -> &str {
        match self {
            NameSegment::Field(name) | NameSegment::Index(name) => name,
        }
    }
}

/// Splits a reference into segments.
///
/// Returns `None` for text that is not a plain dotted/indexed path, for
/// example an unbalanced bracket or an empty segment.
pub fn split_reference(text: &str) -> Option<Vec<NameSegment>> {
    let mut segments = Vec::new();
    let mut rest = text.trim();
    let mut expect_field = true;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('[') {
            let end = after.find(']')?;
            let index = strip_quotes(after[..end].trim());
            if index.is_empty() {
                return None;
            }
            segments.push(NameSegment::Index(SmolStr::new(index)));
            rest = &after[end + 1..];
            expect_field = false;
            continue;
        }
        if !expect_field {
            rest = rest.strip_prefix('.')?;
        }
        let end = rest.find(['.', '[']).unwrap_or(rest.len());
        let field = &rest[..end];
        if !is_identifier(field) {
            return None;
        }
        segments.push(NameSegment::Field(SmolStr::new(field)));
        rest = &rest[end..];
        expect_field = false;
    }

    (!segments.is_empty()).then_some(segments)
}

/// Joins name parts with dots.
pub fn join<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

/// Removes one level of matching single or double quotes.
pub fn strip_quotes(text: &str) -> &str {
    let quoted = text.len() >= 2
        && ((text.starts_with('\'') && text.ends_with('\''))
            || (text.starts_with('"') && text.ends_with('"')));
    if quoted { &text[1..text.len() - 1] } else { text }
}

/// Whether `text` can be written bare, e.g. as a Groovy map key.
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first == '_' || first == '$' || unicode_ident::is_xid_start(first) => {
            chars.all(|c| c == '$' || unicode_ident::is_xid_continue(c))
        }
        _ => false,
    }
}
