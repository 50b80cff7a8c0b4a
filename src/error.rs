//! Error types for structural edits and property writes.
//!
//! Only requests that cannot be carried out are errors. Unrecognised syntax
//! is kept as opaque elements and failed type conversions read as `None`,
//! so neither shows up here.

use smol_str::SmolStr;
use thiserror::Error;

use crate::semantics::EffectKind;

/// A type alias for `Result<T, DslError>`.
pub type Result<T> = std::result::Result<T, DslError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DslError {
    /// The edit does not fit the shape of the element it targets.
    #[error("cannot {action} `{name}`: {reason}")]
    MalformedStructure {
        name: SmolStr,
        action: &'static str,
        reason: &'static str,
    },

    /// The property has no writable form for the requested change.
    #[error("property `{property}` cannot be written (effect {effect:?})")]
    UnsupportedMutation {
        property: SmolStr,
        effect: Option<EffectKind>,
    },

    /// The element id is detached or belongs to another tree.
    #[error("element #{0} is not part of this tree")]
    UnknownElement(u32),
}

impl DslError {
    pub(crate) fn malformed(name: impl Into<SmolStr>, action: &'static str, reason: &'static str) -> Self {
        Self::MalformedStructure {
            name: name.into(),
            action,
            reason,
        }
    }

    pub(crate) fn unsupported(property: impl Into<SmolStr>, effect: Option<EffectKind>) -> Self {
        Self::UnsupportedMutation {
            property: property.into(),
            effect,
        }
    }
}
