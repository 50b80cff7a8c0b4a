//! Semantic tables: what each surface token does to the model.
//!
//! The same block can be written in two dialects. Each [`BlockKind`] carries
//! one [`ExternalToModelMap`] per [`Dialect`] mapping `(name, arity)` to a
//! [`ModelEffectDescription`]; the model only ever asks for
//! [`ModelPropertyDescription`]s and never sees the surface spelling.

mod blocks;
mod description;
mod language;
mod registry;

pub use blocks::{BlockKind, model_description_for, properties};
pub use description::{Arity, EffectKind, ModelEffectDescription, ModelPropertyDescription, PropertyShape};
pub use language::LanguageLevel;
pub use registry::{Dialect, ExternalToModelMap, SemanticsRow, SurfaceKey};
