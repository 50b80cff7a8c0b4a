//! Typed access to build files.
//!
//! A [`BuildFileModel`] owns the tree. [`BlockModel`]s borrow it to walk
//! blocks, and [`ResolvedPropertyModel`]s read and write one property by
//! folding over the statements that target it. [`PluginModel`]s cover
//! the plugins the file applies.

mod block;
mod builder;
mod file;
mod plugin;
mod resolved;

pub use block::BlockModel;
pub use builder::{PropertyModelBuilder, PropertyTarget};
pub use file::BuildFileModel;
pub use plugin::{PluginDeclaration, PluginModel};
pub use resolved::ResolvedPropertyModel;
