//! Entry point for property models.

use smol_str::SmolStr;
use tracing::debug;

use crate::semantics::{BlockKind, Dialect, ExternalToModelMap, ModelPropertyDescription};
use crate::tree::{DslTree, ElementId};

use super::resolved::ResolvedPropertyModel;

/// What a property model is about: a schema property, or a plain name for
/// extra and unmodelled properties.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyTarget {
    Described(ModelPropertyDescription),
    Named(SmolStr),
}

impl PropertyTarget {
    pub fn name(&self) -> &str {
        match self {
            PropertyTarget::Described(description) => description.name,
            PropertyTarget::Named(name) => name,
        }
    }
}

impl From<ModelPropertyDescription> for PropertyTarget {
    fn from(description: ModelPropertyDescription) -> Self {
        PropertyTarget::Described(description)
    }
}

impl From<&str> for PropertyTarget {
    fn from(name: &str) -> Self {
        PropertyTarget::Named(SmolStr::new(name))
    }
}

impl From<String> for PropertyTarget {
    fn from(name: String) -> Self {
        PropertyTarget::Named(SmolStr::new(name))
    }
}

/// Builds a [`ResolvedPropertyModel`] for one property of one block.
///
/// ```ignore
/// let timeout = PropertyModelBuilder::create(&mut tree, adb_options, properties::TIME_OUT_IN_MS)
///     .as_method(true)
///     .build_resolved();
/// ```
pub struct PropertyModelBuilder<'t> {
    tree: &'t mut DslTree,
    owner: ElementId,
    target: PropertyTarget,
    as_method: bool,
}

impl<'t> PropertyModelBuilder<'t> {
    pub fn create(tree: &'t mut DslTree, owner: ElementId, property: impl Into<PropertyTarget>) -> Self {
        Self {
            tree,
            owner,
            target: property.into(),
            as_method: false,
        }
    }

    /// Prefer a setter call over an assignment when the property has to be
    /// written fresh.
    pub fn as_method(mut self, as_method: bool) -> Self {
        self.as_method = as_method;
        self
    }

    pub fn build_resolved(self) -> ResolvedPropertyModel<'t> {
        let block = self.tree.block_kind(self.owner).unwrap_or(BlockKind::Generic);
        let table: &'static ExternalToModelMap = match self.tree.dialect() {
            Dialect::Groovy => block.external_to_model_map(Dialect::Groovy),
            Dialect::Kotlin => block.external_to_model_map(Dialect::Kotlin),
        };

        // A surface name of a modelled block means its schema property.
        let target = match self.target {
            PropertyTarget::Named(name) => match table.description_for(&name) {
                Some(description) => PropertyTarget::Described(description),
                None => PropertyTarget::Named(name),
            },
            described => described,
        };
        debug!(
            block = ?block,
            dialect = ?self.tree.dialect(),
            property = target.name(),
            "resolved property model"
        );
        ResolvedPropertyModel::new(self.tree, self.owner, target, self.as_method, table)
    }
}
