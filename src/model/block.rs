//! Navigation through configuration blocks.

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::error::Result;
use crate::semantics::{BlockKind, ModelPropertyDescription};
use crate::tree::{DslTree, ElementId};

use super::builder::PropertyModelBuilder;
use super::resolved::ResolvedPropertyModel;

/// A block of the build file, handing out models for its properties and
/// child blocks.
pub struct BlockModel<'t> {
    tree: &'t mut DslTree,
    id: ElementId,
}

impl<'t> BlockModel<'t> {
    pub(crate) fn new(tree: &'t mut DslTree, id: ElementId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn kind(&self) -> BlockKind {
        self.tree.block_kind(self.id).unwrap_or(BlockKind::Generic)
    }

    /// Dotted path from the root, e.g. `android.defaultConfig`.
    pub fn name(&self) -> String {
        self.tree.qualified_name(self.id)
    }

    /// The properties this kind of block models.
    pub fn properties(&self) -> &'static [ModelPropertyDescription] {
        self.kind().properties()
    }

    pub fn property(&mut self, property: ModelPropertyDescription) -> ResolvedPropertyModel<'_> {
        PropertyModelBuilder::create(self.tree, self.id, property).build_resolved()
    }

    /// Like [`property`](Self::property), but new statements are written as
    /// setter calls where the dialect has one.
    pub fn property_as_method(&mut self, property: ModelPropertyDescription) -> ResolvedPropertyModel<'_> {
        PropertyModelBuilder::create(self.tree, self.id, property)
            .as_method(true)
            .build_resolved()
    }

    /// A property by surface name; modelled names resolve to their schema
    /// property, anything else is read and written as a plain value.
    pub fn named_property(&mut self, name: &str) -> ResolvedPropertyModel<'_> {
        PropertyModelBuilder::create(self.tree, self.id, name).build_resolved()
    }

    /// Descends into the child block of `kind`, creating it if needed.
    pub fn block(self, kind: BlockKind) -> Result<BlockModel<'t>> {
        let id = self.tree.ensure_block(self.id, kind)?;
        Ok(BlockModel { tree: self.tree, id })
    }

    /// Like [`block`](Self::block), borrowing this model instead of consuming it.
    pub fn child(&mut self, kind: BlockKind) -> Result<BlockModel<'_>> {
        let id = self.tree.ensure_block(self.id, kind)?;
        Ok(BlockModel { tree: self.tree, id })
    }

    /// Removes every statement for a property, by surface or model name.
    pub fn remove_property(&mut self, name: &str) -> Result<usize> {
        self.tree.remove_property(self.id, name)
    }

    pub fn contained_elements(&self, include_properties: bool) -> Vec<ElementId> {
        self.tree.contained_elements(self.id, include_properties)
    }

    pub fn in_scope_elements(&self) -> IndexMap<SmolStr, ElementId> {
        self.tree.in_scope_elements(self.id)
    }

    pub fn tree(&self) -> &DslTree {
        self.tree
    }
}
