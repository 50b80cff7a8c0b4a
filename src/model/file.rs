//! The build-file model: parsing, edits and writing back.
//!
//! Blocks missing from the script are created on demand and only show up
//! in the output once something is written into them.

use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::{debug, trace};

use crate::error::Result;
use crate::parser::{Diagnostic, parse};
use crate::semantics::{BlockKind, Dialect};
use crate::tree::{DslTree, ElementId};
use crate::writer::{FormatOptions, write_tree};

use super::block::BlockModel;
use super::builder::PropertyModelBuilder;
use super::plugin::{self, PluginDeclaration, PluginModel};
use super::resolved::ResolvedPropertyModel;

/// One build file: its tree, the text it was read from, and what the parser
/// had to say about it.
///
/// Edits go through [`BlockModel`] and [`ResolvedPropertyModel`];
/// [`apply_changes`](Self::apply_changes) turns them back into text.
#[derive(Clone, Debug)]
pub struct BuildFileModel {
    tree: DslTree,
    text: String,
    diagnostics: Vec<Diagnostic>,
    options: FormatOptions,
}

impl BuildFileModel {
    pub fn parse(text: &str, dialect: Dialect) -> Self {
        let result = parse(text, dialect);
        debug!(
            ?dialect,
            elements = result.tree.contained_elements(result.tree.root(), true).len(),
            diagnostics = result.diagnostics.len(),
            "parsed build file"
        );
        Self {
            tree: result.tree,
            text: text.to_owned(),
            diagnostics: result.diagnostics,
            options: FormatOptions::default(),
        }
    }

    /// An empty build file.
    pub fn new(dialect: Dialect) -> Self {
        Self {
            tree: DslTree::new(dialect),
            text: String::new(),
            diagnostics: Vec::new(),
            options: FormatOptions::default(),
        }
    }

    pub fn with_format_options(mut self, options: FormatOptions) -> Self {
        self.options = options;
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.tree.dialect()
    }

    pub fn tree(&self) -> &DslTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DslTree {
        &mut self.tree
    }

    /// The text as last read or written.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn root(&mut self) -> BlockModel<'_> {
        let root = self.tree.root();
        BlockModel::new(&mut self.tree, root)
    }

    /// The top-level block of `kind`, created if missing.
    pub fn block(&mut self, kind: BlockKind) -> Result<BlockModel<'_>> {
        self.root().block(kind)
    }

    /// Walks down a chain of blocks from the root, creating what is missing.
    pub fn block_at(&mut self, path: &[BlockKind]) -> Result<BlockModel<'_>> {
        path.iter().try_fold(self.root(), |block, &kind| block.block(kind))
    }

    /// An extra property of the root `ext` block.
    pub fn ext_property(&mut self, name: &str) -> Result<ResolvedPropertyModel<'_>> {
        let ext = self.tree.ensure_block(self.tree.root(), BlockKind::Ext)?;
        Ok(PropertyModelBuilder::create(&mut self.tree, ext, name).build_resolved())
    }

    /// Declared plugins, once each, in the order they are first declared.
    pub fn plugins(&self) -> Vec<PluginDeclaration> {
        plugin::unique_declarations(&self.tree)
    }

    /// The first declaration of plugin `name`.
    pub fn plugin(&mut self, name: &str) -> Option<PluginModel<'_>> {
        let id = plugin::find(&self.tree, name)?;
        Some(PluginModel::new(&mut self.tree, id))
    }

    /// Applies `name` with `apply plugin:` unless it is already declared.
    pub fn apply_plugin(&mut self, name: &str) -> Result<PluginModel<'_>> {
        let id = match plugin::find(&self.tree, name) {
            Some(existing) => existing,
            None => plugin::apply(&mut self.tree, name)?,
        };
        Ok(PluginModel::new(&mut self.tree, id))
    }

    /// Declares `name` in the `plugins { }` block unless it is already
    /// declared; an existing declaration is returned as it is.
    pub fn add_plugin(&mut self, name: &str, version: Option<&str>, apply: Option<bool>) -> Result<PluginModel<'_>> {
        let id = match plugin::find(&self.tree, name) {
            Some(existing) => existing,
            None => plugin::declare(&mut self.tree, name, version, apply)?,
        };
        Ok(PluginModel::new(&mut self.tree, id))
    }

    /// Removes every declaration of plugin `name`. Returns how many there were.
    pub fn remove_plugin(&mut self, name: &str) -> Result<usize> {
        plugin::remove_declarations(&mut self.tree, name)
    }

    pub fn in_scope_elements(&self, id: ElementId) -> IndexMap<SmolStr, ElementId> {
        self.tree.in_scope_elements(id)
    }

    pub fn is_modified(&self) -> bool {
        self.tree.is_modified()
    }

    /// Writes pending edits back to text and returns it.
    ///
    /// An unmodified file returns the text it was read from, byte for byte.
    pub fn apply_changes(&mut self) -> String {
        if !self.tree.is_modified() {
            trace!("no changes to apply");
            return self.text.clone();
        }
        let text = write_tree(&self.tree, &self.options);
        self.tree.commit();
        debug!(bytes = text.len(), "applied changes");
        self.text.clone_from(&text);
        text
    }
}
