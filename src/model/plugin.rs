//! Plugins a build file applies.
//!
//! A plugin is declared in the `plugins { }` block, as `id 'x'` optionally
//! followed by `version '1.0'` and `apply false`, or at the top level with
//! `apply plugin: 'x'` (`apply(plugin = "x")` in Kotlin). The same plugin
//! may be declared more than once; it is listed once, at its first
//! declaration.

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{DslError, Result};
use crate::semantics::{BlockKind, Dialect};
use crate::tree::{DslTree, DslValue, ElementId, ElementKind, ExternalSyntax, NewElement};

/// A read-only view of one declared plugin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PluginDeclaration {
    pub id: ElementId,
    pub name: String,
    pub version: Option<String>,
    pub apply: Option<bool>,
}

/// One declared plugin, open for edits.
pub struct PluginModel<'t> {
    tree: &'t mut DslTree,
    id: ElementId,
}

impl<'t> PluginModel<'t> {
    pub(crate) fn new(tree: &'t mut DslTree, id: ElementId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn name(&self) -> Option<String> {
        plugin_name(self.tree, self.id)
    }

    pub fn version(&self) -> Option<String> {
        infix_part(self.tree, self.id, "version").and_then(|value| value.to_key())
    }

    /// The `apply` flag; absent means the plugin is applied.
    pub fn apply(&self) -> Option<bool> {
        match infix_part(self.tree, self.id, "apply")? {
            DslValue::Boolean(apply) => Some(apply),
            _ => None,
        }
    }

    pub fn set_version(&mut self, version: &str) -> Result<()> {
        self.set_part("version", DslValue::from(version))
    }

    pub fn set_apply(&mut self, apply: bool) -> Result<()> {
        self.set_part("apply", DslValue::Boolean(apply))
    }

    /// Removes every declaration of this plugin. Returns how many there were.
    pub fn remove(self) -> Result<usize> {
        let Some(name) = self.name() else {
            self.tree.remove_element(self.id)?;
            return Ok(1);
        };
        remove_declarations(self.tree, &name)
    }

    /// Sets `version` or `apply` on a `plugins { }` declaration, turning
    /// a bare `id 'x'` into an infix chain.
    fn set_part(&mut self, part: &'static str, value: DslValue) -> Result<()> {
        let element = self.tree.element(self.id)?;
        let in_plugins_block = element
            .parent()
            .is_some_and(|parent| self.tree.block_kind(parent) == Some(BlockKind::Plugins));
        if !in_plugins_block {
            return Err(DslError::malformed(element.name(), "set", "plugin is not in a plugins block"));
        }
        if element.syntax() == ExternalSyntax::Infix {
            let mut entries = IndexMap::new();
            entries.insert(part.to_owned(), value);
            return self.tree.merge_map_entries(self.id, entries);
        }

        let Some(name) = self.name() else {
            return Err(DslError::malformed("id", "set", "plugin id is not a literal"));
        };
        let mut entries = IndexMap::new();
        entries.insert("id".to_owned(), DslValue::String(name));
        entries.insert(part.to_owned(), value);
        self.tree.set_named_arguments(self.id, entries, ExternalSyntax::Infix)
    }
}

/// Statements that declare a plugin, in source order.
pub(crate) fn declarations(tree: &DslTree) -> Vec<ElementId> {
    let mut found = Vec::new();
    for &child in tree.children(tree.root()) {
        if tree.block_kind(child) == Some(BlockKind::Plugins) {
            found.extend(tree.children(child).iter().copied().filter(|&id| plugin_name(tree, id).is_some()));
        } else if plugin_name(tree, child).is_some() {
            found.push(child);
        }
    }
    found
}

/// First declaration of each plugin.
pub(crate) fn unique_declarations(tree: &DslTree) -> Vec<PluginDeclaration> {
    let mut seen: IndexMap<String, PluginDeclaration> = IndexMap::new();
    for id in declarations(tree) {
        let Some(name) = plugin_name(tree, id) else { continue };
        seen.entry(name.clone()).or_insert_with(|| PluginDeclaration {
            id,
            name,
            version: infix_part(tree, id, "version").and_then(|value| value.to_key()),
            apply: match infix_part(tree, id, "apply") {
                Some(DslValue::Boolean(apply)) => Some(apply),
                _ => None,
            },
        });
    }
    seen.into_values().collect()
}

pub(crate) fn find(tree: &DslTree, name: &str) -> Option<ElementId> {
    declarations(tree)
        .into_iter()
        .find(|&id| plugin_name(tree, id).as_deref() == Some(name))
}

/// Adds `apply plugin: 'name'` at the end of the file.
pub(crate) fn apply(tree: &mut DslTree, name: &str) -> Result<ElementId> {
    let mut entries = IndexMap::new();
    entries.insert("plugin".to_owned(), DslValue::from(name));
    let syntax = match tree.dialect() {
        Dialect::Groovy => ExternalSyntax::Command,
        Dialect::Kotlin => ExternalSyntax::Method,
    };
    let root = tree.root();
    let id = tree.append_statement(root, "apply", NewElement::Named { entries, syntax })?;
    debug!(plugin = name, "applied plugin");
    Ok(id)
}

/// Adds `id 'name'` to the `plugins { }` block, creating it at the top of
/// the file when missing.
pub(crate) fn declare(tree: &mut DslTree, name: &str, version: Option<&str>, apply: Option<bool>) -> Result<ElementId> {
    let root = tree.root();
    let created = tree.find_block(root, BlockKind::Plugins).is_none();
    let plugins = tree.ensure_block(root, BlockKind::Plugins)?;
    if created {
        tree.move_to_front(plugins);
    }

    let new = if version.is_none() && apply.is_none() {
        let syntax = match tree.dialect() {
            Dialect::Groovy => ExternalSyntax::Command,
            Dialect::Kotlin => ExternalSyntax::Method,
        };
        NewElement::Call {
            args: vec![DslValue::from(name)],
            syntax,
        }
    } else {
        let mut entries = IndexMap::new();
        entries.insert("id".to_owned(), DslValue::from(name));
        if let Some(version) = version {
            entries.insert("version".to_owned(), DslValue::from(version));
        }
        if let Some(apply) = apply {
            entries.insert("apply".to_owned(), DslValue::Boolean(apply));
        }
        NewElement::Named {
            entries,
            syntax: ExternalSyntax::Infix,
        }
    };
    let id = tree.append_statement(plugins, "id", new)?;
    debug!(plugin = name, ?version, ?apply, "declared plugin");
    Ok(id)
}

pub(crate) fn remove_declarations(tree: &mut DslTree, name: &str) -> Result<usize> {
    let doomed: Vec<ElementId> = declarations(tree)
        .into_iter()
        .filter(|&id| plugin_name(tree, id).as_deref() == Some(name))
        .collect();
    for &id in &doomed {
        tree.remove_element(id)?;
    }
    if !doomed.is_empty() {
        debug!(plugin = name, count = doomed.len(), "removed plugin");
    }
    Ok(doomed.len())
}

/// The plugin id a statement declares, if it declares one.
fn plugin_name(tree: &DslTree, id: ElementId) -> Option<String> {
    let element = tree.get(id)?;
    let parent = tree.block_kind(element.parent()?)?;
    let value = match (parent, element.name(), element.kind()) {
        (BlockKind::Root, "apply", ElementKind::Map { literal: false }) => tree.value(tree.find_child(id, "plugin")?)?,
        (BlockKind::Plugins, "id", ElementKind::Map { literal: false }) if element.syntax() == ExternalSyntax::Infix => {
            tree.value(tree.find_child(id, "id")?)?
        }
        (BlockKind::Plugins, "id", ElementKind::Literal(value)) if element.syntax().is_call() => value.clone(),
        _ => return None,
    };
    match value {
        DslValue::String(name) => Some(name),
        _ => None,
    }
}

fn infix_part(tree: &DslTree, id: ElementId, part: &str) -> Option<DslValue> {
    let element = tree.get(id)?;
    if element.syntax() != ExternalSyntax::Infix {
        return None;
    }
    tree.value(tree.find_child(id, part)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_declarations_in_source_order() {
        let tree = parse(
            "plugins {\n    id 'a' version '1.0'\n    id 'b'\n}\napply plugin: 'c'\napply plugin: 'a'\n",
            Dialect::Groovy,
        )
        .tree;
        assert_eq!(declarations(&tree).len(), 4);

        let unique = unique_declarations(&tree);
        let names: Vec<&str> = unique.iter().map(|plugin| plugin.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(unique[0].version.as_deref(), Some("1.0"));
        assert_eq!(unique[1].version, None);
    }

    #[test]
    fn test_non_plugin_statements_are_ignored() {
        let tree = parse("apply from: 'other.gradle'\nandroid {\n    id 'x'\n}\n", Dialect::Groovy).tree;
        assert!(declarations(&tree).is_empty());
    }

    #[test]
    fn test_declare_creates_block_first() {
        let mut tree = parse("android {\n    compileSdk = 33\n}\n", Dialect::Kotlin).tree;
        declare(&mut tree, "com.android.application", None, None).unwrap();
        let first = tree.children(tree.root())[0];
        assert_eq!(tree.block_kind(first), Some(BlockKind::Plugins));
        assert_eq!(find(&tree, "com.android.application").map(|id| tree.parent(id)), Some(Some(first)));
    }
}
