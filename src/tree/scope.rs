//! Visibility and reference resolution over a [`DslTree`].
//!
//! A script name is looked up the way Gradle evaluates it: variables and
//! properties of the enclosing blocks, extra properties of those blocks,
//! and finally explicit paths from the project root.

use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::trace;

use crate::base::NameSegment;
use crate::base::name::split_reference;
use crate::semantics::BlockKind;

use super::arena::DslTree;
use super::element::{ElementId, ElementKind};
use super::value::DslValue;

/// How many references are followed before giving up on a chain.
const MAX_RESOLVE_DEPTH: usize = 16;

impl DslTree {
    /// Child elements of `block` that other code can navigate into.
    ///
    /// Blocks are always included; properties only when asked for, or when
    /// the block is an extra-properties block.
    pub fn contained_elements(&self, block: ElementId, include_properties: bool) -> Vec<ElementId> {
        let include_properties = include_properties
            || self.block_kind(block).is_some_and(BlockKind::always_contains_properties);
        self.children(block)
            .iter()
            .copied()
            .filter(|&child| {
                self.get(child).is_some_and(|element| {
                    element.is_block() || (include_properties && element.is_property())
                })
            })
            .collect()
    }

    /// Names visible from `id`.
    ///
    /// Walks from the root down to `id`'s block. Each block contributes its
    /// extra properties, then its own named values; a nearer block shadows
    /// a farther one. Only statements declared before the one holding `id`
    /// are visible. From a block itself, all of its statements are.
    pub fn in_scope_elements(&self, id: ElementId) -> IndexMap<SmolStr, ElementId> {
        let mut visible = IndexMap::new();
        let Some(block) = self.enclosing_block(id) else {
            return visible;
        };

        let mut chain: Vec<ElementId> = std::iter::once(block).chain(self.ancestors(block)).collect();
        chain.reverse();

        for current in chain {
            let before = self.children_before(current, id);
            if let Some(&ext) = before.iter().find(|&&child| self.block_kind(child) == Some(BlockKind::Ext)) {
                self.collect_named_values(self.children_before(ext, id), &mut visible);
            }
            self.collect_named_values(before, &mut visible);
        }
        visible
    }

    /// Children of `block` that precede the statement holding `id`.
    fn children_before(&self, block: ElementId, id: ElementId) -> &[ElementId] {
        let children = self.children(block);
        let end = std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&current| self.parent(current) == Some(block))
            .and_then(|holder| children.iter().position(|&child| child == holder))
            .unwrap_or(children.len());
        &children[..end]
    }

    fn collect_named_values(&self, children: &[ElementId], visible: &mut IndexMap<SmolStr, ElementId>) {
        for &child in children {
            let Some(element) = self.get(child) else { continue };
            if element.is_property() {
                visible.insert(element.name.clone(), child);
            }
        }
    }

    /// Resolves a dotted or indexed reference as seen from `from`.
    ///
    /// Handles `foo`, `ext.foo`, `rootProject.ext.foo`, `project.foo`,
    /// `list[0]`, `map["k"]` and Kotlin `extra["foo"]`.
    pub fn resolve_reference(&self, from: ElementId, text: &str) -> Option<ElementId> {
        self.resolve_reference_at(from, text, 0)
    }

    fn resolve_reference_at(&self, from: ElementId, text: &str, depth: usize) -> Option<ElementId> {
        if depth > MAX_RESOLVE_DEPTH {
            trace!(reference = text, "reference chain too deep");
            return None;
        }
        let segments: Vec<NameSegment> = split_reference(text)?
            .into_iter()
            .map(|segment| match segment {
                NameSegment::Field(name) => NameSegment::Field(SmolStr::new(self.dialect().internal_name(&name))),
                index => index,
            })
            .collect();

        let (scope, segments) = match segments.split_first() {
            Some((NameSegment::Field(first), rest))
                if (first == "rootProject" || first == "project") && !rest.is_empty() =>
            {
                (self.root(), rest)
            }
            _ => (from, segments.as_slice()),
        };
        let (first, rest) = segments.split_first()?;

        let mut current = self
            .in_scope_elements(scope)
            .get(first.as_str())
            .copied()
            .filter(|&found| found != from)
            .or_else(|| self.lookup_in_ancestors(scope, first.as_str()))?;

        for segment in rest {
            current = self.descend(current, segment, depth)?;
        }
        Some(current)
    }

    /// Finds a child called `name` declared before `scope` in its block or
    /// any block above it.
    fn lookup_in_ancestors(&self, scope: ElementId, name: &str) -> Option<ElementId> {
        let block = self.enclosing_block(scope)?;
        std::iter::once(block).chain(self.ancestors(block)).find_map(|current| {
            self.children_before(current, scope)
                .iter()
                .rev()
                .copied()
                .find(|&child| self.get(child).is_some_and(|element| element.name == name))
        })
    }

    fn descend(&self, from: ElementId, segment: &NameSegment, depth: usize) -> Option<ElementId> {
        let element = self.get(from)?;
        if let ElementKind::Literal(DslValue::Reference(target)) = &element.kind {
            let target = self.resolve_reference_at(from, target, depth + 1)?;
            return self.descend(target, segment, depth + 1);
        }
        match (&element.kind, segment) {
            (ElementKind::List { .. }, NameSegment::Index(index)) => {
                let position: usize = index.parse().ok()?;
                element.children.get(position).copied()
            }
            (ElementKind::Map { .. } | ElementKind::Block { .. }, segment) => self.find_child(from, segment.as_str()),
            _ => None,
        }
    }

    /// The value of `id` with references replaced by what they point at.
    ///
    /// Unresolvable references, and chains deeper than the resolution limit,
    /// stay as `DslValue::Reference`.
    pub fn resolved_value(&self, id: ElementId) -> Option<DslValue> {
        self.resolved_value_at(id, 0)
    }

    fn resolved_value_at(&self, id: ElementId, depth: usize) -> Option<DslValue> {
        let element = self.get(id)?;
        match &element.kind {
            ElementKind::Literal(DslValue::Reference(text)) => {
                let resolved = (depth < MAX_RESOLVE_DEPTH)
                    .then(|| self.resolve_reference_at(id, text, depth + 1))
                    .flatten()
                    .and_then(|target| self.resolved_value_at(target, depth + 1));
                Some(resolved.unwrap_or_else(|| DslValue::Reference(text.clone())))
            }
            ElementKind::List { .. } => Some(DslValue::List(
                element
                    .children
                    .iter()
                    .filter_map(|&child| self.resolved_value_at(child, depth))
                    .collect(),
            )),
            ElementKind::Map { .. } => Some(DslValue::Map(
                element
                    .children
                    .iter()
                    .filter_map(|&child| {
                        Some((self.get(child)?.name.to_string(), self.resolved_value_at(child, depth)?))
                    })
                    .collect(),
            )),
            _ => self.value(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::Dialect;

    /// root { ext { foo = 1; versions = [kotlin: "1.9"] }; android { foo = 2 } }
    fn scoped_tree(dialect: Dialect) -> (DslTree, ElementId, ElementId) {
        let mut tree = DslTree::new(dialect);
        let root = tree.root();
        let ext = tree.ensure_block(root, BlockKind::Ext).unwrap();
        tree.set_new_literal(ext, "foo", 1).unwrap();
        let mut versions = IndexMap::new();
        versions.insert("kotlin".to_owned(), "1.9");
        tree.set_new_literal(ext, "versions", versions).unwrap();
        let android = tree.ensure_block(root, BlockKind::Android).unwrap();
        tree.set_new_literal(android, "foo", 2).unwrap();
        (tree, ext, android)
    }

    #[test]
    fn test_nearer_block_shadows_ext() {
        let (tree, _, android) = scoped_tree(Dialect::Groovy);

        let visible = tree.in_scope_elements(android);
        let foo = visible["foo"];
        assert_eq!(tree.value(foo), Some(DslValue::Integer(2)));

        let from_root = tree.in_scope_elements(tree.root());
        assert_eq!(tree.value(from_root["foo"]), Some(DslValue::Integer(1)));
    }

    #[test]
    fn test_resolve_paths() {
        let (mut tree, _, android) = scoped_tree(Dialect::Groovy);
        let site = tree.set_new_literal(android, "site", 0).unwrap();

        let ext_foo = tree.resolve_reference(site, "ext.foo").unwrap();
        assert_eq!(tree.value(ext_foo), Some(DslValue::Integer(1)));

        let root_foo = tree.resolve_reference(site, "rootProject.ext.foo").unwrap();
        assert_eq!(root_foo, ext_foo);

        let nearest = tree.resolve_reference(site, "foo").unwrap();
        assert_eq!(tree.value(nearest), Some(DslValue::Integer(2)));

        let kotlin = tree.resolve_reference(site, "versions[\"kotlin\"]").unwrap();
        assert_eq!(tree.value(kotlin), Some(DslValue::from("1.9")));

        assert_eq!(tree.resolve_reference(site, "missing"), None);
        assert_eq!(tree.resolve_reference(site, "ext.missing"), None);
    }

    #[test]
    fn test_later_declarations_are_not_visible() {
        let mut tree = DslTree::new(Dialect::Groovy);
        let root = tree.root();
        let ext = tree.ensure_block(root, BlockKind::Ext).unwrap();
        tree.set_new_literal(ext, "foo", 1).unwrap();
        let android = tree.ensure_block(root, BlockKind::Android).unwrap();
        let sdk = tree.set_new_literal(android, "compileSdkVersion", DslValue::reference("foo")).unwrap();
        tree.set_new_literal(android, "foo", 2).unwrap();
        let late = tree.set_new_literal(android, "targetSdkVersion", DslValue::reference("foo")).unwrap();

        assert_eq!(tree.resolved_value(sdk), Some(DslValue::Integer(1)));
        assert_eq!(tree.resolved_value(late), Some(DslValue::Integer(2)));
        assert_eq!(tree.value(tree.in_scope_elements(sdk)["foo"]), Some(DslValue::Integer(1)));

        // A block sees everything it declares.
        assert_eq!(tree.value(tree.in_scope_elements(android)["foo"]), Some(DslValue::Integer(2)));
    }

    #[test]
    fn test_ext_declared_after_block_is_not_visible() {
        let mut tree = DslTree::new(Dialect::Groovy);
        let root = tree.root();
        let android = tree.ensure_block(root, BlockKind::Android).unwrap();
        let sdk = tree.set_new_literal(android, "compileSdkVersion", DslValue::reference("sdk")).unwrap();
        let ext = tree.ensure_block(root, BlockKind::Ext).unwrap();
        tree.set_new_literal(ext, "sdk", 33).unwrap();

        assert_eq!(tree.resolve_reference(sdk, "sdk"), None);
        assert_eq!(tree.resolve_reference(sdk, "ext.sdk"), None);
        assert!(tree.resolve_reference(sdk, "rootProject.ext.sdk").is_some());
    }

    #[test]
    fn test_kotlin_extra_index() {
        let (mut tree, _, android) = scoped_tree(Dialect::Kotlin);
        let site = tree.set_new_literal(android, "site", 0).unwrap();

        let foo = tree.resolve_reference(site, "extra[\"foo\"]").unwrap();
        assert_eq!(tree.value(foo), Some(DslValue::Integer(1)));
    }

    #[test]
    fn test_resolved_value_follows_and_guards() {
        let (mut tree, ext, android) = scoped_tree(Dialect::Groovy);
        let alias = tree.set_new_literal(android, "alias", DslValue::reference("ext.foo")).unwrap();
        assert_eq!(tree.resolved_value(alias), Some(DslValue::Integer(1)));

        let a = tree.set_new_literal(ext, "a", DslValue::reference("b")).unwrap();
        tree.set_new_literal(ext, "b", DslValue::reference("a")).unwrap();
        assert!(matches!(tree.resolved_value(a), Some(DslValue::Reference(_))));
    }

    #[test]
    fn test_contained_elements() {
        let (tree, ext, android) = scoped_tree(Dialect::Groovy);
        let root = tree.root();

        assert_eq!(tree.contained_elements(root, false), vec![ext, android]);
        assert!(tree.contained_elements(android, false).is_empty());
        assert_eq!(tree.contained_elements(android, true).len(), 1);
        assert_eq!(tree.contained_elements(ext, false).len(), 2);
    }
}
