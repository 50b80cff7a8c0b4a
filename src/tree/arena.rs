//! The element arena and its structural operations.

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::base::name;
use crate::error::{DslError, Result};
use crate::semantics::{BlockKind, Dialect};

use super::element::{BlockSyntax, DslElement, ElementId, ElementKind, ExternalSyntax, NewElement};
use super::value::DslValue;

/// The parsed contents of one build file.
///
/// Elements live in an arena and are addressed by [`ElementId`]. Removing an
/// element tombstones it and its subtree; ids are never reused, so a stale
/// id simply reads as absent.
#[derive(Clone, Debug)]
pub struct DslTree {
    dialect: Dialect,
    elements: Vec<DslElement>,
}

const ROOT: ElementId = ElementId(0);

impl DslTree {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            elements: vec![DslElement::block("", BlockKind::Root, BlockSyntax::Braces)],
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn root(&self) -> ElementId {
        ROOT
    }

    // ========================================================================
    // ACCESS
    // ========================================================================

    /// The live element behind `id`, if any.
    pub fn get(&self, id: ElementId) -> Option<&DslElement> {
        self.elements.get(id.index()).filter(|element| !element.detached)
    }

    /// Like [`get`](Self::get), but an absent element is an error.
    pub fn element(&self, id: ElementId) -> Result<&DslElement> {
        self.get(id).ok_or(DslError::UnknownElement(id.0))
    }

    pub(crate) fn get_mut(&mut self, id: ElementId) -> Option<&mut DslElement> {
        self.elements.get_mut(id.index()).filter(|element| !element.detached)
    }

    fn element_mut(&mut self, id: ElementId) -> Result<&mut DslElement> {
        self.get_mut(id).ok_or(DslError::UnknownElement(id.0))
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.get(id).map(DslElement::children).unwrap_or_default()
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.get(id).and_then(DslElement::parent)
    }

    /// Parent, grandparent, ... up to and including the root.
    pub fn ancestors(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        std::iter::successors(self.parent(id), |&current| self.parent(current))
    }

    pub fn block_kind(&self, id: ElementId) -> Option<BlockKind> {
        self.get(id).and_then(DslElement::block_kind)
    }

    /// `id` itself when it is a block, otherwise its nearest block ancestor.
    pub fn enclosing_block(&self, id: ElementId) -> Option<ElementId> {
        if self.get(id)?.is_block() {
            return Some(id);
        }
        self.ancestors(id).find(|&ancestor| self.block_kind(ancestor).is_some())
    }

    /// Last live child of `parent` with surface name `name`.
    pub fn find_child(&self, parent: ElementId, name: &str) -> Option<ElementId> {
        self.children(parent)
            .iter()
            .rev()
            .copied()
            .find(|&child| self.get(child).is_some_and(|element| element.name == name))
    }

    /// First child block of the given kind.
    pub fn find_block(&self, parent: ElementId, kind: BlockKind) -> Option<ElementId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&child| self.block_kind(child) == Some(kind))
    }

    /// First child block with the given surface name, of any kind.
    pub fn find_block_named(&self, parent: ElementId, name: &str) -> Option<ElementId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&child| self.get(child).is_some_and(|element| element.is_block() && element.name == name))
    }

    /// Statement arguments: the children of a multi-argument call, otherwise
    /// the element itself.
    pub fn arguments(&self, id: ElementId) -> Vec<ElementId> {
        match self.get(id) {
            Some(element) if element.syntax.is_call() && element.kind == (ElementKind::List { literal: false }) => {
                element.children.clone()
            }
            Some(_) => vec![id],
            None => Vec::new(),
        }
    }

    /// Dotted path of an element from the root, root omitted.
    pub fn qualified_name(&self, id: ElementId) -> String {
        let mut parts: Vec<&str> = std::iter::once(id)
            .chain(self.ancestors(id))
            .filter_map(|current| self.get(current).map(DslElement::name))
            .collect();
        parts.reverse();
        name::join(parts)
    }

    /// The value an element holds, with references left unresolved.
    pub fn value(&self, id: ElementId) -> Option<DslValue> {
        let element = self.get(id)?;
        match &element.kind {
            ElementKind::Literal(value) => Some(value.clone()),
            ElementKind::List { .. } => Some(DslValue::List(
                element.children.iter().filter_map(|&child| self.value(child)).collect(),
            )),
            ElementKind::Map { .. } => Some(DslValue::Map(
                element
                    .children
                    .iter()
                    .filter_map(|&child| Some((self.get(child)?.name.to_string(), self.value(child)?)))
                    .collect(),
            )),
            ElementKind::Block { .. } | ElementKind::Opaque(_) => None,
        }
    }

    // ========================================================================
    // MODIFICATION TRACKING
    // ========================================================================

    /// Whether anything changed since parsing or the last [`commit`](Self::commit).
    pub fn is_modified(&self) -> bool {
        self.elements[ROOT.index()].modified
    }

    pub fn commit(&mut self) {
        for element in &mut self.elements {
            element.modified = false;
        }
    }

    fn mark_modified(&mut self, id: ElementId) {
        let mut current = Some(id);
        while let Some(id) = current {
            let element = &mut self.elements[id.index()];
            element.modified = true;
            current = element.parent;
        }
    }

    /// A block with nothing to write: one created in memory, or one whose
    /// statements were all removed, holding only blocks of the same sort.
    pub fn is_insignificant_block(&self, id: ElementId) -> bool {
        self.get(id).is_some_and(|element| {
            element.is_block()
                && id != ROOT
                && (element.range.is_none() || element.emptied)
                && element.children.iter().all(|&child| self.is_insignificant_block(child))
        })
    }

    // ========================================================================
    // CONSTRUCTION
    // ========================================================================

    pub(crate) fn alloc(&mut self, element: DslElement) -> ElementId {
        let id = ElementId(u32::try_from(self.elements.len()).unwrap_or(u32::MAX));
        self.elements.push(element);
        id
    }

    /// Appends `child` to `parent` and binds its semantics.
    pub(crate) fn attach(&mut self, parent: ElementId, child: ElementId) {
        self.elements[child.index()].parent = Some(parent);
        self.elements[parent.index()].children.push(child);
        self.bind(child);
    }

    /// Looks up what a statement means in its block, from its name and the
    /// shape it was written in.
    pub(crate) fn bind(&mut self, id: ElementId) {
        let Some(block) = self.parent(id).and_then(|parent| self.block_kind(parent)) else {
            return;
        };
        let element = &self.elements[id.index()];
        if !element.is_property() {
            return;
        }
        let arity = element.arity();
        let effect = block.external_to_model_map(self.dialect).lookup(&element.name, arity);
        if effect.is_none() && !block.properties().is_empty() {
            trace!(block = ?block, name = %element.name, ?arity, "no semantics for statement");
        }
        self.elements[id.index()].effect = effect;
    }

    fn build_value(&mut self, name: &str, value: DslValue, syntax: ExternalSyntax) -> ElementId {
        let id = self.alloc(DslElement::new(name, ElementKind::List { literal: true }, syntax));
        self.fill_value(id, value);
        id
    }

    fn fill_value(&mut self, id: ElementId, value: DslValue) {
        match value {
            DslValue::List(items) => {
                self.elements[id.index()].kind = ElementKind::List { literal: true };
                for item in items {
                    let child = self.build_value("", item, ExternalSyntax::Assignment);
                    self.attach(id, child);
                }
            }
            DslValue::Map(entries) => {
                self.elements[id.index()].kind = ElementKind::Map { literal: true };
                for (key, item) in entries {
                    let child = self.build_value(&key, item, ExternalSyntax::Assignment);
                    self.attach(id, child);
                }
            }
            scalar => self.elements[id.index()].kind = ElementKind::Literal(scalar),
        }
    }

    fn build_call(&mut self, name: &str, mut args: Vec<DslValue>, syntax: ExternalSyntax) -> ElementId {
        if args.len() == 1 {
            let arg = args.remove(0);
            return self.build_value(name, arg, syntax);
        }
        let id = self.alloc(DslElement::new(name, ElementKind::List { literal: false }, syntax));
        self.fill_arguments(id, args);
        id
    }

    fn fill_arguments(&mut self, id: ElementId, mut args: Vec<DslValue>) {
        if args.len() == 1 {
            let arg = args.remove(0);
            self.fill_value(id, arg);
            return;
        }
        self.elements[id.index()].kind = ElementKind::List { literal: false };
        for arg in args {
            let child = self.build_value("", arg, ExternalSyntax::Assignment);
            self.attach(id, child);
        }
    }

    fn fill_named(&mut self, id: ElementId, entries: IndexMap<String, DslValue>) {
        self.elements[id.index()].kind = ElementKind::Map { literal: false };
        for (key, value) in entries {
            let child = self.build_value(&key, value, ExternalSyntax::Assignment);
            self.attach(id, child);
        }
    }

    fn build_element(&mut self, name: &str, new: NewElement) -> ElementId {
        match new {
            NewElement::Value(value) => self.build_value(name, value, ExternalSyntax::Assignment),
            NewElement::Call { args, syntax } => self.build_call(name, args, syntax),
            NewElement::Named { entries, syntax } => {
                let id = self.alloc(DslElement::new(name, ElementKind::Map { literal: false }, syntax));
                self.fill_named(id, entries);
                id
            }
            NewElement::Block(kind) => self.alloc(DslElement::block(name, kind, BlockSyntax::Braces)),
        }
    }

    fn clear_children(&mut self, id: ElementId) {
        let children = std::mem::take(&mut self.elements[id.index()].children);
        for child in children {
            self.tombstone(child);
        }
    }

    fn tombstone(&mut self, id: ElementId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let element = &mut self.elements[current.index()];
            element.detached = true;
            stack.extend(element.children.iter().copied());
        }
    }

    fn require_block(&self, block: ElementId, name: &str, action: &'static str) -> Result<()> {
        if self.element(block)?.is_block() {
            Ok(())
        } else {
            Err(DslError::malformed(name, action, "parent is not a block"))
        }
    }

    fn require_expression(&self, id: ElementId, action: &'static str) -> Result<()> {
        let element = self.element(id)?;
        if element.is_block() || element.is_opaque() {
            Err(DslError::malformed(element.name.clone(), action, "element is not an expression"))
        } else {
            Ok(())
        }
    }

    // ========================================================================
    // STRUCTURAL EDITS
    // ========================================================================

    /// Sets `name = value` in `block`.
    ///
    /// The last child called `name` is overwritten and switched to assignment
    /// syntax; without one, a new statement is appended. Blocks and opaque
    /// statements cannot hold a literal.
    pub fn set_new_literal(&mut self, block: ElementId, name: &str, value: impl Into<DslValue>) -> Result<ElementId> {
        self.require_block(block, name, "set")?;
        let value = value.into();
        match self.find_child(block, name) {
            Some(existing) => {
                self.require_expression(existing, "set")?;
                self.replace_value(existing, value)?;
                self.elements[existing.index()].syntax = ExternalSyntax::Assignment;
                self.bind(existing);
                Ok(existing)
            }
            None => {
                let id = self.build_value(name, value, ExternalSyntax::Assignment);
                self.attach(block, id);
                self.mark_modified(id);
                debug!(name, block = %self.qualified_name(block), "added literal");
                Ok(id)
            }
        }
    }

    /// Attaches a new subtree as `name` in `block`.
    ///
    /// A same-named expression is replaced in place. A block may only
    /// replace a block, and then starts out empty.
    pub fn set_new_element(&mut self, block: ElementId, name: &str, new: NewElement) -> Result<ElementId> {
        self.require_block(block, name, "attach")?;
        let Some(existing) = self.find_child(block, name) else {
            let id = self.build_element(name, new);
            self.attach(block, id);
            self.mark_modified(id);
            debug!(name, block = %self.qualified_name(block), "attached element");
            return Ok(id);
        };

        let existing_is_block = self.element(existing)?.is_block();
        match new {
            NewElement::Block(kind) if existing_is_block => {
                self.clear_children(existing);
                let element = &mut self.elements[existing.index()];
                element.kind = ElementKind::Block { kind, syntax: BlockSyntax::Braces };
                self.mark_modified(existing);
            }
            NewElement::Block(_) => {
                return Err(DslError::malformed(name, "replace", "a block can only replace a block"));
            }
            NewElement::Value(value) => {
                self.require_expression(existing, "replace")?;
                self.replace_value(existing, value)?;
                self.elements[existing.index()].syntax = ExternalSyntax::Assignment;
                self.bind(existing);
            }
            NewElement::Call { args, syntax } => {
                self.require_expression(existing, "replace")?;
                self.set_call_arguments(existing, args)?;
                self.elements[existing.index()].syntax = syntax;
                self.bind(existing);
            }
            NewElement::Named { entries, syntax } => self.set_named_arguments(existing, entries, syntax)?,
        }
        Ok(existing)
    }

    /// Appends a new statement to `block` without touching existing ones.
    pub(crate) fn append_statement(&mut self, block: ElementId, name: &str, new: NewElement) -> Result<ElementId> {
        self.require_block(block, name, "append")?;
        let id = self.build_element(name, new);
        self.attach(block, id);
        self.mark_modified(id);
        Ok(id)
    }

    /// Replaces the value of an expression element, keeping its syntax.
    pub fn replace_value(&mut self, id: ElementId, value: impl Into<DslValue>) -> Result<()> {
        self.require_expression(id, "replace value of")?;
        self.clear_children(id);
        self.element_mut(id)?.raw = None;
        self.fill_value(id, value.into());
        self.mark_modified(id);
        Ok(())
    }

    /// Replaces all arguments of a call statement.
    pub fn set_call_arguments(&mut self, id: ElementId, args: Vec<DslValue>) -> Result<()> {
        self.require_expression(id, "set arguments of")?;
        self.clear_children(id);
        self.element_mut(id)?.raw = None;
        self.fill_arguments(id, args);
        self.bind(id);
        self.mark_modified(id);
        Ok(())
    }

    /// Rewrites a statement as named arguments or an infix chain.
    pub fn set_named_arguments(
        &mut self,
        id: ElementId,
        entries: IndexMap<String, DslValue>,
        syntax: ExternalSyntax,
    ) -> Result<()> {
        self.require_expression(id, "set arguments of")?;
        self.clear_children(id);
        let element = self.element_mut(id)?;
        element.raw = None;
        element.syntax = syntax;
        self.fill_named(id, entries);
        self.bind(id);
        self.mark_modified(id);
        Ok(())
    }

    /// Appends arguments to a call statement.
    ///
    /// A single-argument call is first turned into an argument list holding
    /// its current argument.
    pub fn append_call_arguments(&mut self, id: ElementId, args: Vec<DslValue>) -> Result<()> {
        self.require_expression(id, "append to")?;
        let element = self.element(id)?;
        if !element.syntax.is_call() {
            return Err(DslError::malformed(element.name.clone(), "append to", "statement is not a call"));
        }
        if element.kind != (ElementKind::List { literal: false }) {
            self.split_off_argument(id);
        }
        for arg in args {
            let child = self.build_value("", arg, ExternalSyntax::Assignment);
            self.attach(id, child);
        }
        self.bind(id);
        self.mark_modified(id);
        Ok(())
    }

    /// Moves the content of a single-argument call into its own child.
    fn split_off_argument(&mut self, id: ElementId) {
        let element = &mut self.elements[id.index()];
        let mut argument = DslElement::new("", element.kind.clone(), ExternalSyntax::Assignment);
        argument.children = std::mem::take(&mut element.children);
        argument.raw = element.raw.take();
        argument.range = element.range;
        element.kind = ElementKind::List { literal: false };

        let moved = self.alloc(argument);
        for child in self.elements[moved.index()].children.clone() {
            self.elements[child.index()].parent = Some(moved);
        }
        self.elements[moved.index()].parent = Some(id);
        self.elements[id.index()].children.push(moved);
    }

    /// Sets or adds entries of a map element.
    pub fn merge_map_entries(&mut self, id: ElementId, entries: IndexMap<String, DslValue>) -> Result<()> {
        let element = self.element(id)?;
        if !matches!(element.kind, ElementKind::Map { .. }) {
            return Err(DslError::malformed(element.name.clone(), "merge into", "element is not a map"));
        }
        for (key, value) in entries {
            match self.find_child(id, &key) {
                Some(existing) => self.replace_value(existing, value)?,
                None => {
                    let child = self.build_value(&key, value, ExternalSyntax::Assignment);
                    self.attach(id, child);
                }
            }
        }
        self.mark_modified(id);
        Ok(())
    }

    /// Returns the child block of `kind`, creating an empty one if needed.
    ///
    /// Creating a block does not count as a modification; it is only written
    /// out once something is put into it.
    pub fn ensure_block(&mut self, parent: ElementId, kind: BlockKind) -> Result<ElementId> {
        if matches!(kind, BlockKind::Root | BlockKind::Generic) {
            return Err(DslError::malformed(kind.name(), "create", "block kind has no fixed name"));
        }
        self.require_block(parent, kind.name(), "create")?;
        if let Some(existing) = self.find_block(parent, kind) {
            return Ok(existing);
        }
        let id = self.alloc(DslElement::block(kind.name(), kind, BlockSyntax::Braces));
        self.attach(parent, id);
        trace!(block = %self.qualified_name(id), "created block");
        Ok(id)
    }

    /// Moves `id` in front of its siblings.
    pub(crate) fn move_to_front(&mut self, id: ElementId) {
        let Some(parent) = self.parent(id) else { return };
        let children = &mut self.elements[parent.index()].children;
        if let Some(position) = children.iter().position(|&child| child == id) {
            children.remove(position);
            children.insert(0, id);
        }
    }

    /// Detaches every child whose surface name or model property name is
    /// `name`. Returns how many statements were removed.
    pub fn remove_property(&mut self, block: ElementId, name: &str) -> Result<usize> {
        self.element(block)?;
        let doomed: Vec<ElementId> = self
            .children(block)
            .iter()
            .copied()
            .filter(|&child| {
                self.get(child).is_some_and(|element| {
                    element.name == name || element.effect.is_some_and(|effect| effect.property.name == name)
                })
            })
            .collect();
        for &id in &doomed {
            self.detach(id);
        }
        if !doomed.is_empty() {
            debug!(name, block = %self.qualified_name(block), count = doomed.len(), "removed property");
        }
        Ok(doomed.len())
    }

    /// Detaches a single element and its subtree.
    pub fn remove_element(&mut self, id: ElementId) -> Result<()> {
        if id == ROOT {
            return Err(DslError::malformed("", "remove", "the root cannot be removed"));
        }
        self.element(id)?;
        self.detach(id);
        Ok(())
    }

    fn detach(&mut self, id: ElementId) {
        let parent = self.elements[id.index()].parent;
        if let Some(parent) = parent {
            self.elements[parent.index()].children.retain(|&child| child != id);
            self.mark_modified(parent);
        }
        self.tombstone(id);
        if let Some(parent) = parent {
            self.mark_emptied(parent);
        }
    }

    /// Flags `block`, and each ancestor left with nothing else to write, as
    /// emptied so the writer drops them.
    fn mark_emptied(&mut self, block: ElementId) {
        let mut current = block;
        while current != ROOT
            && self.get(current).is_some_and(DslElement::is_block)
            && self.children(current).iter().all(|&child| self.is_insignificant_block(child))
        {
            self.elements[current.index()].emptied = true;
            trace!(block = %self.qualified_name(current), "block emptied");
            let Some(parent) = self.parent(current) else { break };
            current = parent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::{EffectKind, properties};

    fn tree_with_adb() -> (DslTree, ElementId) {
        let mut tree = DslTree::new(Dialect::Groovy);
        let android = tree.ensure_block(tree.root(), BlockKind::Android).unwrap();
        let adb = tree.ensure_block(android, BlockKind::AdbOptions).unwrap();
        (tree, adb)
    }

    #[test]
    fn test_set_new_literal_binds_semantics() {
        let (mut tree, adb) = tree_with_adb();
        let id = tree.set_new_literal(adb, "timeOutInMs", 500).unwrap();

        let element = tree.get(id).unwrap();
        assert_eq!(element.syntax(), ExternalSyntax::Assignment);
        let effect = element.effect().unwrap();
        assert_eq!(effect.property, properties::TIME_OUT_IN_MS);
        assert_eq!(effect.effect, EffectKind::Var);
        assert_eq!(tree.value(id), Some(DslValue::Integer(500)));
        assert!(tree.is_modified());
        assert_eq!(tree.qualified_name(id), "android.adbOptions.timeOutInMs");
    }

    #[test]
    fn test_set_new_literal_overwrites_last() {
        let (mut tree, adb) = tree_with_adb();
        let first = tree.set_new_literal(adb, "timeOutInMs", 1).unwrap();
        let second = tree.set_new_literal(adb, "timeOutInMs", 2).unwrap();
        assert_eq!(first, second);
        assert_eq!(tree.children(adb).len(), 1);
        assert_eq!(tree.value(first), Some(DslValue::Integer(2)));
    }

    #[test]
    fn test_set_new_literal_on_block_fails() {
        let mut tree = DslTree::new(Dialect::Groovy);
        let root = tree.root();
        tree.ensure_block(root, BlockKind::Android).unwrap();

        let err = tree.set_new_literal(root, "android", 1).unwrap_err();
        assert!(matches!(err, DslError::MalformedStructure { .. }));
        assert!(!tree.is_modified());
    }

    #[test]
    fn test_set_new_element_block_replaces_only_block() {
        let mut tree = DslTree::new(Dialect::Groovy);
        let root = tree.root();
        tree.set_new_literal(root, "android", 1).unwrap();

        let err = tree
            .set_new_element(root, "android", NewElement::Block(BlockKind::Android))
            .unwrap_err();
        assert!(matches!(err, DslError::MalformedStructure { .. }));
    }

    #[test]
    fn test_composite_values_become_children() {
        let (mut tree, adb) = tree_with_adb();
        let id = tree.set_new_literal(adb, "installOptions", vec!["-r", "-d"]).unwrap();

        assert_eq!(tree.children(id).len(), 2);
        assert_eq!(tree.value(id), Some(DslValue::from(vec!["-r", "-d"])));
    }

    #[test]
    fn test_append_call_arguments_splits_single_argument() {
        let (mut tree, adb) = tree_with_adb();
        let id = tree
            .set_new_element(
                adb,
                "installOptions",
                NewElement::Call { args: vec![DslValue::from("-r")], syntax: ExternalSyntax::Command },
            )
            .unwrap();
        assert_eq!(tree.arguments(id), vec![id]);

        tree.append_call_arguments(id, vec![DslValue::from("-d")]).unwrap();
        assert_eq!(tree.arguments(id).len(), 2);
        assert_eq!(tree.value(id), Some(DslValue::from(vec!["-r", "-d"])));
    }

    #[test]
    fn test_remove_property_is_idempotent() {
        let (mut tree, adb) = tree_with_adb();
        let id = tree.set_new_literal(adb, "timeOutInMs", 500).unwrap();

        assert_eq!(tree.remove_property(adb, "mTimeOutInMs").unwrap(), 1);
        assert!(!tree.contains(id));
        assert_eq!(tree.remove_property(adb, "mTimeOutInMs").unwrap(), 0);
        assert!(tree.children(adb).is_empty());
    }

    #[test]
    fn test_new_empty_blocks_are_not_modifications() {
        let (tree, adb) = tree_with_adb();
        assert!(!tree.is_modified());
        assert!(tree.is_insignificant_block(adb));
        assert!(tree.is_insignificant_block(tree.parent(adb).unwrap()));
    }

    #[test]
    fn test_removing_last_statement_empties_blocks() {
        let (mut tree, adb) = tree_with_adb();
        let android = tree.parent(adb).unwrap();
        tree.set_new_literal(android, "compileSdkVersion", 30).unwrap();
        let id = tree.set_new_literal(adb, "timeOutInMs", 500).unwrap();
        tree.commit();
        assert!(!tree.is_insignificant_block(adb));

        tree.remove_element(id).unwrap();
        assert!(tree.is_insignificant_block(adb));
        assert!(!tree.is_insignificant_block(android));

        // The emptied block can still be written into.
        tree.set_new_literal(adb, "timeOutInMs", 10).unwrap();
        assert!(!tree.is_insignificant_block(adb));
    }

    #[test]
    fn test_commit_clears_modified() {
        let (mut tree, adb) = tree_with_adb();
        tree.set_new_literal(adb, "timeOutInMs", 500).unwrap();
        tree.commit();
        assert!(!tree.is_modified());
        assert!(!tree.is_insignificant_block(adb));
    }

    #[test]
    fn test_ensure_block_rejects_generic() {
        let mut tree = DslTree::new(Dialect::Kotlin);
        let root = tree.root();
        assert!(tree.ensure_block(root, BlockKind::Generic).is_err());
    }
}
