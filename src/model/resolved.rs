//! One property of one block, read and written through its statements.

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::error::{DslError, Result};
use crate::semantics::{
    Arity, Dialect, EffectKind, ExternalToModelMap, LanguageLevel, ModelEffectDescription, ModelPropertyDescription,
    PropertyShape,
};
use crate::tree::{DslTree, DslValue, ElementId, ElementKind, ExternalSyntax, FromDslValue, NewElement, ValueType};

use super::builder::PropertyTarget;

/// A property model bound to its block.
///
/// The value is computed from every statement in the block that targets the
/// property, in source order: assignments and setters replace, augmenting
/// calls append or merge, and a reset clears. Nothing is cached, so the
/// model always reflects the current tree.
pub struct ResolvedPropertyModel<'t> {
    tree: &'t mut DslTree,
    owner: ElementId,
    target: PropertyTarget,
    as_method: bool,
    table: &'static ExternalToModelMap,
}

impl<'t> ResolvedPropertyModel<'t> {
    pub(crate) fn new(
        tree: &'t mut DslTree,
        owner: ElementId,
        target: PropertyTarget,
        as_method: bool,
        table: &'static ExternalToModelMap,
    ) -> Self {
        Self {
            tree,
            owner,
            target,
            as_method,
            table,
        }
    }

    pub fn name(&self) -> &str {
        self.target.name()
    }

    pub fn owner(&self) -> ElementId {
        self.owner
    }

    pub fn tree(&self) -> &DslTree {
        self.tree
    }

    pub fn description(&self) -> Option<ModelPropertyDescription> {
        match &self.target {
            PropertyTarget::Described(description) => Some(*description),
            PropertyTarget::Named(_) => None,
        }
    }

    /// The statements that contribute to this property, in source order.
    pub fn elements(&self) -> Vec<ElementId> {
        if !self.tree.get(self.owner).is_some_and(|block| block.is_block()) {
            return Vec::new();
        }
        self.tree
            .children(self.owner)
            .iter()
            .copied()
            .filter(|&child| {
                self.tree.get(child).is_some_and(|element| match &self.target {
                    PropertyTarget::Described(description) => {
                        element.effect().is_some_and(|effect| effect.property == *description)
                    }
                    PropertyTarget::Named(name) => element.is_property() && element.name() == name.as_str(),
                })
            })
            .collect()
    }

    /// The statement new values are written through: the last contributing one.
    pub fn element(&self) -> Option<ElementId> {
        self.elements().last().copied()
    }

    pub fn effect(&self) -> Option<ModelEffectDescription> {
        self.element().and_then(|id| self.tree.get(id)?.effect())
    }

    pub fn is_present(&self) -> bool {
        !self.elements().is_empty()
    }

    /// The folded value, with references followed.
    pub fn dsl_value(&self) -> Option<DslValue> {
        self.fold(true)
    }

    /// The folded value, with references left as written.
    pub fn unresolved_value(&self) -> Option<DslValue> {
        self.fold(false)
    }

    pub fn value<T: FromDslValue>(&self) -> Option<T> {
        self.dsl_value().as_ref().and_then(T::from_dsl_value)
    }

    pub fn value_type(&self) -> Option<ValueType> {
        self.dsl_value().map(|value| value.value_type())
    }

    /// The value read as a Java language level, such as `jvmTarget`.
    pub fn language_level(&self) -> Option<LanguageLevel> {
        match self.dsl_value()? {
            DslValue::String(text) | DslValue::Reference(text) => LanguageLevel::parse(&text),
            DslValue::Decimal(number) => LanguageLevel::parse(&number.to_string()),
            DslValue::Integer(number) => LanguageLevel::parse(&number.to_string()),
            _ => None,
        }
    }

    fn fold(&self, resolve: bool) -> Option<DslValue> {
        let read = |id: ElementId| {
            if resolve { self.tree.resolved_value(id) } else { self.tree.value(id) }
        };
        let mut folded: Option<DslValue> = None;
        for id in self.elements() {
            let effect = self
                .tree
                .get(id)
                .and_then(|element| element.effect())
                .map_or(EffectKind::Var, |effect| effect.effect);
            match effect {
                EffectKind::Get => {}
                EffectKind::Var | EffectKind::Val | EffectKind::Set | EffectKind::Other => folded = read(id),
                EffectKind::AddAsList | EffectKind::AugmentList => {
                    let args = self.tree.arguments(id).into_iter().filter_map(read).collect();
                    folded = Some(append_items(folded.take(), args));
                }
                EffectKind::ClearAndAugmentList => {
                    let args = self.tree.arguments(id).into_iter().filter_map(read).collect();
                    folded = Some(append_items(None, args));
                }
                EffectKind::AugmentMap => {
                    let args: Vec<DslValue> = self.tree.arguments(id).into_iter().filter_map(read).collect();
                    folded = Some(merge_entries(folded.take(), args));
                }
                EffectKind::Reset => folded = Some(self.empty_value()),
            }
        }
        folded
    }

    fn shape(&self) -> PropertyShape {
        self.description().map_or(PropertyShape::Scalar, |description| description.shape)
    }

    fn empty_value(&self) -> DslValue {
        match self.shape() {
            PropertyShape::MutableMap => DslValue::Map(IndexMap::new()),
            _ => DslValue::List(Vec::new()),
        }
    }

    // ========================================================================
    // MUTATION
    // ========================================================================

    /// Writes `value` through the bound statement, or adds a statement when
    /// the property is not in the block yet.
    ///
    /// Fails with [`DslError::UnsupportedMutation`] when the bound statement
    /// is read-only, and leaves the tree untouched.
    pub fn set_value(&mut self, value: impl Into<DslValue>) -> Result<()> {
        let value = value.into();
        self.tree.element(self.owner)?;
        let Some(property) = self.description() else {
            return self.set_named(value);
        };

        let bound = self.element();
        let effect = self.effect().map(|effect| effect.effect);
        debug!(property = property.name, ?effect, "set value");
        match (bound, effect) {
            (Some(_), Some(EffectKind::Reset)) => self.create_statement(property, value, true),
            (Some(id), Some(effect)) => match effect {
                EffectKind::Get | EffectKind::Val => Err(DslError::unsupported(property.name, Some(effect))),
                EffectKind::AddAsList | EffectKind::AugmentList if self.takes_any_arguments(id) => {
                    self.tree.append_call_arguments(id, items(value))
                }
                EffectKind::AddAsList | EffectKind::AugmentList => self.append_augmenting(property, value),
                EffectKind::ClearAndAugmentList if self.takes_any_arguments(id) => {
                    self.tree.set_call_arguments(id, items(value))
                }
                EffectKind::ClearAndAugmentList => self.set_list_argument(id, items(value)),
                EffectKind::AugmentMap => {
                    let DslValue::Map(entries) = value else {
                        return Err(DslError::malformed(property.name, "merge into", "value is not a map"));
                    };
                    if matches!(self.tree.element(id)?.kind(), ElementKind::Map { .. }) {
                        self.tree.merge_map_entries(id, entries)
                    } else {
                        self.append_augmenting(property, DslValue::Map(entries))
                    }
                }
                _ => self.tree.replace_value(id, value),
            },
            _ => self.create_statement(property, value, false),
        }
    }

    /// Whether the table row `id` matched accepts any number of arguments.
    fn takes_any_arguments(&self, id: ElementId) -> bool {
        self.tree.get(id).is_some_and(|element| {
            self.table
                .lookup_key(element.name(), element.arity())
                .is_some_and(|(key, _)| matches!(key.arity, Arity::AtLeast(_)))
        })
    }

    /// Rewrites a one-argument call so its argument is the list `items`.
    fn set_list_argument(&mut self, id: ElementId, items: Vec<DslValue>) -> Result<()> {
        self.tree.set_call_arguments(id, vec![DslValue::List(items)])?;
        if let Some(element) = self.tree.get_mut(id) {
            element.syntax = ExternalSyntax::Method;
        }
        Ok(())
    }

    /// Adds a statement after the existing ones that extends the collection.
    fn append_augmenting(&mut self, property: ModelPropertyDescription, value: DslValue) -> Result<()> {
        let Some((key, description)) = self.table.augmenting_write(&property) else {
            return Err(DslError::unsupported(property.name, None));
        };
        let args = if description.effect == EffectKind::AugmentMap { vec![value] } else { items(value) };
        let syntax = self.call_syntax(&args);
        trace!(property = property.name, surface = %key.name, "appending augmenting statement");
        self.tree.append_statement(self.owner, key.name, NewElement::Call { args, syntax })?;
        Ok(())
    }

    /// Writes `level` the way `jvmTarget` spells it.
    ///
    /// Levels the Kotlin compiler cannot target fail with
    /// [`DslError::MalformedStructure`] and leave the tree untouched.
    pub fn set_language_level(&mut self, level: LanguageLevel) -> Result<()> {
        let Some(target) = level.jvm_target() else {
            debug!(property = self.name(), %level, "unsupported language level");
            return Err(DslError::malformed(self.name(), "set language level of", "not a supported JVM target"));
        };
        self.set_value(target)
    }

    fn set_named(&mut self, value: DslValue) -> Result<()> {
        match self.element() {
            Some(id) => self.tree.replace_value(id, value),
            None => self.tree.set_new_literal(self.owner, self.target.name(), value).map(|_| ()),
        }
    }

    /// Writes the property in its preferred surface form.
    fn create_statement(&mut self, property: ModelPropertyDescription, value: DslValue, append: bool) -> Result<()> {
        let Some((key, description)) = self.table.preferred_write(&property, self.as_method) else {
            return Err(DslError::unsupported(property.name, None));
        };
        if !description.effect.is_writable() {
            return Err(DslError::unsupported(property.name, Some(description.effect)));
        }
        let new = match key.arity {
            Arity::Property => NewElement::Value(value),
            _ => {
                let args = if description.effect.is_augmenting() && description.effect != EffectKind::AugmentMap {
                    items(value)
                } else {
                    vec![value]
                };
                NewElement::Call {
                    syntax: self.call_syntax(&args),
                    args,
                }
            }
        };
        trace!(property = property.name, surface = %key.name, append, "writing new statement");
        if append {
            self.tree.append_statement(self.owner, &key.name, new)?;
        } else {
            self.tree.set_new_element(self.owner, &key.name, new)?;
        }
        Ok(())
    }

    fn call_syntax(&self, args: &[DslValue]) -> ExternalSyntax {
        match self.tree.dialect() {
            // `name [..]` would read as an index expression.
            Dialect::Groovy if args.len() == 1 && args[0].is_composite() => ExternalSyntax::Method,
            Dialect::Groovy if !args.is_empty() => ExternalSyntax::Command,
            _ => ExternalSyntax::Method,
        }
    }

    /// Empties the collection held by every contributing statement.
    pub fn reset(&mut self) -> Result<()> {
        let shape = self.shape();
        for id in self.elements() {
            let element = self.tree.element(id)?;
            if element
                .effect()
                .is_some_and(|effect| matches!(effect.effect, EffectKind::Get | EffectKind::Reset))
            {
                continue;
            }
            let list_literal = *element.kind() == (ElementKind::List { literal: true });
            let map_literal = *element.kind() == (ElementKind::Map { literal: true });
            let call = element.syntax().is_call();

            if map_literal || (!list_literal && !call && shape == PropertyShape::MutableMap) {
                self.tree.replace_value(id, DslValue::Map(IndexMap::new()))?;
            } else if list_literal || (!call && shape.is_list()) {
                self.tree.replace_value(id, DslValue::List(Vec::new()))?;
            } else if call && self.takes_any_arguments(id) {
                self.tree.set_call_arguments(id, Vec::new())?;
            } else if call {
                self.set_list_argument(id, Vec::new())?;
            }
        }
        Ok(())
    }

    /// Removes every statement for this property. Deleting an absent
    /// property does nothing.
    pub fn delete(&mut self) -> Result<()> {
        if self.tree.get(self.owner).is_none() {
            return Ok(());
        }
        let name = self.target.name().to_owned();
        self.tree.remove_property(self.owner, &name).map(|_| ())
    }
}

fn items(value: DslValue) -> Vec<DslValue> {
    match value {
        DslValue::List(items) => items,
        other => vec![other],
    }
}

fn append_items(folded: Option<DslValue>, args: Vec<DslValue>) -> DslValue {
    let mut list = match folded {
        Some(DslValue::List(list)) => list,
        _ => Vec::new(),
    };
    for arg in args {
        match arg {
            DslValue::List(inner) => list.extend(inner),
            other => list.push(other),
        }
    }
    DslValue::List(list)
}

fn merge_entries(folded: Option<DslValue>, args: Vec<DslValue>) -> DslValue {
    let mut map = match folded {
        Some(DslValue::Map(map)) => map,
        _ => IndexMap::new(),
    };
    match args.as_slice() {
        [key, value] if !value.is_composite() => {
            if let Some(key) = key.to_key() {
                map.insert(key, value.clone());
            }
        }
        _ => {
            for arg in args {
                if let DslValue::Map(entries) = arg {
                    map.extend(entries);
                }
            }
        }
    }
    DslValue::Map(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertyModelBuilder;
    use crate::parser::parse;
    use crate::semantics::{BlockKind, properties};

    fn block(tree: &DslTree, path: &[BlockKind]) -> ElementId {
        path.iter()
            .try_fold(tree.root(), |parent, &kind| tree.find_block(parent, kind))
            .unwrap()
    }

    #[test]
    fn test_fold_augmenting_calls() {
        let mut tree = parse(
            "android { splits { abi {\n include 'x86'\n include 'arm', 'mips'\n} } }",
            Dialect::Groovy,
        )
        .tree;
        let abi = block(&tree, &[BlockKind::Android, BlockKind::Splits, BlockKind::Abi]);
        let model = PropertyModelBuilder::create(&mut tree, abi, properties::INCLUDE).build_resolved();
        assert_eq!(model.value::<Vec<String>>(), Some(vec!["x86".into(), "arm".into(), "mips".into()]));
        assert_eq!(model.elements().len(), 2);
    }

    #[test]
    fn test_fold_reset_then_add() {
        let mut tree = parse(
            "android { splits { abi {\n include 'x86'\n reset()\n include 'arm'\n} } }",
            Dialect::Groovy,
        )
        .tree;
        let abi = block(&tree, &[BlockKind::Android, BlockKind::Splits, BlockKind::Abi]);
        let model = PropertyModelBuilder::create(&mut tree, abi, properties::INCLUDE).build_resolved();
        assert_eq!(model.value::<Vec<String>>(), Some(vec!["arm".to_owned()]));
    }

    #[test]
    fn test_get_is_not_writable() {
        let mut tree = parse("android { splits { abi {\n enable()\n} } }", Dialect::Groovy).tree;
        let abi = block(&tree, &[BlockKind::Android, BlockKind::Splits, BlockKind::Abi]);
        let mut model = PropertyModelBuilder::create(&mut tree, abi, properties::ENABLE).build_resolved();
        let err = model.set_value(true).unwrap_err();
        assert!(matches!(err, DslError::UnsupportedMutation { effect: Some(EffectKind::Get), .. }));
        assert!(!tree.is_modified());
    }

    #[test]
    fn test_unresolved_value_keeps_reference() {
        let mut tree = parse("ext.v = 30\nandroid {\n compileSdkVersion v\n}", Dialect::Groovy).tree;
        let android = block(&tree, &[BlockKind::Android]);
        let model = PropertyModelBuilder::create(&mut tree, android, properties::COMPILE_SDK_VERSION).build_resolved();
        assert_eq!(model.unresolved_value(), Some(DslValue::reference("v")));
        assert_eq!(model.value::<i64>(), Some(30));
    }

    #[test]
    fn test_merge_named_pair() {
        let merged = merge_entries(None, vec![DslValue::from("a"), DslValue::from("b")]);
        let mut expected = IndexMap::new();
        expected.insert("a".to_owned(), DslValue::from("b"));
        assert_eq!(merged, DslValue::Map(expected));
    }
}
