//! Descriptions of model properties and of the effect a surface token has on them.

use std::fmt;

/// Invocation shape of a surface token.
///
/// The same name can mean different things depending on how it is used:
/// `enable = true` assigns, `enable true` calls a setter and `enable()` reads.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Arity {
    /// Bare property reference or assignment target.
    Property,
    /// Call with exactly this many arguments.
    Exactly(u8),
    /// Call with at least this many arguments.
    AtLeast(u8),
}

impl Arity {
    /// Arity of a call with `count` arguments.
    pub fn of_call(count: usize) -> Self {
        Arity::Exactly(u8::try_from(count).unwrap_or(u8::MAX))
    }

    /// Whether a call with `count` arguments is accepted by this arity.
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Property => false,
            Arity::Exactly(n) => usize::from(n) == count,
            Arity::AtLeast(n) => count >= usize::from(n),
        }
    }
}

/// What a surface token does to its model property.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Reads the property; no setter is modelled.
    Get,
    /// Read-only property reference.
    Val,
    /// Assignable property.
    Var,
    /// Single-argument setter call.
    Set,
    /// Call whose arguments are appended as list items.
    AddAsList,
    /// Call or assignment that appends to an existing list.
    AugmentList,
    /// Call that replaces the list with its arguments.
    ClearAndAugmentList,
    /// Call that merges entries into an existing map.
    AugmentMap,
    /// Call that discards all collection contents.
    Reset,
    /// Recognised token with no specific semantics; treated like `Var`.
    Other,
}

impl EffectKind {
    /// Whether a value can be written through a statement with this effect.
    pub fn is_writable(self) -> bool {
        !matches!(self, EffectKind::Get | EffectKind::Val)
    }

    /// Whether the statement adds to a collection instead of replacing it.
    pub fn is_augmenting(self) -> bool {
        matches!(
            self,
            EffectKind::AddAsList
                | EffectKind::AugmentList
                | EffectKind::ClearAndAugmentList
                | EffectKind::AugmentMap
        )
    }
}

/// Container shape a model property is expected to hold.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropertyShape {
    Scalar,
    MutableList,
    MutableSet,
    MutableMap,
}

impl PropertyShape {
    pub fn is_list(self) -> bool {
        matches!(self, PropertyShape::MutableList | PropertyShape::MutableSet)
    }
}

/// A dialect-independent model property.
///
/// `name` is stable across dialects and is what block models ask for; the
/// surface spelling lives in the per-dialect tables.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct ModelPropertyDescription {
    pub name: &'static str,
    pub shape: PropertyShape,
}

impl ModelPropertyDescription {
    pub const fn new(name: &'static str, shape: PropertyShape) -> Self {
        Self { name, shape }
    }

    pub const fn scalar(name: &'static str) -> Self {
        Self::new(name, PropertyShape::Scalar)
    }
}

impl fmt::Debug for ModelPropertyDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:?}", self.name, self.shape)
    }
}

/// The resolved meaning of one surface token: which property, and how.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModelEffectDescription {
    pub property: ModelPropertyDescription,
    pub effect: EffectKind,
}

impl ModelEffectDescription {
    pub const fn new(property: ModelPropertyDescription, effect: EffectKind) -> Self {
        Self { property, effect }
    }
}
