//! Per-dialect lookup tables from surface syntax to model effects.

use std::fmt;

use rustc_hash::FxHashMap;

use super::description::{Arity, EffectKind, ModelEffectDescription, ModelPropertyDescription, PropertyShape};

/// One of the two concrete build-script syntaxes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// `build.gradle`: method-call oriented, paren-less calls allowed.
    Groovy,
    /// `build.gradle.kts`: property/setter oriented.
    Kotlin,
}

impl Dialect {
    /// Picks the dialect from a build file name.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        if file_name.ends_with(".gradle.kts") {
            Some(Dialect::Kotlin)
        } else if file_name.ends_with(".gradle") {
            Some(Dialect::Groovy)
        } else {
            None
        }
    }

    /// Maps a surface name segment to its internal spelling.
    ///
    /// Kotlin scripts spell the extra-properties block `extra`.
    pub fn internal_name(self, segment: &str) -> &str {
        match (self, segment) {
            (Dialect::Kotlin, "extra") => "ext",
            _ => segment,
        }
    }
}

/// A surface token and the invocation shape it was used with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceKey {
    pub name: &'static str,
    pub arity: Arity,
}

/// A table row: `(surface name, arity, property, effect)`.
pub type SemanticsRow = (&'static str, Arity, ModelPropertyDescription, EffectKind);

/// Immutable mapping from `(surface name, arity)` to a model effect.
///
/// Keys are unique within a table. Row order is kept so reverse lookups are
/// deterministic.
#[derive(Default)]
pub struct ExternalToModelMap {
    by_name: FxHashMap<&'static str, Vec<(Arity, ModelEffectDescription)>>,
    rows: Vec<(SurfaceKey, ModelEffectDescription)>,
}

impl ExternalToModelMap {
    /// Builds a table from static rows.
    ///
    /// # Panics
    /// Panics on a duplicate `(name, arity)` key; tables are static data.
    pub fn from_rows(rows: &[SemanticsRow]) -> Self {
        let mut map = Self::default();
        for &(name, arity, property, effect) in rows {
            let description = ModelEffectDescription::new(property, effect);
            let entries = map.by_name.entry(name).or_default();
            assert!(
                entries.iter().all(|(existing, _)| *existing != arity),
                "duplicate semantics key ({name}, {arity:?})"
            );
            entries.push((arity, description));
            map.rows.push((SurfaceKey { name, arity }, description));
        }
        map
    }

    /// Looks up a surface token.
    ///
    /// A property key only matches a property entry. A call with `n`
    /// arguments matches `Exactly(n)` first, then the tightest `AtLeast(k)`.
    pub fn lookup(&self, name: &str, arity: Arity) -> Option<ModelEffectDescription> {
        self.lookup_key(name, arity).map(|(_, description)| description)
    }

    /// Like [`lookup`](Self::lookup), but also returns the row key that matched.
    pub fn lookup_key(&self, name: &str, arity: Arity) -> Option<(SurfaceKey, ModelEffectDescription)> {
        let (&name, entries) = self.by_name.get_key_value(name)?;
        let key = |arity| SurfaceKey { name, arity };
        if let Some((candidate, description)) = entries.iter().find(|(candidate, _)| *candidate == arity) {
            return Some((key(*candidate), *description));
        }
        let Arity::Exactly(count) = arity else {
            return None;
        };
        entries
            .iter()
            .filter(|(candidate, _)| matches!(candidate, Arity::AtLeast(min) if *min <= count))
            .max_by_key(|(candidate, _)| match candidate {
                Arity::AtLeast(min) => *min,
                _ => 0,
            })
            .map(|(candidate, description)| (key(*candidate), *description))
    }

    /// All rows that target `property`, in table order.
    pub fn entries_for(
        &self,
        property: &ModelPropertyDescription,
    ) -> impl Iterator<Item = &(SurfaceKey, ModelEffectDescription)> {
        let name = property.name;
        self.rows.iter().filter(move |(_, description)| description.property.name == name)
    }

    /// The row used to write `property` when it is not in the script yet.
    ///
    /// Assignment is preferred unless `as_method` asks for a setter call.
    /// Collection properties without either form fall back to their
    /// augmenting call.
    pub fn preferred_write(
        &self,
        property: &ModelPropertyDescription,
        as_method: bool,
    ) -> Option<(SurfaceKey, ModelEffectDescription)> {
        let find = |wanted: fn(&SurfaceKey, EffectKind) -> bool| {
            self.entries_for(property)
                .find(|(key, description)| wanted(key, description.effect))
                .copied()
        };
        let assign = || find(|key, effect| key.arity == Arity::Property && effect == EffectKind::Var);
        let setter = || find(|key, effect| key.arity == Arity::Exactly(1) && effect == EffectKind::Set);

        let primary = if as_method { setter().or_else(assign) } else { assign().or_else(setter) };
        primary.or_else(|| match property.shape {
            PropertyShape::Scalar => None,
            PropertyShape::MutableMap => find(|_, effect| effect == EffectKind::AugmentMap),
            PropertyShape::MutableList | PropertyShape::MutableSet => find(|key, effect| {
                matches!(effect, EffectKind::AugmentList | EffectKind::AddAsList)
                    && matches!(key.arity, Arity::AtLeast(_))
            }),
        })
    }

    /// The row that adds to a collection property without replacing it.
    ///
    /// Maps use their single-argument merge call. Lists use a call that
    /// takes any number of arguments, so appended items keep matching it.
    pub fn augmenting_write(&self, property: &ModelPropertyDescription) -> Option<(SurfaceKey, ModelEffectDescription)> {
        self.entries_for(property)
            .find(|(key, description)| match property.shape {
                PropertyShape::Scalar => false,
                PropertyShape::MutableMap => {
                    description.effect == EffectKind::AugmentMap && key.arity == Arity::Exactly(1)
                }
                PropertyShape::MutableList | PropertyShape::MutableSet => {
                    matches!(description.effect, EffectKind::AugmentList | EffectKind::AddAsList)
                        && matches!(key.arity, Arity::AtLeast(_))
                }
            })
            .copied()
    }

    /// The model property a surface name refers to, whatever its arity.
    pub fn description_for(&self, name: &str) -> Option<ModelPropertyDescription> {
        self.by_name
            .get(name)
            .and_then(|entries| entries.first())
            .map(|(_, description)| description.property)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(SurfaceKey, ModelEffectDescription)> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl fmt::Debug for ExternalToModelMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalToModelMap")
            .field("rows", &self.rows.len())
            .finish()
    }
}
