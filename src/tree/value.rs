//! Values carried by tree elements, and conversions out of them.

use indexmap::IndexMap;

/// A value as written in a build script.
///
/// `Reference` holds an unresolved dotted/indexed name; `Expression` holds
/// raw text the model does not interpret (`file("x")`, `a + b`).
#[derive(Clone, Debug, PartialEq)]
pub enum DslValue {
    String(String),
    Integer(i64),
    Decimal(f64),
    Boolean(bool),
    Reference(String),
    Expression(String),
    List(Vec<DslValue>),
    Map(IndexMap<String, DslValue>),
}

/// The variant of a [`DslValue`], without its payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Integer,
    Decimal,
    Boolean,
    Reference,
    Expression,
    List,
    Map,
}

impl DslValue {
    pub fn reference(text: impl Into<String>) -> Self {
        DslValue::Reference(text.into())
    }

    pub fn expression(text: impl Into<String>) -> Self {
        DslValue::Expression(text.into())
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            DslValue::String(_) => ValueType::String,
            DslValue::Integer(_) => ValueType::Integer,
            DslValue::Decimal(_) => ValueType::Decimal,
            DslValue::Boolean(_) => ValueType::Boolean,
            DslValue::Reference(_) => ValueType::Reference,
            DslValue::Expression(_) => ValueType::Expression,
            DslValue::List(_) => ValueType::List,
            DslValue::Map(_) => ValueType::Map,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, DslValue::List(_) | DslValue::Map(_))
    }

    /// Text of a string, reference or expression value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DslValue::String(s) | DslValue::Reference(s) | DslValue::Expression(s) => Some(s),
            _ => None,
        }
    }

    /// Key text used when this value is the key of a two-argument map call.
    pub(crate) fn to_key(&self) -> Option<String> {
        match self {
            DslValue::String(s) | DslValue::Reference(s) => Some(s.clone()),
            DslValue::Integer(i) => Some(i.to_string()),
            DslValue::Boolean(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl From<&str> for DslValue {
    fn from(value: &str) -> Self {
        DslValue::String(value.to_owned())
    }
}

impl From<String> for DslValue {
    fn from(value: String) -> Self {
        DslValue::String(value)
    }
}

impl From<i64> for DslValue {
    fn from(value: i64) -> Self {
        DslValue::Integer(value)
    }
}

impl From<i32> for DslValue {
    fn from(value: i32) -> Self {
        DslValue::Integer(i64::from(value))
    }
}

impl From<u32> for DslValue {
    fn from(value: u32) -> Self {
        DslValue::Integer(i64::from(value))
    }
}

impl From<bool> for DslValue {
    fn from(value: bool) -> Self {
        DslValue::Boolean(value)
    }
}

impl From<f64> for DslValue {
    fn from(value: f64) -> Self {
        DslValue::Decimal(value)
    }
}

impl<T: Into<DslValue>> From<Vec<T>> for DslValue {
    fn from(items: Vec<T>) -> Self {
        DslValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<DslValue>> From<IndexMap<String, T>> for DslValue {
    fn from(entries: IndexMap<String, T>) -> Self {
        DslValue::Map(entries.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

/// Typed extraction from a [`DslValue`].
///
/// A value of the wrong variant converts to `None`; reading never fails.
pub trait FromDslValue: Sized {
    fn from_dsl_value(value: &DslValue) -> Option<Self>;
}

impl FromDslValue for DslValue {
    fn from_dsl_value(value: &DslValue) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromDslValue for String {
    fn from_dsl_value(value: &DslValue) -> Option<Self> {
        match value {
            DslValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromDslValue for i64 {
    fn from_dsl_value(value: &DslValue) -> Option<Self> {
        match value {
            DslValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromDslValue for i32 {
    fn from_dsl_value(value: &DslValue) -> Option<Self> {
        i64::from_dsl_value(value).and_then(|i| i32::try_from(i).ok())
    }
}

impl FromDslValue for u32 {
    fn from_dsl_value(value: &DslValue) -> Option<Self> {
        i64::from_dsl_value(value).and_then(|i| u32::try_from(i).ok())
    }
}

impl FromDslValue for f64 {
    fn from_dsl_value(value: &DslValue) -> Option<Self> {
        match value {
            DslValue::Decimal(d) => Some(*d),
            DslValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl FromDslValue for bool {
    fn from_dsl_value(value: &DslValue) -> Option<Self> {
        match value {
            DslValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl<T: FromDslValue> FromDslValue for Vec<T> {
    fn from_dsl_value(value: &DslValue) -> Option<Self> {
        match value {
            DslValue::List(items) => items.iter().map(T::from_dsl_value).collect(),
            _ => None,
        }
    }
}

impl<T: FromDslValue> FromDslValue for IndexMap<String, T> {
    fn from_dsl_value(value: &DslValue) -> Option<Self> {
        match value {
            DslValue::Map(entries) => entries
                .iter()
                .map(|(k, v)| T::from_dsl_value(v).map(|v| (k.clone(), v)))
                .collect(),
            _ => None,
        }
    }
}
