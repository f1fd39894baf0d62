use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::ids::Identifier;
use crate::object::Object;

/// Default textual form of a date when no formatter is injected.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The value held by one property of an [`Object`].
///
/// Linked entities appear either hydrated ([`Value::Object`]) or as a
/// bare identifier stub ([`Value::Reference`]). Submitted form input
/// arrives as [`Value::Text`] (or [`Value::Map`] for nested fields)
/// before an INPUT transformer converts it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    BigInt(i128),
    Number(f64),
    Text(String),
    Date(NaiveDateTime),
    /// A linked entity known only by its identifier.
    Reference(Identifier),
    /// A linked object, transient or persisted.
    Object(Box<Object>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// The desired membership of a multi-reference property.
    Identifiers(Vec<Identifier>),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn object(object: Object) -> Self {
        Self::Object(Box::new(object))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(values) => Some(values),
            _ => None,
        }
    }

    /// Truthiness in the form-rendering sense: null, `false`, zero, and
    /// empty text or collections are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Integer(n) => *n != 0,
            Self::BigInt(n) => *n != 0,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Text(s) => !s.is_empty(),
            Self::Date(_) | Self::Reference(_) | Self::Object(_) => true,
            Self::List(values) => !values.is_empty(),
            Self::Map(entries) => !entries.is_empty(),
            Self::Identifiers(ids) => !ids.is_empty(),
        }
    }

    /// Plain string rendering used when no transformer is registered.
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Integer(n) => n.to_string(),
            Self::BigInt(n) => n.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
            Self::Date(d) => d.format(DEFAULT_DATE_FORMAT).to_string(),
            Self::Reference(id) => id.to_string(),
            Self::Object(object) => match object.id() {
                Some(id) => format!("{}#{id}", object.type_name()),
                None => object.type_name().to_string(),
            },
            Self::List(values) => values
                .iter()
                .map(Value::to_display_string)
                .collect::<Vec<_>>()
                .join(", "),
            Self::Map(entries) => entries
                .values()
                .map(Value::to_display_string)
                .collect::<Vec<_>>()
                .join(", "),
            Self::Identifiers(ids) => ids
                .iter()
                .map(Identifier::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Identifier> for Value {
    fn from(id: Identifier) -> Self {
        Self::Reference(id)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Self::Object(Box::new(object))
    }
}
