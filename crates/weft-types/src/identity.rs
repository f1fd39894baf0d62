//! Identity resolution: does a candidate value denote a persisted entity,
//! and if so, which one?
//!
//! Candidates come in three shapes: a hydrated (or stub) [`Object`], a
//! bare identifier ([`Value::Reference`] or a positive [`Value::Integer`]),
//! or raw scalar text typed into a form. Resolution is pure and
//! idempotent: the same value always yields the same verdict.

use crate::ids::Identifier;
use crate::object::Object;
use crate::value::Value;

/// Classification of a value that may denote a linked entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MaybeEntity<'a> {
    /// A persisted entity, hydrated or known only by identifier.
    Connected(Identifier),
    /// An object the store has not assigned an identifier yet.
    TransientObject(&'a Object),
    /// Raw text used to construct a brand-new value of the linked type.
    RawScalar(&'a str),
    /// No linked value at all.
    Absent,
}

impl<'a> MaybeEntity<'a> {
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Object(object) => match object.id() {
                Some(id) => Self::Connected(id),
                None => Self::TransientObject(object),
            },
            Value::Reference(id) => Self::Connected(*id),
            Value::Integer(n) => u64::try_from(*n)
                .ok()
                .and_then(Identifier::new)
                .map_or(Self::Absent, Self::Connected),
            Value::Text(text) => Self::RawScalar(text),
            _ => Self::Absent,
        }
    }

    pub fn identifier(&self) -> Option<Identifier> {
        match self {
            Self::Connected(id) => Some(*id),
            _ => None,
        }
    }
}

/// `true` iff the value is an entity that has already been assigned an
/// identifier.
pub fn is_connected(value: &Value) -> bool {
    identifier_of(value).is_some()
}

/// The identifier of the entity the value denotes, if it is persisted.
pub fn identifier_of(value: &Value) -> Option<Identifier> {
    MaybeEntity::classify(value).identifier()
}
