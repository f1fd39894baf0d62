use thiserror::Error;

use crate::ids::{Identifier, TypeName};

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("invalid property type: {0:?}")]
    InvalidPropertyType(String),

    #[error("{type_name} already has identifier {current}, cannot reassign {requested}")]
    IdentifierReassigned {
        type_name: TypeName,
        current: Identifier,
        requested: Identifier,
    },

    #[error("{0} is transient: it has no identifier yet")]
    Transient(TypeName),
}
