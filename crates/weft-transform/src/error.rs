use std::fmt;

use weft_store::StoreError;
use weft_types::{TypeError, TypeName};

/// Stage of a relation save at which a failure happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SavePhase {
    /// Cascading saves of not-yet-connected linked values.
    Resolving,
    /// Reading the previously persisted membership.
    Diffing,
    /// Issuing link inserts and deletes.
    Reconciling,
}

impl fmt::Display for SavePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolving => f.write_str("resolving"),
            Self::Diffing => f.write_str("diffing"),
            Self::Reconciling => f.write_str("reconciling"),
        }
    }
}

/// Errors that can occur while transforming a property value.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// A store call failed outside relation reconciliation.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A store call failed while saving a relation. The store error is
    /// kept unchanged as the source.
    #[error("relation '{property}' failed while {phase}: {source}")]
    Relation {
        property: String,
        phase: SavePhase,
        #[source]
        source: StoreError,
    },

    /// Identifier bookkeeping failed.
    #[error("type error: {0}")]
    Type(#[from] TypeError),

    /// The transformer was invoked without the context its direction needs.
    #[error("transformer '{transformer}' requires {expected} context")]
    MissingContext {
        transformer: String,
        expected: &'static str,
    },

    /// Reflection knows nothing about the property.
    #[error("unknown property {type_name}.{property}")]
    UnknownProperty { type_name: TypeName, property: String },

    /// Configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransformError {
    pub fn relation(property: impl Into<String>, phase: SavePhase, source: StoreError) -> Self {
        Self::Relation {
            property: property.into(),
            phase,
            source,
        }
    }

    /// The underlying store error, wherever it was raised.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            Self::Store(e) | Self::Relation { source: e, .. } => Some(e),
            _ => None,
        }
    }
}

/// Result alias for transformations.
pub type TransformResult<T> = Result<T, TransformError>;
