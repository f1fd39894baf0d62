use weft_types::{EntityRef, TypeError, TypeName};

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested row does not exist.
    #[error("entity not found: {0}")]
    NotFound(EntityRef),

    /// The backend refused to persist the value.
    #[error("constraint violation on {type_name}: {reason}")]
    ConstraintViolation { type_name: TypeName, reason: String },

    /// Identifier bookkeeping failed (e.g. a reassignment attempt).
    #[error("identity error: {0}")]
    Identity(#[from] TypeError),

    /// An in-memory backend lock was poisoned by a panicking writer.
    #[error("store lock poisoned: {0}")]
    LockPoisoned(String),

    /// Any other backend failure.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
