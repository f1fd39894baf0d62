//! Transformer registry for weft.
//!
//! A transformer converts one property value between its in-memory form
//! and one external representation: editable markup, submitted form data,
//! display markup, or a storage row. Transformers are registered per
//! (subject type, [`Format`](weft_types::Format),
//! [`Direction`](weft_types::Direction)) and resolved most-specific first,
//! falling back to the wildcard registration of the (format, direction)
//! pair. A miss is not an error: the value passes through unchanged.
//!
//! # Key Types
//!
//! - [`Transformer`] -- async conversion of one property value
//! - [`Transformed`] -- the value to assign, an "already applied" marker,
//!   or a [`DeferredSave`] to commit once the owner's identifier is final
//! - [`TransformerRegistry`] -- registration and resolution
//! - [`Dependencies`] -- injected labels, routes, translation, dates
//! - [`Collaborators`] -- dependencies, config, reflection and store,
//!   shared by every transformer
//! - [`MapperConfig`] / [`NamingPolicy`] -- serializable settings
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use weft_transform::{FnTransformer, Transformed, TransformerRegistry};
//! use weft_types::{Direction, Format, TypeKey, Value};
//!
//! let mut registry = TransformerRegistry::new();
//! registry.register(
//!     None,
//!     Format::Html,
//!     Direction::Output,
//!     Arc::new(FnTransformer::new("plain", |value: Value, _| {
//!         Ok(Transformed::Applied(Value::text(value.to_display_string())))
//!     })),
//! );
//! let found = registry.resolve(&TypeKey::Number, Format::Html, Direction::Output);
//! assert_eq!(found.map(|t| t.name().to_string()), Some("plain".into()));
//! ```

pub mod collaborators;
pub mod config;
pub mod deps;
pub mod error;
pub mod markup;
pub mod registry;
pub mod transformer;

// Re-exports for convenience.
pub use collaborators::Collaborators;
pub use config::{MapperConfig, NamingPolicy, NumberFormat};
pub use deps::Dependencies;
pub use error::{SavePhase, TransformError, TransformResult};
pub use registry::TransformerRegistry;
pub use transformer::{
    Call, Context, DeferredSave, FnTransformer, FormatTransformer, HtmlContainer, LinkChanges,
    Transformed, Transformer,
};
