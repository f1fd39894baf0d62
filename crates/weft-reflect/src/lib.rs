//! Reflection for weft.
//!
//! Transformers need to know what a property holds: its declared type,
//! the element type of a collection, whether linked objects are owned by
//! their container, and which properties make up an object's
//! representative string. The [`Reflection`] trait is that boundary;
//! [`Schema`] is a declarative implementation loaded from TOML.

pub mod error;
pub mod schema;
pub mod traits;

pub use error::ReflectError;
pub use schema::{Precision, PropertySchema, Schema, TypeSchema};
pub use traits::Reflection;
