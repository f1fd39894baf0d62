//! Foundation types for weft.
//!
//! This crate provides the object model every other weft crate works on:
//! typed objects with optional store-assigned identifiers, the dynamic
//! [`Value`] a property holds, storage [`Record`]s and submitted
//! [`FormData`], and the identity resolver that decides whether a value
//! denotes a persisted entity.
//!
//! # Key Types
//!
//! - [`Identifier`] -- opaque, ordered, store-assigned entity identifier
//! - [`TypeName`] -- name of a declared object type
//! - [`Object`] -- a typed object, transient until it carries an identifier
//! - [`PersistedOwner`] -- an object whose identifier is known to be final
//! - [`Value`] -- the value of one property
//! - [`PropertyType`] / [`TypeKey`] -- declared property types and the
//!   registry keys derived from them
//! - [`Format`] / [`Direction`] -- representation axes of a transformation
//! - [`MaybeEntity`] -- classification of a candidate linked value

pub mod error;
pub mod format;
pub mod identity;
pub mod ids;
pub mod object;
pub mod record;
pub mod value;

pub use error::TypeError;
pub use format::{Direction, Format, PropertyType, TypeKey};
pub use identity::{identifier_of, is_connected, MaybeEntity};
pub use ids::{EntityRef, Identifier, TypeName};
pub use object::{Object, PersistedOwner};
pub use record::{FormData, Record};
pub use value::Value;
