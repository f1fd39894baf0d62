//! Primitive transformers for weft.
//!
//! Conversions of scalar properties between memory, forms, display
//! markup and storage rows, plus the wildcard edit transformer used for
//! any type without one and the HTML container format step.
//!
//! # Key Types
//!
//! - [`BooleanEdit`], [`BooleanInput`], [`BooleanOutput`], [`BooleanRead`],
//!   [`BooleanSave`]
//! - [`NumberEdit`], [`NumberInput`], [`NumberOutput`], [`NumberRead`],
//!   [`BigIntInput`]
//! - [`DateEdit`], [`DateInput`], [`DateOutput`]
//! - [`DefaultEdit`] -- wildcard HTML EDIT
//! - [`ContainerFormat`] -- `<div>` wrapping of display values
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use weft_primitive::{init_container_transformers, init_primitive_transformers};
//! use weft_reflect::Schema;
//! use weft_store::InMemoryDataStore;
//! use weft_transform::{Collaborators, Dependencies, MapperConfig, TransformerRegistry};
//!
//! let c = Collaborators::new(
//!     Dependencies::default(),
//!     MapperConfig::default(),
//!     Arc::new(Schema::default()),
//!     Arc::new(InMemoryDataStore::new()),
//! );
//! let mut registry = TransformerRegistry::new();
//! init_primitive_transformers(&mut registry, &c);
//! init_container_transformers(&mut registry);
//! ```

pub mod boolean;
pub mod container;
pub mod date;
pub mod fallback;
pub mod number;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use weft_transform::{Collaborators, TransformerRegistry};
use weft_types::{Direction, Format, TypeKey};

// Re-exports for convenience.
pub use boolean::{parse_bool, BooleanEdit, BooleanInput, BooleanOutput, BooleanRead, BooleanSave};
pub use container::ContainerFormat;
pub use date::{DateEdit, DateInput, DateOutput};
pub use fallback::DefaultEdit;
pub use number::{
    format_number, parse_number, BigIntInput, NumberEdit, NumberInput, NumberOutput, NumberRead,
};

pub fn init_bigint_html_transformers(registry: &mut TransformerRegistry) {
    registry.register(
        Some(TypeKey::BigInt),
        Format::Html,
        Direction::Input,
        Arc::new(BigIntInput),
    );
}

pub fn init_boolean_html_transformers(registry: &mut TransformerRegistry, c: &Collaborators) {
    let key = Some(TypeKey::Bool);
    registry.register(
        key.clone(),
        Format::Html,
        Direction::Edit,
        Arc::new(BooleanEdit::new(c.clone())),
    );
    registry.register(
        key.clone(),
        Format::Html,
        Direction::Input,
        Arc::new(BooleanInput::new(c.clone())),
    );
    registry.register(
        key,
        Format::Html,
        Direction::Output,
        Arc::new(BooleanOutput::new(c.clone())),
    );
}

pub fn init_boolean_sql_transformers(registry: &mut TransformerRegistry) {
    let key = Some(TypeKey::Bool);
    registry.register(key.clone(), Format::Sql, Direction::Read, Arc::new(BooleanRead));
    registry.register(key, Format::Sql, Direction::Save, Arc::new(BooleanSave));
}

pub fn init_date_html_transformers(registry: &mut TransformerRegistry, c: &Collaborators) {
    let key = Some(TypeKey::Date);
    registry.register(
        key.clone(),
        Format::Html,
        Direction::Edit,
        Arc::new(DateEdit::new(c.clone())),
    );
    registry.register(
        key.clone(),
        Format::Html,
        Direction::Input,
        Arc::new(DateInput::new(c.clone())),
    );
    registry.register(key, Format::Html, Direction::Output, Arc::new(DateOutput::new(c.clone())));
}

/// Number transformers, including the SQL READ of text columns.
pub fn init_number_html_transformers(registry: &mut TransformerRegistry, c: &Collaborators) {
    let key = Some(TypeKey::Number);
    registry.register(
        key.clone(),
        Format::Html,
        Direction::Edit,
        Arc::new(NumberEdit::new(c.clone())),
    );
    registry.register(
        key.clone(),
        Format::Html,
        Direction::Input,
        Arc::new(NumberInput::new(c.clone())),
    );
    registry.register(
        key.clone(),
        Format::Html,
        Direction::Output,
        Arc::new(NumberOutput::new(c.clone())),
    );
    registry.register(key, Format::Sql, Direction::Read, Arc::new(NumberRead));
}

pub fn init_default_html_edit_transformers(registry: &mut TransformerRegistry, c: &Collaborators) {
    registry.register(None, Format::Html, Direction::Edit, Arc::new(DefaultEdit::new(c.clone())));
}

/// Every primitive transformer and the wildcard edit.
pub fn init_primitive_transformers(registry: &mut TransformerRegistry, c: &Collaborators) {
    init_bigint_html_transformers(registry);
    init_boolean_sql_transformers(registry);
    init_boolean_html_transformers(registry, c);
    init_date_html_transformers(registry, c);
    init_number_html_transformers(registry, c);
    init_default_html_edit_transformers(registry, c);
}

pub fn init_container_transformers(registry: &mut TransformerRegistry) {
    registry.register_format(Format::Html, Arc::new(ContainerFormat));
}
