//! Relation synchronization for weft.
//!
//! Two kinds of relation properties link an owner to other entities:
//!
//! - a **single reference** ("store") holds zero or one linked entity and
//!   persists as a foreign-key column on the owner's row;
//! - a **collection** holds many linked entities and persists as link
//!   edges reconciled against the previously stored membership.
//!
//! Each kind gets four transformers (HTML EDIT, INPUT and OUTPUT, SQL
//! SAVE). Saving a collection is two-phase: the SAVE transformer returns a
//! [`PendingLinks`] that is committed once the owner's identifier is
//! final.
//!
//! # Key Types
//!
//! - [`StoreEdit`], [`StoreInput`], [`StoreOutput`], [`StoreSave`]
//! - [`CollectionEdit`], [`CollectionInput`], [`CollectionOutput`],
//!   [`CollectionSave`]
//! - [`PendingLinks`] -- deferred link reconciliation
//! - [`LinkDiff`] / [`diff_links`] -- the previous-vs-desired diff

pub mod collection;
pub mod diff;
pub mod pending;
pub mod store;

use std::sync::Arc;

use weft_transform::{Collaborators, TransformerRegistry};
use weft_types::{Direction, Format, TypeKey, TypeName};

// Re-exports for convenience.
pub use collection::{CollectionEdit, CollectionInput, CollectionOutput, CollectionSave};
pub use diff::{diff_links, LinkDiff};
pub use pending::{DesiredLinks, PendingLinks};
pub use store::{StoreEdit, StoreInput, StoreOutput, StoreSave};

/// Register the HTML transformers of single references to `target`.
pub fn init_store_html_transformers(
    registry: &mut TransformerRegistry,
    target: &TypeName,
    c: &Collaborators,
) {
    let key = Some(TypeKey::Store(target.clone()));
    registry.register(
        key.clone(),
        Format::Html,
        Direction::Edit,
        Arc::new(StoreEdit::new(c.clone())),
    );
    registry.register(
        key.clone(),
        Format::Html,
        Direction::Input,
        Arc::new(StoreInput::new(c.clone())),
    );
    registry.register(key, Format::Html, Direction::Output, Arc::new(StoreOutput::new(c.clone())));
}

/// Register the SQL transformers of single references to `target`.
pub fn init_store_sql_transformers(
    registry: &mut TransformerRegistry,
    target: &TypeName,
    c: &Collaborators,
) {
    registry.register(
        Some(TypeKey::Store(target.clone())),
        Format::Sql,
        Direction::Save,
        Arc::new(StoreSave::new(c.clone())),
    );
}

pub fn init_store_transformers(
    registry: &mut TransformerRegistry,
    target: &TypeName,
    c: &Collaborators,
) {
    init_store_html_transformers(registry, target, c);
    init_store_sql_transformers(registry, target, c);
}

/// Register the HTML transformers shared by every collection.
pub fn init_collection_html_transformers(registry: &mut TransformerRegistry, c: &Collaborators) {
    let key = Some(TypeKey::Collection);
    registry.register(
        key.clone(),
        Format::Html,
        Direction::Edit,
        Arc::new(CollectionEdit::new(c.clone())),
    );
    registry.register(
        key.clone(),
        Format::Html,
        Direction::Input,
        Arc::new(CollectionInput::new(c.clone())),
    );
    registry.register(
        key,
        Format::Html,
        Direction::Output,
        Arc::new(CollectionOutput::new(c.clone())),
    );
}

pub fn init_collection_sql_transformers(registry: &mut TransformerRegistry, c: &Collaborators) {
    registry.register(
        Some(TypeKey::Collection),
        Format::Sql,
        Direction::Save,
        Arc::new(CollectionSave::new(c.clone())),
    );
}

pub fn init_collection_transformers(registry: &mut TransformerRegistry, c: &Collaborators) {
    init_collection_html_transformers(registry, c);
    init_collection_sql_transformers(registry, c);
}
