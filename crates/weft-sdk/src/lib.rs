//! High-level SDK for weft.
//!
//! Wires a schema, a data store, configuration and injected dependencies
//! into one [`Mapper`] whose registry carries every core transformer. This
//! is the main entry point for applications embedding weft.
//!
//! # Key Types
//!
//! - [`Mapper`] / [`MapperBuilder`] -- rendering, form input, two-phase save
//! - [`SaveSummary`] -- what one save wrote
//! - [`SdkError`] -- errors from every layer below
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use weft_sdk::{Mapper, Object, Schema};
//!
//! # async fn run() -> weft_sdk::SdkResult<()> {
//! let schema = Schema::from_toml_str(r#"
//!     [[types]]
//!     name = "Note"
//!     properties = [{ name = "text", type = "text" }]
//! "#)?;
//! let mapper = Mapper::builder(schema).build()?;
//! let mut note = Object::new("Note").with("text", "hello");
//! let summary = mapper.save(&mut note).await?;
//! assert!(summary.created);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod json;
pub mod mapper;
pub mod summary;

pub use error::{SdkError, SdkResult};
pub use json::{form_from_json, object_from_json, object_to_json, value_to_json};
pub use mapper::{Mapper, MapperBuilder};
pub use summary::SaveSummary;

// Re-export key types
pub use weft_reflect::{Precision, PropertySchema, Reflection, Schema, TypeSchema};
pub use weft_store::{DataStore, InMemoryDataStore};
pub use weft_transform::{Dependencies, LinkChanges, MapperConfig, NamingPolicy, TransformerRegistry};
pub use weft_types::{EntityRef, FormData, Identifier, Object, PropertyType, Record, TypeName, Value};

use weft_primitive::{init_container_transformers, init_primitive_transformers};
use weft_relation::{init_collection_transformers, init_store_transformers};
use weft_transform::Collaborators;

/// Register every core transformer: primitives, the HTML container step,
/// collections, and one single-reference synchronizer per linked type.
pub fn init_core_transformers(
    registry: &mut TransformerRegistry,
    c: &Collaborators,
    store_targets: &[TypeName],
) {
    init_primitive_transformers(registry, c);
    init_container_transformers(registry);
    init_collection_transformers(registry, c);
    for target in store_targets {
        init_store_transformers(registry, target, c);
    }
}
