//! Store access for weft.
//!
//! The transformation core never talks to a database directly: it issues
//! calls through the [`DataStore`] trait. A store persists transient
//! entities (assigning their identifier), writes owner rows, and reads or
//! mutates the link edges of multi-reference properties.
//!
//! # Storage Backends
//!
//! - [`InMemoryDataStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Identifiers are assigned exactly once, at an entity's first save.
//! 2. Each insert/delete/save call is atomic on its own; a sequence of
//!    calls is not. Callers wanting all-or-nothing relation updates wrap
//!    the whole save in a transaction of their backend.
//! 3. All backend errors are propagated, never silently ignored.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryDataStore, StoreOp};
pub use traits::DataStore;
