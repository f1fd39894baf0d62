use async_trait::async_trait;
use weft_types::{EntityRef, Identifier, Object, Record, TypeName};

use crate::error::StoreResult;

/// Store access consumed by the transformation core.
///
/// Every method that touches the backend is async: the core suspends at
/// each store call and may issue independent calls concurrently, so
/// implementations must be `Send + Sync` and safe under concurrent calls
/// for the same owner.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// `true` iff the object is a persisted entity.
    ///
    /// The default trusts the identifier the object carries, which is what
    /// the identity resolver does too.
    fn is_connected(&self, object: &Object) -> bool {
        !object.is_transient()
    }

    /// Persist a transient object and return it carrying its identifier.
    ///
    /// Saving an already connected object updates its row and keeps its
    /// identifier.
    async fn save(&self, object: Object) -> StoreResult<Object>;

    /// Write an owner's row. Assigns and returns a new identifier when
    /// `id` is `None`.
    async fn write_record(
        &self,
        type_name: &TypeName,
        id: Option<Identifier>,
        record: &Record,
    ) -> StoreResult<Identifier>;

    /// Read an entity's row. Returns `Ok(None)` if it does not exist.
    async fn read_record(&self, entity: &EntityRef) -> StoreResult<Option<Record>>;

    /// The persisted membership of a multi-reference property.
    async fn read_linked_ids(
        &self,
        owner: &EntityRef,
        property: &str,
    ) -> StoreResult<Vec<Identifier>>;

    /// Add one membership edge.
    async fn insert_link(&self, owner: &EntityRef, property: &str, id: Identifier)
        -> StoreResult<()>;

    /// Remove one membership edge.
    async fn delete_link(&self, owner: &EntityRef, property: &str, id: Identifier)
        -> StoreResult<()>;
}
