use std::collections::{BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::debug;
use weft_types::{EntityRef, Identifier, Object, Record, TypeName};

use crate::error::{StoreError, StoreResult};
use crate::traits::DataStore;

/// One call issued against an [`InMemoryDataStore`], in issue order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreOp {
    Save { entity: EntityRef },
    WriteRecord { entity: EntityRef },
    ReadRecord { entity: EntityRef },
    ReadLinks { owner: EntityRef, property: String },
    InsertLink { owner: EntityRef, property: String, id: Identifier },
    DeleteLink { owner: EntityRef, property: String, id: Identifier },
}

impl StoreOp {
    /// `true` for calls that change stored state.
    pub fn is_write(&self) -> bool {
        !matches!(self, Self::ReadRecord { .. } | Self::ReadLinks { .. })
    }
}

#[derive(Default)]
struct Inner {
    sequences: HashMap<TypeName, u64>,
    rows: HashMap<EntityRef, Record>,
    links: HashMap<(EntityRef, String), BTreeSet<Identifier>>,
    required: HashMap<TypeName, Vec<String>>,
    ops: Vec<StoreOp>,
}

impl Inner {
    fn next_id(&mut self, type_name: &TypeName) -> StoreResult<Identifier> {
        let seq = self.sequences.entry(type_name.clone()).or_insert(0);
        *seq = seq
            .checked_add(1)
            .ok_or_else(|| StoreError::Backend(format!("identifier sequence exhausted for {type_name}")))?;
        Identifier::new(*seq)
            .ok_or_else(|| StoreError::Backend(format!("invalid identifier for {type_name}")))
    }

    /// Keep the sequence ahead of identifiers supplied by callers.
    fn observe_id(&mut self, type_name: &TypeName, id: Identifier) {
        let seq = self.sequences.entry(type_name.clone()).or_insert(0);
        *seq = (*seq).max(id.get());
    }

    fn check_required(&self, object: &Object) -> StoreResult<()> {
        let Some(required) = self.required.get(object.type_name()) else {
            return Ok(());
        };
        for property in required {
            if !object.get(property).is_some_and(|v| v.is_truthy()) {
                return Err(StoreError::ConstraintViolation {
                    type_name: object.type_name().clone(),
                    reason: format!("required property '{property}' is empty"),
                });
            }
        }
        Ok(())
    }
}

/// In-memory, HashMap-based data store.
///
/// Intended for tests and embedding. Rows, link edges, and per-type
/// identifier sequences live behind a `RwLock`. Every call is appended to
/// an operation log so callers can observe exactly what was issued.
pub struct InMemoryDataStore {
    inner: RwLock<Inner>,
}

impl InMemoryDataStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Refuse to save objects of `type_name` whose `property` is empty.
    ///
    /// The store is owned here, so the rule is written without locking.
    pub fn require(
        mut self,
        type_name: impl Into<TypeName>,
        property: impl Into<String>,
    ) -> Self {
        let inner = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        inner
            .required
            .entry(type_name.into())
            .or_default()
            .push(property.into());
        self
    }

    fn read_inner(&self) -> StoreResult<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn write_inner(&self) -> StoreResult<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    /// All calls issued so far, in order.
    pub fn ops(&self) -> StoreResult<Vec<StoreOp>> {
        Ok(self.read_inner()?.ops.clone())
    }

    /// Forget the operation log (stored data is kept).
    pub fn clear_ops(&self) -> StoreResult<()> {
        self.write_inner()?.ops.clear();
        Ok(())
    }

    /// Number of stored rows.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read_inner()?.rows.len())
    }

    /// Returns `true` if no rows are stored.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.read_inner()?.rows.is_empty())
    }

    /// Current link membership, sorted ascending. Not logged.
    pub fn links(&self, owner: &EntityRef, property: &str) -> StoreResult<Vec<Identifier>> {
        let inner = self.read_inner()?;
        Ok(inner
            .links
            .get(&(owner.clone(), property.to_string()))
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default())
    }

    /// A stored row. Not logged.
    pub fn row(&self, entity: &EntityRef) -> StoreResult<Option<Record>> {
        Ok(self.read_inner()?.rows.get(entity).cloned())
    }
}

impl Default for InMemoryDataStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataStore for InMemoryDataStore {
    async fn save(&self, mut object: Object) -> StoreResult<Object> {
        let mut inner = self.write_inner()?;
        inner.check_required(&object)?;
        let id = match object.id() {
            Some(id) => {
                inner.observe_id(object.type_name(), id);
                id
            }
            None => {
                let id = inner.next_id(object.type_name())?;
                object.assign_id(id)?;
                id
            }
        };
        let entity = EntityRef::new(object.type_name().clone(), id);
        let record: Record = object
            .fields()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        debug!(entity = %entity, "saved entity");
        inner.rows.insert(entity.clone(), record);
        inner.ops.push(StoreOp::Save { entity });
        Ok(object)
    }

    async fn write_record(
        &self,
        type_name: &TypeName,
        id: Option<Identifier>,
        record: &Record,
    ) -> StoreResult<Identifier> {
        let mut inner = self.write_inner()?;
        let id = match id {
            Some(id) => {
                inner.observe_id(type_name, id);
                id
            }
            None => inner.next_id(type_name)?,
        };
        let entity = EntityRef::new(type_name.clone(), id);
        debug!(entity = %entity, columns = record.len(), "wrote record");
        inner.rows.insert(entity.clone(), record.clone());
        inner.ops.push(StoreOp::WriteRecord { entity });
        Ok(id)
    }

    async fn read_record(&self, entity: &EntityRef) -> StoreResult<Option<Record>> {
        let mut inner = self.write_inner()?;
        inner.ops.push(StoreOp::ReadRecord {
            entity: entity.clone(),
        });
        Ok(inner.rows.get(entity).cloned())
    }

    async fn read_linked_ids(
        &self,
        owner: &EntityRef,
        property: &str,
    ) -> StoreResult<Vec<Identifier>> {
        let mut inner = self.write_inner()?;
        inner.ops.push(StoreOp::ReadLinks {
            owner: owner.clone(),
            property: property.to_string(),
        });
        Ok(inner
            .links
            .get(&(owner.clone(), property.to_string()))
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn insert_link(
        &self,
        owner: &EntityRef,
        property: &str,
        id: Identifier,
    ) -> StoreResult<()> {
        let mut inner = self.write_inner()?;
        inner
            .links
            .entry((owner.clone(), property.to_string()))
            .or_default()
            .insert(id);
        inner.ops.push(StoreOp::InsertLink {
            owner: owner.clone(),
            property: property.to_string(),
            id,
        });
        Ok(())
    }

    async fn delete_link(
        &self,
        owner: &EntityRef,
        property: &str,
        id: Identifier,
    ) -> StoreResult<()> {
        let mut inner = self.write_inner()?;
        if let Some(ids) = inner.links.get_mut(&(owner.clone(), property.to_string())) {
            ids.remove(&id);
        }
        inner.ops.push(StoreOp::DeleteLink {
            owner: owner.clone(),
            property: property.to_string(),
            id,
        });
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryDataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rows = self.len().unwrap_or_default();
        f.debug_struct("InMemoryDataStore")
            .field("row_count", &rows)
            .finish()
    }
}
