//! The deferred half of a collection save: link reconciliation once the
//! owner's identifier is final.
//!
//! A commit moves through three phases:
//!
//! 1. **Resolving** -- compute the desired identifier set, saving
//!    not-yet-connected members first. Cascading saves are issued
//!    together and all awaited before the set is final.
//! 2. **Diffing** -- read the previously persisted membership (only for
//!    owners that already existed) and diff it against the desired set.
//! 3. **Reconciling** -- delete `previous \ desired`, insert
//!    `desired \ previous`. Edges in both sets are not touched.
//!
//! The first failure aborts the commit and is reported with the phase it
//! happened in. Edges already changed by then stay changed: a commit is
//! not atomic unless the store wraps the whole save in a transaction.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::debug;
use weft_store::{DataStore, StoreError};
use weft_transform::{
    DeferredSave, LinkChanges, NamingPolicy, SavePhase, TransformError, TransformResult,
};
use weft_types::{identifier_of, Identifier, Object, PersistedOwner, Value};

use crate::diff::diff_links;

/// Where the desired membership of a collection comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum DesiredLinks {
    /// A desired-identifiers list left by form input. Used verbatim.
    Explicit(Vec<Identifier>),
    /// The in-memory members, resolved to identifiers at commit time.
    Members(Vec<Value>),
}

/// Link reconciliation of one collection property, waiting for its owner's
/// identifier.
pub struct PendingLinks {
    property: String,
    desired: DesiredLinks,
    load_previous: bool,
    store: Arc<dyn DataStore>,
    naming: NamingPolicy,
}

impl PendingLinks {
    /// `load_previous` is whether the owner was already persisted when the
    /// save was prepared. A brand-new owner has no links to read.
    pub fn new(
        property: impl Into<String>,
        desired: DesiredLinks,
        load_previous: bool,
        store: Arc<dyn DataStore>,
        naming: NamingPolicy,
    ) -> Self {
        Self {
            property: property.into(),
            desired,
            load_previous,
            store,
            naming,
        }
    }

    pub fn desired(&self) -> &DesiredLinks {
        &self.desired
    }

    async fn resolve_members(
        &self,
        owner: &mut Object,
        members: Vec<Value>,
    ) -> TransformResult<Vec<Identifier>> {
        let property = self.property.as_str();
        let mut ids = Vec::with_capacity(members.len());
        let mut transient = Vec::new();
        for (index, member) in members.into_iter().enumerate() {
            match member {
                Value::Object(object) => {
                    let connected = object.id().filter(|_| self.store.is_connected(&object));
                    match connected {
                        Some(id) => ids.push(id),
                        None => transient.push((index, *object)),
                    }
                }
                other => match identifier_of(&other) {
                    Some(id) => ids.push(id),
                    None => debug!(property, index, "skipping member without identity"),
                },
            }
        }

        if !transient.is_empty() {
            debug!(property, count = transient.len(), "cascading member saves");
            let saves = transient.into_iter().map(|(index, object)| {
                let store = Arc::clone(&self.store);
                async move { store.save(object).await.map(|saved| (index, saved)) }
            });
            let saved = try_join_all(saves)
                .await
                .map_err(|e| TransformError::relation(property, SavePhase::Resolving, e))?;
            for (index, object) in saved {
                let id = object.id().ok_or_else(|| {
                    TransformError::relation(
                        property,
                        SavePhase::Resolving,
                        StoreError::Backend(format!(
                            "save of {} returned no identifier",
                            object.type_name()
                        )),
                    )
                })?;
                ids.push(id);
                if let Some(Value::List(values)) = owner.get_mut(property) {
                    if let Some(slot) = values.get_mut(index) {
                        *slot = Value::object(object);
                    }
                }
            }
        }

        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    /// Replace a consumed desired-identifiers field by the member list it
    /// stands for, keeping hydrated members that are still linked.
    fn settle_explicit(&self, owner: &mut Object, desired: &[Identifier]) {
        owner.remove(&self.naming.desired_ids_field(&self.property));
        let hydrated: Vec<Value> = match owner.remove(&self.property) {
            Some(Value::List(values)) => values,
            _ => Vec::new(),
        };
        let list = desired
            .iter()
            .map(|id| {
                hydrated
                    .iter()
                    .find(|v| identifier_of(v) == Some(*id))
                    .cloned()
                    .unwrap_or(Value::Reference(*id))
            })
            .collect();
        owner.set(self.property.clone(), Value::List(list));
    }
}

impl fmt::Debug for PendingLinks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingLinks")
            .field("property", &self.property)
            .field("desired", &self.desired)
            .field("load_previous", &self.load_previous)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DeferredSave for PendingLinks {
    fn property(&self) -> &str {
        &self.property
    }

    async fn commit(
        self: Box<Self>,
        owner: &mut PersistedOwner<'_>,
    ) -> TransformResult<LinkChanges> {
        let property = self.property.as_str();
        let entity = owner.entity().clone();

        let (desired, explicit) = match &self.desired {
            DesiredLinks::Explicit(ids) => {
                let mut ids = ids.clone();
                ids.sort_unstable();
                ids.dedup();
                (ids, true)
            }
            DesiredLinks::Members(members) => (
                self.resolve_members(owner.object_mut(), members.clone())
                    .await?,
                false,
            ),
        };

        let previous = if self.load_previous {
            self.store
                .read_linked_ids(&entity, property)
                .await
                .map_err(|e| TransformError::relation(property, SavePhase::Diffing, e))?
        } else {
            Vec::new()
        };
        let diff = diff_links(&previous, &desired);
        debug!(
            property,
            owner = %entity,
            previous = previous.len(),
            desired = desired.len(),
            removed = diff.removed.len(),
            added = diff.added.len(),
            "link diff computed"
        );

        let store = &self.store;
        let entity_ref = &entity;
        try_join_all(diff.removed.iter().map(|id| {
            debug!(property, %id, "deleting link");
            store.delete_link(entity_ref, property, *id)
        }))
        .await
        .map_err(|e| TransformError::relation(property, SavePhase::Reconciling, e))?;
        try_join_all(diff.added.iter().map(|id| {
            debug!(property, %id, "inserting link");
            store.insert_link(entity_ref, property, *id)
        }))
        .await
        .map_err(|e| TransformError::relation(property, SavePhase::Reconciling, e))?;

        if explicit {
            self.settle_explicit(owner.object_mut(), &desired);
        }
        Ok(LinkChanges {
            property: self.property.clone(),
            inserted: diff.added,
            deleted: diff.removed,
            unchanged: diff.unchanged,
        })
    }
}
