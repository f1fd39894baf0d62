use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::ids::{EntityRef, Identifier, TypeName};
use crate::value::Value;

/// A typed object whose properties are transformed to and from external
/// representations.
///
/// An object is *transient* until the store assigns it an identifier; from
/// then on it is an entity and the identifier never changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Object {
    type_name: TypeName,
    id: Option<Identifier>,
    fields: BTreeMap<String, Value>,
}

impl Object {
    /// Create a transient object with no properties set.
    pub fn new(type_name: impl Into<TypeName>) -> Self {
        Self {
            type_name: type_name.into(),
            id: None,
            fields: BTreeMap::new(),
        }
    }

    /// Create a partially hydrated stub carrying only an identifier.
    pub fn stub(type_name: impl Into<TypeName>, id: Identifier) -> Self {
        Self {
            type_name: type_name.into(),
            id: Some(id),
            fields: BTreeMap::new(),
        }
    }

    /// Builder: set a property.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    pub fn id(&self) -> Option<Identifier> {
        self.id
    }

    pub fn is_transient(&self) -> bool {
        self.id.is_none()
    }

    /// The entity reference, if this object has been persisted.
    pub fn entity_ref(&self) -> Option<EntityRef> {
        self.id.map(|id| EntityRef::new(self.type_name.clone(), id))
    }

    /// Assign the store identifier.
    ///
    /// Assigning the identifier an object already carries is a no-op;
    /// assigning a different one is refused.
    pub fn assign_id(&mut self, id: Identifier) -> Result<(), TypeError> {
        match self.id {
            Some(current) if current != id => Err(TypeError::IdentifierReassigned {
                type_name: self.type_name.clone(),
                current,
                requested: id,
            }),
            _ => {
                self.id = Some(id);
                Ok(())
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.fields.get_mut(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Set a property, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    /// Remove a property, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }
}

/// An owner object whose identifier is final.
///
/// Relation reconciliation needs the owner's identifier to read and write
/// link rows; requiring this wrapper makes that a type-level precondition
/// instead of a runtime convention.
#[derive(Debug)]
pub struct PersistedOwner<'a> {
    object: &'a mut Object,
    entity: EntityRef,
}

impl<'a> PersistedOwner<'a> {
    /// Wrap an owner, failing if it has not been assigned an identifier.
    pub fn new(object: &'a mut Object) -> Result<Self, TypeError> {
        let entity = object
            .entity_ref()
            .ok_or_else(|| TypeError::Transient(object.type_name().clone()))?;
        Ok(Self { object, entity })
    }

    pub fn entity(&self) -> &EntityRef {
        &self.entity
    }

    pub fn object(&self) -> &Object {
        self.object
    }

    pub fn object_mut(&mut self) -> &mut Object {
        self.object
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> Identifier {
        Identifier::new(n).unwrap()
    }

    #[test]
    fn new_objects_are_transient() {
        let object = Object::new("Client").with("name", "Acme");
        assert!(object.is_transient());
        assert!(object.entity_ref().is_none());
        assert_eq!(object.get("name"), Some(&Value::text("Acme")));
    }

    #[test]
    fn identifier_is_assigned_once() {
        let mut object = Object::new("Client");
        object.assign_id(id(5)).unwrap();
        // Same identifier again is accepted.
        object.assign_id(id(5)).unwrap();
        let err = object.assign_id(id(6)).unwrap_err();
        assert!(matches!(err, TypeError::IdentifierReassigned { .. }));
        assert_eq!(object.id(), Some(id(5)));
    }

    #[test]
    fn set_and_remove_fields() {
        let mut object = Object::new("Order");
        assert!(object.set("total", 3.5).is_none());
        assert_eq!(object.set("total", 4.0), Some(Value::Number(3.5)));
        assert!(object.contains("total"));
        assert_eq!(object.remove("total"), Some(Value::Number(4.0)));
        assert!(!object.contains("total"));
    }

    #[test]
    fn persisted_owner_requires_identifier() {
        let mut transient = Object::new("Order");
        let err = PersistedOwner::new(&mut transient).unwrap_err();
        assert_eq!(err, TypeError::Transient(TypeName::from("Order")));

        let mut stored = Object::stub("Order", id(3));
        let owner = PersistedOwner::new(&mut stored).unwrap();
        assert_eq!(owner.entity().id, id(3));
        assert_eq!(owner.object().type_name().as_str(), "Order");
    }
}
