use weft_types::{PropertyType, TypeName};

use crate::schema::Precision;

/// Read-only view of declared object types.
///
/// Implementations are immutable for the lifetime of a process and shared
/// across transformers, hence `Send + Sync`.
pub trait Reflection: Send + Sync {
    /// Declared type of `owner.property`, `None` if unknown.
    fn property_type(&self, owner: &TypeName, property: &str) -> Option<PropertyType>;

    /// Declared property names of `owner`, in declaration order.
    fn property_names(&self, owner: &TypeName) -> Vec<String>;

    /// `true` iff the objects linked by `owner.property` are owned by the
    /// owner (a composition) rather than merely referenced.
    fn is_contained_by(&self, owner: &TypeName, property: &str) -> bool;

    /// `true` iff `owner.property` points back to the object containing
    /// `owner`.
    fn is_composite(&self, owner: &TypeName, property: &str) -> bool;

    /// Properties whose values form the representative string of `owner`.
    fn representative_properties(&self, owner: &TypeName) -> Vec<String>;

    /// Display precision of a numeric property.
    fn precision_of(&self, owner: &TypeName, property: &str) -> Option<Precision>;

    /// Declared linked type of a single-reference property.
    fn declared_type(&self, owner: &TypeName, property: &str) -> Option<TypeName> {
        match self.property_type(owner, property)? {
            PropertyType::Store(name) => Some(name),
            _ => None,
        }
    }

    /// Declared element type of a multi-reference property.
    fn collection_element_type(&self, owner: &TypeName, property: &str) -> Option<TypeName> {
        match self.property_type(owner, property)? {
            PropertyType::Collection(name) => Some(name),
            _ => None,
        }
    }
}
