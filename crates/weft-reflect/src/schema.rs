use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;
use weft_types::{PropertyType, TypeName};

use crate::error::ReflectError;
use crate::traits::Reflection;

/// Minimum and maximum number of fraction digits shown for a number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Precision {
    pub minimum: u8,
    pub maximum: u8,
}

impl Precision {
    pub const fn new(minimum: u8, maximum: u8) -> Self {
        Self { minimum, maximum }
    }
}

/// Declaration of one property.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    /// Linked objects are owned by the container (compositions only).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub component: bool,
    /// This property points back to the containing object.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub composite: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<Precision>,
}

impl PropertySchema {
    pub fn new(name: impl Into<String>, property_type: PropertyType) -> Self {
        Self {
            name: name.into(),
            property_type,
            component: false,
            composite: false,
            precision: None,
        }
    }

    /// Mark the linked objects as owned by the container.
    pub fn component(mut self) -> Self {
        self.component = true;
        self
    }

    /// Mark this property as the back-link to the container.
    pub fn composite(mut self) -> Self {
        self.composite = true;
        self
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = Some(precision);
        self
    }
}

/// Declaration of one object type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeSchema {
    pub name: TypeName,
    #[serde(default)]
    pub representative: Vec<String>,
    #[serde(default)]
    pub properties: Vec<PropertySchema>,
}

impl TypeSchema {
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            representative: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn property(mut self, property: PropertySchema) -> Self {
        self.properties.push(property);
        self
    }

    pub fn representative(mut self, property: impl Into<String>) -> Self {
        self.representative.push(property.into());
        self
    }

    fn find(&self, property: &str) -> Option<&PropertySchema> {
        self.properties.iter().find(|p| p.name == property)
    }
}

#[derive(Deserialize)]
struct SchemaFile {
    #[serde(default)]
    types: Vec<TypeSchema>,
}

/// A validated set of type declarations.
///
/// Every linked type must itself be declared, property names are unique
/// per type, and representative properties must exist.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    types: BTreeMap<TypeName, TypeSchema>,
}

impl Schema {
    /// Validate and index type declarations.
    pub fn new(types: Vec<TypeSchema>) -> Result<Self, ReflectError> {
        let mut indexed = BTreeMap::new();
        for t in types {
            let name = t.name.clone();
            if indexed.insert(name.clone(), t).is_some() {
                return Err(ReflectError::DuplicateType(name));
            }
        }
        for t in indexed.values() {
            let mut seen = HashSet::new();
            for p in &t.properties {
                if !seen.insert(p.name.as_str()) {
                    return Err(ReflectError::DuplicateProperty {
                        type_name: t.name.clone(),
                        property: p.name.clone(),
                    });
                }
                if let Some(target) = p.property_type.linked_type() {
                    if !indexed.contains_key(target) {
                        return Err(ReflectError::UnknownType {
                            type_name: t.name.clone(),
                            property: p.name.clone(),
                            target: target.clone(),
                        });
                    }
                }
                if let Some(precision) = p.precision {
                    if precision.minimum > precision.maximum {
                        return Err(ReflectError::InvalidPrecision {
                            type_name: t.name.clone(),
                            property: p.name.clone(),
                            minimum: precision.minimum,
                            maximum: precision.maximum,
                        });
                    }
                }
            }
            if let Some(missing) = t.representative.iter().find(|r| t.find(r).is_none()) {
                return Err(ReflectError::UnknownRepresentative {
                    type_name: t.name.clone(),
                    property: missing.clone(),
                });
            }
        }
        debug!(types = indexed.len(), "schema loaded");
        Ok(Self { types: indexed })
    }

    /// Parse a TOML document of `[[types]]` tables.
    pub fn from_toml_str(source: &str) -> Result<Self, ReflectError> {
        let file: SchemaFile = toml::from_str(source)?;
        Self::new(file.types)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ReflectError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn get(&self, type_name: &TypeName) -> Option<&TypeSchema> {
        self.types.get(type_name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &TypeName> {
        self.types.keys()
    }

    /// Every type linked by a single-reference property somewhere.
    pub fn store_targets(&self) -> Vec<TypeName> {
        let mut targets: Vec<TypeName> = self
            .types
            .values()
            .flat_map(|t| t.properties.iter())
            .filter_map(|p| match &p.property_type {
                PropertyType::Store(name) => Some(name.clone()),
                _ => None,
            })
            .collect();
        targets.sort();
        targets.dedup();
        targets
    }

    fn property(&self, owner: &TypeName, property: &str) -> Option<&PropertySchema> {
        self.types.get(owner)?.find(property)
    }
}

impl Reflection for Schema {
    fn property_type(&self, owner: &TypeName, property: &str) -> Option<PropertyType> {
        self.property(owner, property).map(|p| p.property_type.clone())
    }

    fn property_names(&self, owner: &TypeName) -> Vec<String> {
        self.types
            .get(owner)
            .map(|t| t.properties.iter().map(|p| p.name.clone()).collect())
            .unwrap_or_default()
    }

    fn is_contained_by(&self, owner: &TypeName, property: &str) -> bool {
        self.property(owner, property)
            .is_some_and(|p| p.component && p.property_type.is_collection())
    }

    fn is_composite(&self, owner: &TypeName, property: &str) -> bool {
        self.property(owner, property).is_some_and(|p| p.composite)
    }

    fn representative_properties(&self, owner: &TypeName) -> Vec<String> {
        self.types
            .get(owner)
            .map(|t| t.representative.clone())
            .unwrap_or_default()
    }

    fn precision_of(&self, owner: &TypeName, property: &str) -> Option<Precision> {
        self.property(owner, property)?.precision
    }
}
