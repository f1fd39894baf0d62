use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Store-assigned identifier of a persisted entity.
///
/// Identifiers are assigned exactly once, at an entity's first successful
/// save, and never change afterwards. Zero is never a valid identifier: a
/// submitted `"0"` or empty field means "no entity".
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(u64);

impl Identifier {
    /// Wrap a raw identifier value. Returns `None` for zero.
    pub fn new(raw: u64) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    /// The raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }

    /// Permissive parse of submitted form text.
    ///
    /// Surrounding whitespace is ignored. Empty, zero, negative, or
    /// non-numeric input yields `None` instead of an error: form input is
    /// untrusted text and malformed identifiers are simply dropped.
    pub fn parse_lenient(text: &str) -> Option<Self> {
        text.trim().parse::<u64>().ok().and_then(Self::new)
    }
}

impl FromStr for Identifier {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_lenient(s).ok_or_else(|| TypeError::InvalidIdentifier(s.to_string()))
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of a declared object type (e.g. `"Client"`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(String);

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeName({})", self.0)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for TypeName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Reference to a persisted entity: its type plus its identifier.
///
/// This is what the store receives when reading or mutating the links of
/// an owner. It can only be built from an identifier, so holding one
/// proves the owner has been persisted.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef {
    pub type_name: TypeName,
    pub id: Identifier,
}

impl EntityRef {
    pub fn new(type_name: impl Into<TypeName>, id: Identifier) -> Self {
        Self {
            type_name: type_name.into(),
            id,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.type_name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_not_an_identifier() {
        assert!(Identifier::new(0).is_none());
        assert_eq!(Identifier::new(7).map(Identifier::get), Some(7));
    }

    #[test]
    fn lenient_parse_drops_malformed_input() {
        assert_eq!(Identifier::parse_lenient(" 12 ").map(Identifier::get), Some(12));
        assert!(Identifier::parse_lenient("").is_none());
        assert!(Identifier::parse_lenient("0").is_none());
        assert!(Identifier::parse_lenient("-3").is_none());
        assert!(Identifier::parse_lenient("abc").is_none());
        assert!(Identifier::parse_lenient("4.5").is_none());
    }

    #[test]
    fn from_str_reports_invalid_input() {
        let err = "nope".parse::<Identifier>().unwrap_err();
        assert_eq!(err, TypeError::InvalidIdentifier("nope".into()));
        assert_eq!("9".parse::<Identifier>().unwrap().get(), 9);
    }

    #[test]
    fn identifiers_are_ordered() {
        let mut ids: Vec<Identifier> = [9, 3, 5]
            .into_iter()
            .filter_map(Identifier::new)
            .collect();
        ids.sort();
        assert_eq!(ids.iter().map(|id| id.get()).collect::<Vec<_>>(), vec![3, 5, 9]);
    }

    #[test]
    fn serde_is_transparent() {
        let id = Identifier::new(42).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        let name = TypeName::from("Client");
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"Client\"");
    }

    #[test]
    fn entity_ref_display() {
        let owner = EntityRef::new("Order", Identifier::new(3).unwrap());
        assert_eq!(owner.to_string(), "Order#3");
    }
}
