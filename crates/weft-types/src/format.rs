use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::ids::TypeName;

/// External representation a property value is transformed to or from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Form and display markup.
    Html,
    /// Storage rows.
    Sql,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Html => f.write_str("html"),
            Self::Sql => f.write_str("sql"),
        }
    }
}

/// Direction of a transformation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Value → editable form markup.
    Edit,
    /// Submitted form data → value.
    Input,
    /// Value → read-only display markup.
    Output,
    /// Storage row → value.
    Read,
    /// Value → storage row.
    Save,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Edit => "edit",
            Self::Input => "input",
            Self::Output => "output",
            Self::Read => "read",
            Self::Save => "save",
        };
        f.write_str(name)
    }
}

/// Declared type of a property, as exposed by reflection.
///
/// The textual form is used in schema files: `bool`, `number`, `bigint`,
/// `text`, `date`, a type name for a single reference (`Client`), and a
/// bracketed type name for a multi-reference (`[Tag]`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PropertyType {
    Bool,
    Number,
    BigInt,
    Text,
    Date,
    /// Holds zero or one linked entity of the named type.
    Store(TypeName),
    /// Holds a collection of linked entities of the named element type.
    Collection(TypeName),
}

impl PropertyType {
    /// The registry key transformers for this type are registered under.
    pub fn key(&self) -> TypeKey {
        match self {
            Self::Bool => TypeKey::Bool,
            Self::Number => TypeKey::Number,
            Self::BigInt => TypeKey::BigInt,
            Self::Text => TypeKey::Text,
            Self::Date => TypeKey::Date,
            Self::Store(name) => TypeKey::Store(name.clone()),
            Self::Collection(_) => TypeKey::Collection,
        }
    }

    /// The linked type of a single- or multi-reference property.
    pub fn linked_type(&self) -> Option<&TypeName> {
        match self {
            Self::Store(name) | Self::Collection(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Collection(_))
    }
}

impl FromStr for PropertyType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = match s {
            "bool" | "boolean" => Self::Bool,
            "number" => Self::Number,
            "bigint" => Self::BigInt,
            "text" | "string" => Self::Text,
            "date" => Self::Date,
            _ => {
                if let Some(inner) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
                    let inner = inner.trim();
                    if !is_type_name(inner) {
                        return Err(TypeError::InvalidPropertyType(s.to_string()));
                    }
                    Self::Collection(TypeName::new(inner))
                } else if is_type_name(s) {
                    Self::Store(TypeName::new(s))
                } else {
                    return Err(TypeError::InvalidPropertyType(s.to_string()));
                }
            }
        };
        Ok(parsed)
    }
}

fn is_type_name(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl TryFrom<String> for PropertyType {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PropertyType> for String {
    fn from(t: PropertyType) -> Self {
        t.to_string()
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Number => f.write_str("number"),
            Self::BigInt => f.write_str("bigint"),
            Self::Text => f.write_str("text"),
            Self::Date => f.write_str("date"),
            Self::Store(name) => write!(f, "{name}"),
            Self::Collection(name) => write!(f, "[{name}]"),
        }
    }
}

/// Subject type a transformer is registered for.
///
/// Single references register per linked type; every collection shares
/// the one [`TypeKey::Collection`] key whatever its element type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeKey {
    Bool,
    Number,
    BigInt,
    Text,
    Date,
    Store(TypeName),
    Collection,
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Number => f.write_str("number"),
            Self::BigInt => f.write_str("bigint"),
            Self::Text => f.write_str("text"),
            Self::Date => f.write_str("date"),
            Self::Store(name) => write!(f, "store:{name}"),
            Self::Collection => f.write_str("collection"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_primitive_types() {
        assert_eq!("bool".parse::<PropertyType>().unwrap(), PropertyType::Bool);
        assert_eq!("boolean".parse::<PropertyType>().unwrap(), PropertyType::Bool);
        assert_eq!("string".parse::<PropertyType>().unwrap(), PropertyType::Text);
        assert_eq!("date".parse::<PropertyType>().unwrap(), PropertyType::Date);
    }

    #[test]
    fn parse_reference_types() {
        assert_eq!(
            "Client".parse::<PropertyType>().unwrap(),
            PropertyType::Store(TypeName::from("Client"))
        );
        assert_eq!(
            "[ Tag ]".parse::<PropertyType>().unwrap(),
            PropertyType::Collection(TypeName::from("Tag"))
        );
    }

    #[test]
    fn reject_malformed_types() {
        assert!("client".parse::<PropertyType>().is_err());
        assert!("[]".parse::<PropertyType>().is_err());
        assert!("[tag]".parse::<PropertyType>().is_err());
        assert!("Order Line".parse::<PropertyType>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for text in ["bool", "number", "bigint", "text", "date", "Client", "[Tag]"] {
            let parsed: PropertyType = text.parse().unwrap();
            assert_eq!(parsed.to_string(), text);
        }
    }

    #[test]
    fn collections_share_one_key() {
        let tags: PropertyType = "[Tag]".parse().unwrap();
        let lines: PropertyType = "[Line]".parse().unwrap();
        assert_eq!(tags.key(), lines.key());
        let client: PropertyType = "Client".parse().unwrap();
        assert_eq!(client.key(), TypeKey::Store(TypeName::from("Client")));
    }

    #[test]
    fn serde_uses_text_form() {
        let t: PropertyType = serde_json::from_str("\"[Tag]\"").unwrap();
        assert!(t.is_collection());
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"[Tag]\"");
        assert!(serde_json::from_str::<PropertyType>("\"??\"").is_err());
    }
}
