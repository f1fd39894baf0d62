use std::path::Path;

use serde::{Deserialize, Serialize};
use weft_reflect::Precision;

use crate::error::{TransformError, TransformResult};

/// Naming conventions linking a relation property to its sibling fields,
/// storage columns, and form inputs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingPolicy {
    /// Storage column holding a single reference: `client` → `client_id`.
    pub foreign_key_column_suffix: String,
    /// In-memory field holding a bare foreign key: `client` → `clientId`.
    pub foreign_key_field_suffix: String,
    /// In-memory field holding desired collection membership:
    /// `tags` → `tagsIds`.
    pub desired_ids_suffix: String,
    /// Hidden form input carrying a single reference's identifier:
    /// field `client` → `client_id`.
    pub id_input_suffix: String,
}

impl Default for NamingPolicy {
    fn default() -> Self {
        Self {
            foreign_key_column_suffix: "_id".into(),
            foreign_key_field_suffix: "Id".into(),
            desired_ids_suffix: "Ids".into(),
            id_input_suffix: "_id".into(),
        }
    }
}

impl NamingPolicy {
    pub fn foreign_key_column(&self, property: &str) -> String {
        format!("{property}{}", self.foreign_key_column_suffix)
    }

    pub fn foreign_key_field(&self, property: &str) -> String {
        format!("{property}{}", self.foreign_key_field_suffix)
    }

    pub fn desired_ids_field(&self, property: &str) -> String {
        format!("{property}{}", self.desired_ids_suffix)
    }

    pub fn id_input_name(&self, field_name: &str) -> String {
        format!("{field_name}{}", self.id_input_suffix)
    }
}

/// How numbers are displayed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberFormat {
    pub decimal_separator: String,
    pub group_separator: String,
    /// Used when reflection declares no precision for a property.
    pub default_precision: Precision,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            decimal_separator: ",".into(),
            group_separator: "\u{202f}".into(),
            default_precision: Precision::new(0, 3),
        }
    }
}

/// Configuration for the transformation pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    pub naming: NamingPolicy,
    /// Appended to a type's route to build its lookup endpoint.
    pub summary_suffix: String,
    /// Inserted between a label and its input in edit markup.
    pub field_separator: String,
    pub number: NumberFormat,
    /// `chrono` format used to display and parse dates.
    pub date_format: String,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            naming: NamingPolicy::default(),
            summary_suffix: "/summary".into(),
            field_separator: "\n\t\t\t\t".into(),
            number: NumberFormat::default(),
            date_format: weft_types::value::DEFAULT_DATE_FORMAT.into(),
        }
    }
}

impl MapperConfig {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> TransformResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> TransformResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Reject settings that would make sibling names collide with the
    /// property itself.
    pub fn validate(&self) -> TransformResult<()> {
        let naming = &self.naming;
        for (key, suffix) in [
            ("foreign_key_column_suffix", &naming.foreign_key_column_suffix),
            ("foreign_key_field_suffix", &naming.foreign_key_field_suffix),
            ("desired_ids_suffix", &naming.desired_ids_suffix),
            ("id_input_suffix", &naming.id_input_suffix),
        ] {
            if suffix.is_empty() {
                return Err(TransformError::Config(format!("naming.{key} must not be empty")));
            }
        }
        if self.number.decimal_separator.is_empty() {
            return Err(TransformError::Config(
                "number.decimal_separator must not be empty".into(),
            ));
        }
        let precision = self.number.default_precision;
        if precision.minimum > precision.maximum {
            return Err(TransformError::Config(format!(
                "number.default_precision minimum {} exceeds maximum {}",
                precision.minimum, precision.maximum
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_naming() {
        let naming = NamingPolicy::default();
        assert_eq!(naming.foreign_key_column("client"), "client_id");
        assert_eq!(naming.foreign_key_field("client"), "clientId");
        assert_eq!(naming.desired_ids_field("tags"), "tagsIds");
        assert_eq!(naming.id_input_name("client"), "client_id");
    }

    #[test]
    fn default_config_is_valid() {
        let config = MapperConfig::default();
        config.validate().unwrap();
        assert_eq!(config.summary_suffix, "/summary");
        assert_eq!(config.number.default_precision, Precision::new(0, 3));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = MapperConfig::from_toml_str(
            r#"
            summary_suffix = "/lookup"

            [naming]
            foreign_key_column_suffix = "_ref"

            [number]
            decimal_separator = "."
            group_separator = ","
            "#,
        )
        .unwrap();
        assert_eq!(config.summary_suffix, "/lookup");
        assert_eq!(config.naming.foreign_key_column("client"), "client_ref");
        assert_eq!(config.naming.foreign_key_field("client"), "clientId");
        assert_eq!(config.number.decimal_separator, ".");
        assert_eq!(config.date_format, "%Y-%m-%d %H:%M:%S");
    }

    #[test]
    fn empty_suffix_is_rejected() {
        let err = MapperConfig::from_toml_str("[naming]\ndesired_ids_suffix = \"\"\n").unwrap_err();
        assert!(matches!(err, TransformError::Config(msg) if msg.contains("desired_ids_suffix")));
    }

    #[test]
    fn inverted_precision_is_rejected() {
        let err = MapperConfig::from_toml_str(
            "[number]\ndefault_precision = { minimum = 4, maximum = 2 }\n",
        )
        .unwrap_err();
        assert!(matches!(err, TransformError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weft.toml");
        std::fs::write(&path, "field_separator = \" \"\n").unwrap();
        let config = MapperConfig::from_file(&path).unwrap();
        assert_eq!(config.field_separator, " ");
    }
}
