use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// The in-flight storage row of an object being saved, keyed by column.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    columns: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.columns.insert(column.into(), value.into())
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.columns.remove(column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.columns.iter()
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

/// Submitted form fields: raw strings keyed by field name.
///
/// Nested fields use dotted names (`tags.12`), one entry per collection
/// member keyed by the member's identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData {
    fields: BTreeMap<String, String>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(name, value)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Entries named `<prefix>.<key>`, yielded as `(key, value)`.
    pub fn nested<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.fields.iter().filter_map(move |(name, value)| {
            let key = name.strip_prefix(prefix)?.strip_prefix('.')?;
            Some((key, value.as_str()))
        })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_columns() {
        let mut record = Record::new();
        record.set("client_id", Value::Null);
        assert!(record.contains("client_id"));
        assert_eq!(record.len(), 1);
        assert_eq!(record.remove("client_id"), Some(Value::Null));
        assert!(record.is_empty());
    }

    #[test]
    fn nested_fields_strip_prefix() {
        let form = FormData::from_pairs([
            ("tags.3", "red"),
            ("tags.5", "blue"),
            ("tags.", "new"),
            ("tags", ""),
            ("tagsX.1", "other"),
            ("name", "Acme"),
        ]);
        let nested: Vec<_> = form.nested("tags").collect();
        assert_eq!(nested, vec![("", "new"), ("3", "red"), ("5", "blue")]);
    }

    #[test]
    fn form_data_deserializes_from_json_object() {
        let form: FormData = serde_json::from_str(r#"{"client_id": "7"}"#).unwrap();
        assert_eq!(form.get("client_id"), Some("7"));
    }
}
