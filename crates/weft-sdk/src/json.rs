//! JSON conversion of objects, guided by the schema.
//!
//! An object is a JSON object with an optional positive `"id"` and one key
//! per property. Single references accept an identifier, a nested object
//! of the linked type, or raw text; collections accept an array of
//! identifiers or nested objects. The naming policy's sibling fields
//! (`clientId`, `tagsIds`) are accepted too.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Number, Value as Json};
use weft_reflect::{Reflection, Schema};
use weft_transform::NamingPolicy;
use weft_types::{FormData, Identifier, Object, PropertyType, TypeName, Value};

use crate::error::{SdkError, SdkResult};

const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

fn invalid(message: impl Into<String>) -> SdkError {
    SdkError::InvalidJson(message.into())
}

fn identifier(json: &Json, what: &str) -> SdkResult<Identifier> {
    json.as_u64()
        .and_then(Identifier::new)
        .ok_or_else(|| invalid(format!("{what}: expected a positive identifier, got {json}")))
}

fn parse_date(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, DATE_TIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn linked(schema: &Schema, naming: &NamingPolicy, target: &TypeName, json: &Json, what: &str) -> SdkResult<Value> {
    match json {
        Json::Null => Ok(Value::Null),
        Json::Number(_) => identifier(json, what).map(Value::Reference),
        Json::Object(_) => object_from_json(schema, naming, target, json).map(Value::object),
        Json::String(text) => Ok(Value::text(text.as_str())),
        other => Err(invalid(format!("{what}: unexpected {other}"))),
    }
}

fn property_value(
    schema: &Schema,
    naming: &NamingPolicy,
    property_type: &PropertyType,
    json: &Json,
    what: &str,
) -> SdkResult<Value> {
    if json.is_null() {
        return Ok(Value::Null);
    }
    let mismatch = || invalid(format!("{what}: {json} is not a {property_type}"));
    match property_type {
        PropertyType::Bool => json.as_bool().map(Value::Bool).ok_or_else(mismatch),
        PropertyType::Number => json.as_f64().map(Value::Number).ok_or_else(mismatch),
        PropertyType::BigInt => match json {
            Json::Number(n) => n.as_i64().map(|n| Value::BigInt(i128::from(n))).ok_or_else(mismatch),
            Json::String(text) => text.trim().parse().map(Value::BigInt).map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
        PropertyType::Text => match json {
            Json::String(text) => Ok(Value::text(text.as_str())),
            Json::Number(n) => Ok(Value::text(n.to_string())),
            Json::Bool(b) => Ok(Value::text(b.to_string())),
            _ => Err(mismatch()),
        },
        PropertyType::Date => json
            .as_str()
            .and_then(parse_date)
            .map(Value::Date)
            .ok_or_else(mismatch),
        PropertyType::Store(target) => linked(schema, naming, target, json, what),
        PropertyType::Collection(target) => {
            let items = json.as_array().ok_or_else(mismatch)?;
            items
                .iter()
                .map(|item| linked(schema, naming, target, item, what))
                .collect::<SdkResult<Vec<_>>>()
                .map(Value::List)
        }
    }
}

/// Build an object of `type_name` from JSON.
pub fn object_from_json(
    schema: &Schema,
    naming: &NamingPolicy,
    type_name: &TypeName,
    json: &Json,
) -> SdkResult<Object> {
    if schema.get(type_name).is_none() {
        return Err(SdkError::UnknownType(type_name.clone()));
    }
    let fields = json
        .as_object()
        .ok_or_else(|| invalid(format!("{type_name}: expected an object, got {json}")))?;

    let mut object = match fields.get("id") {
        None | Some(Json::Null) => Object::new(type_name.clone()),
        Some(id) => Object::stub(type_name.clone(), identifier(id, &format!("{type_name}.id"))?),
    };

    let stores: Vec<String> = schema
        .property_names(type_name)
        .into_iter()
        .filter(|p| schema.declared_type(type_name, p).is_some())
        .collect();
    let collections: Vec<String> = schema
        .property_names(type_name)
        .into_iter()
        .filter(|p| schema.collection_element_type(type_name, p).is_some())
        .collect();

    for (key, value) in fields {
        if key == "id" {
            continue;
        }
        let what = format!("{type_name}.{key}");
        if let Some(property_type) = schema.property_type(type_name, key) {
            let converted = property_value(schema, naming, &property_type, value, &what)?;
            object.set(key.as_str(), converted);
        } else if stores.iter().any(|p| naming.foreign_key_field(p) == *key) {
            let id = (!value.is_null())
                .then(|| identifier(value, &what))
                .transpose()?;
            object.set(key.as_str(), id.map_or(Value::Null, Value::Reference));
        } else if collections.iter().any(|p| naming.desired_ids_field(p) == *key) {
            let items = value
                .as_array()
                .ok_or_else(|| invalid(format!("{what}: expected an array of identifiers")))?;
            let ids = items
                .iter()
                .map(|item| identifier(item, &what))
                .collect::<SdkResult<Vec<_>>>()?;
            object.set(key.as_str(), Value::Identifiers(ids));
        } else {
            return Err(invalid(format!("unknown property {what}")));
        }
    }
    Ok(object)
}

pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Integer(n) => Json::from(*n),
        Value::BigInt(n) => match i64::try_from(*n) {
            Ok(n) => Json::from(n),
            Err(_) => Json::String(n.to_string()),
        },
        Value::Number(n) => Number::from_f64(*n).map_or(Json::Null, Json::Number),
        Value::Text(text) => Json::String(text.clone()),
        Value::Date(date) => Json::String(date.format(DATE_TIME_FORMAT).to_string()),
        Value::Reference(id) => Json::from(id.get()),
        Value::Object(object) => object_to_json(object),
        Value::List(values) => Json::Array(values.iter().map(value_to_json).collect()),
        Value::Map(entries) => Json::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), value_to_json(v)))
                .collect(),
        ),
        Value::Identifiers(ids) => Json::Array(ids.iter().map(|id| Json::from(id.get())).collect()),
    }
}

/// JSON form of an object: `"id"` when persisted, then every field.
pub fn object_to_json(object: &Object) -> Json {
    let mut map = Map::new();
    if let Some(id) = object.id() {
        map.insert("id".into(), Json::from(id.get()));
    }
    for (key, value) in object.fields() {
        map.insert(key.clone(), value_to_json(value));
    }
    Json::Object(map)
}

/// Submitted form fields from a flat JSON object. Scalars are turned into
/// their text; `null` becomes an empty field.
pub fn form_from_json(json: &Json) -> SdkResult<FormData> {
    let fields = json
        .as_object()
        .ok_or_else(|| invalid(format!("form: expected an object, got {json}")))?;
    let mut form = FormData::new();
    for (name, value) in fields {
        let text = match value {
            Json::String(text) => text.clone(),
            Json::Null => String::new(),
            Json::Bool(_) | Json::Number(_) => value.to_string(),
            other => return Err(invalid(format!("form field {name}: unexpected {other}"))),
        };
        form.insert(name.as_str(), text);
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const SCHEMA: &str = r#"
        [[types]]
        name = "Client"
        properties = [{ name = "name", type = "text" }]

        [[types]]
        name = "Order"
        properties = [
            { name = "number", type = "text" },
            { name = "due", type = "date" },
            { name = "reference", type = "bigint" },
            { name = "client", type = "Client" },
            { name = "lines", type = "[Client]" },
        ]
    "#;

    fn schema() -> Schema {
        Schema::from_toml_str(SCHEMA).unwrap()
    }

    fn id(n: u64) -> Identifier {
        Identifier::new(n).unwrap()
    }

    #[test]
    fn reads_typed_properties_and_sibling_fields() {
        let json = json!({
            "id": 3,
            "number": "A-1",
            "due": "2024-03-09",
            "reference": "170141183460469231731687303715884105727",
            "client": { "name": "Acme" },
            "lines": [4, { "id": 5, "name": "Globex" }],
            "clientId": 9,
            "linesIds": [1, 2]
        });
        let order = object_from_json(&schema(), &NamingPolicy::default(), &"Order".into(), &json).unwrap();
        assert_eq!(order.id(), Some(id(3)));
        assert_eq!(order.get("reference"), Some(&Value::BigInt(i128::MAX)));
        let client = order.get("client").and_then(Value::as_object).unwrap();
        assert!(client.is_transient());
        assert_eq!(client.get("name"), Some(&Value::text("Acme")));
        let lines = order.get("lines").and_then(Value::as_list).unwrap();
        assert_eq!(lines[0], Value::Reference(id(4)));
        assert_eq!(lines[1].as_object().and_then(Object::id), Some(id(5)));
        assert_eq!(order.get("clientId"), Some(&Value::Reference(id(9))));
        assert_eq!(order.get("linesIds"), Some(&Value::Identifiers(vec![id(1), id(2)])));
        assert!(matches!(order.get("due"), Some(Value::Date(_))));
    }

    #[test]
    fn rejects_unknown_keys_and_bad_identifiers() {
        let naming = NamingPolicy::default();
        let err = object_from_json(&schema(), &naming, &"Order".into(), &json!({ "color": "red" }))
            .unwrap_err();
        assert!(err.to_string().contains("Order.color"));
        let err = object_from_json(&schema(), &naming, &"Order".into(), &json!({ "id": 0 }))
            .unwrap_err();
        assert!(matches!(err, SdkError::InvalidJson(_)));
        let err = object_from_json(&schema(), &naming, &"Ghost".into(), &json!({})).unwrap_err();
        assert!(matches!(err, SdkError::UnknownType(_)));
    }

    #[test]
    fn writes_objects_back() {
        let order = Object::stub("Order", id(3))
            .with("number", "A-1")
            .with("client", Object::stub("Client", id(4)).with("name", "Acme"))
            .with("linesIds", Value::Identifiers(vec![id(1)]));
        assert_eq!(
            object_to_json(&order),
            json!({
                "id": 3,
                "client": { "id": 4, "name": "Acme" },
                "linesIds": [1],
                "number": "A-1"
            })
        );
        assert_eq!(value_to_json(&Value::BigInt(i128::MAX)), json!("170141183460469231731687303715884105727"));
        assert_eq!(value_to_json(&Value::Number(f64::NAN)), Json::Null);
    }

    #[test]
    fn forms_are_flat_text() {
        let form = form_from_json(&json!({ "client": "Acme", "client_id": 4, "paid": true, "note": null })).unwrap();
        assert_eq!(form.get("client_id"), Some("4"));
        assert_eq!(form.get("paid"), Some("true"));
        assert_eq!(form.get("note"), Some(""));
        assert!(form_from_json(&json!({ "tags": [1] })).is_err());
    }
}
