//! Single-reference ("store") synchronizer: a property holding zero or one
//! linked entity.
//!
//! In memory the property holds the linked object (hydrated or a stub),
//! or nothing while a sibling foreign-key field (`clientId`) carries a bare
//! identifier chosen from a form. In storage the link is one foreign-key
//! column (`client_id`) on the owner's row.

use async_trait::async_trait;
use tracing::debug;
use weft_transform::markup::{self, Element};
use weft_transform::{
    Call, Collaborators, TransformError, TransformResult, Transformed, Transformer,
};
use weft_types::{identifier_of, Identifier, MaybeEntity, Object, TypeName, Value};

fn declared_type(c: &Collaborators, call: &Call<'_>, value: &Value) -> TransformResult<TypeName> {
    c.reflection
        .declared_type(call.owner_type(), call.property)
        .or_else(|| value.as_object().map(|o| o.type_name().clone()))
        .ok_or_else(|| TransformError::UnknownProperty {
            type_name: call.owner_type().clone(),
            property: call.property.to_string(),
        })
}

/// The identifier the owner currently links to: its foreign-key field if
/// it has one, else the linked value's own identifier.
fn current_identifier(
    c: &Collaborators,
    owner: &Object,
    property: &str,
    value: &Value,
) -> Option<Identifier> {
    let fk_field = c.config.naming.foreign_key_field(property);
    match owner.get(&fk_field) {
        Some(fk) => identifier_of(fk),
        None => identifier_of(value),
    }
}

// ---------------------------------------------------------------------------
// HTML EDIT
// ---------------------------------------------------------------------------

/// Label, a lookup input showing the representative string, and a hidden
/// input carrying the linked identifier.
#[derive(Debug)]
pub struct StoreEdit {
    c: Collaborators,
}

impl StoreEdit {
    pub fn new(c: Collaborators) -> Self {
        Self { c }
    }
}

#[async_trait]
impl Transformer for StoreEdit {
    fn name(&self) -> &str {
        "store.edit"
    }

    async fn transform(&self, value: Value, call: Call<'_>) -> TransformResult<Transformed> {
        let linked_type = declared_type(&self.c, &call, &value)?;
        let field_id = self.c.field_id(call.property);
        let field_name = self.c.field_name(call.property);
        let text = if value.is_truthy() {
            markup::escape_text(&self.c.representative(&value))
        } else {
            String::new()
        };
        let id = current_identifier(&self.c, call.owner, call.property, &value);

        let input = Element::input()
            .attr("data-fetch", self.c.fetch_route(&linked_type))
            .attr("data-type", "object")
            .attr("id", field_id.as_str())
            .attr("name", field_name.as_str())
            .attr_opt("value", (!text.is_empty()).then_some(text));
        let hidden = Element::input()
            .attr("id", format!("{field_id}-id"))
            .attr("name", self.c.config.naming.id_input_name(&field_name))
            .attr("type", "hidden")
            .attr("value", id.map(|id| id.to_string()).unwrap_or_default());

        let html = self
            .c
            .labelled(call.owner_type(), call.property, &format!("{input}{hidden}"));
        Ok(Transformed::Applied(Value::Text(html)))
    }
}

// ---------------------------------------------------------------------------
// HTML INPUT
// ---------------------------------------------------------------------------

/// Applies a submitted reference directly to the owner.
///
/// `value` is what was typed in the lookup input (usually text). The
/// hidden identifier input decides what happens:
///
/// - same identifier as the current link: nothing changes;
/// - another identifier: the property is replaced by a bare foreign key;
/// - no identifier: the typed value becomes the link, constructing a new
///   object of the declared type from non-empty text. When the declared
///   type has no representative property to seed, nothing changes.
///
/// The owner is always mutated in place, so the result is
/// [`Transformed::AlreadyApplied`].
#[derive(Debug)]
pub struct StoreInput {
    c: Collaborators,
}

impl StoreInput {
    pub fn new(c: Collaborators) -> Self {
        Self { c }
    }

    fn object_from_text(
        &self,
        call: &Call<'_>,
        value: &Value,
        text: &str,
    ) -> TransformResult<Option<Object>> {
        let linked_type = declared_type(&self.c, call, value)?;
        let Some(first) = self
            .c
            .reflection
            .representative_properties(&linked_type)
            .into_iter()
            .next()
        else {
            debug!(%linked_type, "no representative property, cannot build from text");
            return Ok(None);
        };
        Ok(Some(Object::new(linked_type).with(first, text)))
    }
}

#[async_trait]
impl Transformer for StoreInput {
    fn name(&self) -> &str {
        "store.input"
    }

    async fn transform(&self, value: Value, mut call: Call<'_>) -> TransformResult<Transformed> {
        let form = call.require_form(self.name())?;
        let naming = &self.c.config.naming;
        let property = call.property;
        let id_input = naming.id_input_name(&self.c.field_name(property));
        let submitted = form.get(&id_input).and_then(|raw| {
            let parsed = Identifier::parse_lenient(raw);
            if parsed.is_none() && !raw.trim().is_empty() {
                debug!(property, raw, "dropping malformed identifier");
            }
            parsed
        });
        let current = current_identifier(&self.c, call.owner, property, &value);

        if submitted.is_some() && submitted == current {
            debug!(property, "reference unchanged");
            return Ok(Transformed::AlreadyApplied);
        }

        let fk_field = naming.foreign_key_field(property);
        let replacement = match submitted {
            Some(id) => {
                debug!(property, %id, "reference replaced by identifier");
                call.owner.remove(property);
                call.owner.set(fk_field, Value::Reference(id));
                return Ok(Transformed::AlreadyApplied);
            }
            None => match MaybeEntity::classify(&value) {
                MaybeEntity::TransientObject(_) => Some(value.clone()),
                MaybeEntity::Connected(_) if value.as_object().is_some() => Some(value.clone()),
                MaybeEntity::Connected(id) => Some(Value::Reference(id)),
                MaybeEntity::RawScalar(text) if !text.is_empty() => {
                    match self.object_from_text(&call, &value, text)? {
                        Some(object) => Some(Value::object(object)),
                        None => return Ok(Transformed::AlreadyApplied),
                    }
                }
                MaybeEntity::RawScalar(_) | MaybeEntity::Absent => None,
            },
        };

        call.owner.remove(property);
        call.owner.remove(&fk_field);
        match replacement {
            Some(Value::Reference(id)) => {
                call.owner.set(fk_field, Value::Reference(id));
            }
            Some(linked) => {
                debug!(property, "reference replaced by value");
                call.owner.set(property, linked);
            }
            None => debug!(property, "reference cleared"),
        }
        Ok(Transformed::AlreadyApplied)
    }
}

// ---------------------------------------------------------------------------
// HTML OUTPUT
// ---------------------------------------------------------------------------

/// The escaped representative string of the linked value, empty when
/// unset.
#[derive(Debug)]
pub struct StoreOutput {
    c: Collaborators,
}

impl StoreOutput {
    pub fn new(c: Collaborators) -> Self {
        Self { c }
    }
}

#[async_trait]
impl Transformer for StoreOutput {
    fn name(&self) -> &str {
        "store.output"
    }

    async fn transform(&self, value: Value, _call: Call<'_>) -> TransformResult<Transformed> {
        let text = if value.is_truthy() {
            self.c.representative(&value)
        } else {
            String::new()
        };
        Ok(Transformed::Applied(Value::Text(text)))
    }
}

// ---------------------------------------------------------------------------
// SQL SAVE
// ---------------------------------------------------------------------------

/// Writes the foreign-key column into the owner's record, saving a
/// transient linked object first.
///
/// The column takes the linked value's identifier, else the owner's
/// foreign-key field, else whatever the record already holds, else null.
///
/// A failed cascading save propagates unchanged and leaves the record
/// untouched.
#[derive(Debug)]
pub struct StoreSave {
    c: Collaborators,
}

impl StoreSave {
    pub fn new(c: Collaborators) -> Self {
        Self { c }
    }
}

#[async_trait]
impl Transformer for StoreSave {
    fn name(&self) -> &str {
        "store.save"
    }

    async fn transform(&self, value: Value, mut call: Call<'_>) -> TransformResult<Transformed> {
        call.require_record(self.name())?;
        let property = call.property;
        let resolved = match value {
            Value::Object(object) if self.c.store.is_connected(&object) => object.id(),
            Value::Object(object) => {
                debug!(property, linked_type = %object.type_name(), "cascading save");
                let saved = self.c.store.save(*object).await?;
                let id = saved.id();
                call.owner.set(property, Value::object(saved));
                id
            }
            other => identifier_of(&other),
        };

        let naming = &self.c.config.naming;
        let resolved = resolved.or_else(|| {
            call.owner
                .get(&naming.foreign_key_field(property))
                .and_then(identifier_of)
        });
        let column = naming.foreign_key_column(property);
        let record = call.require_record(self.name())?;
        let fk = match resolved {
            Some(id) => Value::Reference(id),
            None => record.get(&column).cloned().unwrap_or(Value::Null),
        };
        debug!(property, column = %column, value = %fk.to_display_string(), "foreign key written");
        record.set(column, fk);
        Ok(Transformed::AlreadyApplied)
    }
}
