//! Multi-reference ("collection") synchronizer: a property holding a list
//! of linked entities.
//!
//! In memory the property holds a list of linked objects (or bare
//! references). A form may instead leave a sibling list of desired
//! identifiers (`tagsIds`). In storage membership is a set of link edges
//! read and written through the [`DataStore`](weft_store::DataStore).

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::debug;
use weft_transform::markup::{self, Element};
use weft_transform::{
    Call, Collaborators, Context, HtmlContainer, TransformError, TransformResult, Transformed,
    Transformer,
};
use weft_types::{identifier_of, Direction, Format, Identifier, Object, TypeName, Value};

use crate::pending::{DesiredLinks, PendingLinks};

fn element_type(c: &Collaborators, call: &Call<'_>) -> TransformResult<TypeName> {
    c.reflection
        .collection_element_type(call.owner_type(), call.property)
        .ok_or_else(|| TransformError::UnknownProperty {
            type_name: call.owner_type().clone(),
            property: call.property.to_string(),
        })
}

/// Submitted entries in submission order: identifier keys ascending by
/// value, then the remaining keys as given.
fn submission_order(
    entries: BTreeMap<String, Value>,
) -> Vec<(Option<Identifier>, String, Value)> {
    let mut ordered: Vec<_> = entries
        .into_iter()
        .map(|(key, value)| (Identifier::parse_lenient(&key), key, value))
        .collect();
    ordered.sort_by_key(|(id, _, _)| (id.is_none(), *id));
    ordered
}

/// The members of a collection value. Null is the empty collection and a
/// lone value a one-member collection.
fn members(value: Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::List(values) => values,
        Value::Identifiers(ids) => ids.into_iter().map(Value::Reference).collect(),
        other => vec![other],
    }
}

// ---------------------------------------------------------------------------
// HTML EDIT
// ---------------------------------------------------------------------------

/// One list item per member, keyed by the member's identifier, plus a
/// trailing blank input for adding a member.
#[derive(Debug)]
pub struct CollectionEdit {
    c: Collaborators,
}

impl CollectionEdit {
    pub fn new(c: Collaborators) -> Self {
        Self { c }
    }
}

#[async_trait]
impl Transformer for CollectionEdit {
    fn name(&self) -> &str {
        "collection.edit"
    }

    async fn transform(&self, value: Value, call: Call<'_>) -> TransformResult<Transformed> {
        let element_type = element_type(&self.c, &call)?;
        let field_id = self.c.field_id(call.property);
        let field_name = self.c.field_name(call.property);

        let mut items = String::new();
        for member in members(value) {
            let key = match &member {
                Value::Object(object) if self.c.store.is_connected(object) => object.id(),
                Value::Object(_) => None,
                other => identifier_of(other),
            }
            .map(|id| id.to_string())
            .unwrap_or_default();
            let input = Element::input()
                .attr("id", format!("{field_id}.{key}"))
                .attr("name", format!("{field_name}.{key}"))
                .attr("value", self.c.representative(&member));
            items.push_str(&markup::wrap("li", &input.to_string()));
        }
        let add = Element::input()
            .attr("id", field_id.as_str())
            .attr("name", field_name.as_str())
            .attr("placeholder", "+");
        items.push_str(&markup::wrap("li", &add.to_string()));

        let list = Element::new("ul")
            .flag("data-multiple-contained-auto-width")
            .attr("data-fetch", self.c.fetch_route(&element_type))
            .attr("data-type", "objects");
        let html = format!(
            "{}{list}{items}</ul>",
            self.c.label(call.owner_type(), call.property)
        );
        Ok(Transformed::Applied(Value::Text(html)))
    }
}

// ---------------------------------------------------------------------------
// HTML INPUT
// ---------------------------------------------------------------------------

/// Applies a submitted collection to the owner.
///
/// `value` maps submission keys (member identifiers) to submitted values.
/// When every submitted value is an object the property becomes exactly
/// those objects, identifier keys in ascending order. Otherwise the keys
/// are read as selected identifiers: the property is removed and the
/// desired-identifiers field is set, dropping keys that are not
/// identifiers.
#[derive(Debug)]
pub struct CollectionInput {
    c: Collaborators,
}

impl CollectionInput {
    pub fn new(c: Collaborators) -> Self {
        Self { c }
    }
}

#[async_trait]
impl Transformer for CollectionInput {
    fn name(&self) -> &str {
        "collection.input"
    }

    async fn transform(&self, value: Value, mut call: Call<'_>) -> TransformResult<Transformed> {
        call.require_form(self.name())?;
        let property = call.property;
        let entries: BTreeMap<String, Value> = match value {
            Value::Map(entries) => entries,
            Value::Null => BTreeMap::new(),
            other => {
                debug!(property, kind = ?other, "collection input is not a map, ignoring");
                return Ok(Transformed::AlreadyApplied);
            }
        };

        let all_objects =
            !entries.is_empty() && entries.values().all(|v| v.as_object().is_some());
        let entries = submission_order(entries);
        if all_objects {
            let mut list = Vec::with_capacity(entries.len());
            for (id, _, member) in entries {
                let Value::Object(mut object) = member else {
                    continue;
                };
                if let Some(id) = id {
                    object.assign_id(id)?;
                }
                list.push(Value::Object(object));
            }
            debug!(property, members = list.len(), "collection replaced by objects");
            call.owner.remove(&self.c.config.naming.desired_ids_field(property));
            call.owner.set(property, Value::List(list));
            return Ok(Transformed::AlreadyApplied);
        }

        let ids: Vec<Identifier> = entries
            .iter()
            .filter_map(|(id, key, _)| {
                if id.is_none() {
                    debug!(property, key = %key, "dropping non-identifier key");
                }
                *id
            })
            .collect();
        debug!(property, selected = ids.len(), "collection replaced by identifiers");
        call.owner.remove(property);
        call.owner.set(
            self.c.config.naming.desired_ids_field(property),
            Value::Identifiers(ids),
        );
        Ok(Transformed::AlreadyApplied)
    }
}

// ---------------------------------------------------------------------------
// HTML OUTPUT
// ---------------------------------------------------------------------------

/// Display markup of a collection.
///
/// A composition renders as a table of the element type's non-composite
/// properties, each cell produced by the registry's HTML OUTPUT
/// transformer for that property (escaped when none is registered).
/// Otherwise members render as a bulleted list inside a container, or as
/// a comma-separated line. Representative strings are always escaped.
#[derive(Debug)]
pub struct CollectionOutput {
    c: Collaborators,
}

impl CollectionOutput {
    pub fn new(c: Collaborators) -> Self {
        Self { c }
    }

    async fn table(
        &self,
        call: &Call<'_>,
        element_type: &TypeName,
        members: Vec<Value>,
    ) -> TransformResult<String> {
        let reflection = &self.c.reflection;
        let columns: Vec<String> = reflection
            .property_names(element_type)
            .into_iter()
            .filter(|p| !reflection.is_composite(element_type, p))
            .collect();

        let mut rows = Vec::with_capacity(members.len() + 3);
        rows.push("<table>".to_string());
        let header: String = columns
            .iter()
            .map(|p| markup::wrap("th", &markup::escape_text(&(self.c.deps.tr)(p))))
            .collect();
        rows.push(markup::wrap("tr", &header));

        for member in members {
            let mut object = match member {
                Value::Object(object) => *object,
                other => match identifier_of(&other) {
                    Some(id) => Object::stub(element_type.clone(), id),
                    None => continue,
                },
            };
            let mut cells = String::new();
            for column in &columns {
                let Some(property_type) = reflection.property_type(element_type, column) else {
                    continue;
                };
                let value = object.get(column).cloned().unwrap_or_default();
                let rendered = call
                    .registry
                    .resolve(&property_type.key(), Format::Html, Direction::Output)
                    .is_some();
                let mut container = HtmlContainer::new(false);
                let cell = call
                    .registry
                    .apply(
                        &property_type,
                        Format::Html,
                        Direction::Output,
                        value,
                        &mut object,
                        column,
                        Context::Output(&mut container),
                    )
                    .await?
                    .into_value()
                    .map(|v| v.to_display_string())
                    .unwrap_or_default();
                // Values passed through untransformed are plain text.
                let cell = if rendered { cell } else { markup::escape_text(&cell) };
                cells.push_str(&markup::wrap("td", &cell));
            }
            rows.push(markup::wrap("tr", &cells));
        }
        rows.push("</table>".to_string());
        Ok(rows.join("\n"))
    }
}

#[async_trait]
impl Transformer for CollectionOutput {
    fn name(&self) -> &str {
        "collection.output"
    }

    async fn transform(&self, value: Value, mut call: Call<'_>) -> TransformResult<Transformed> {
        let members = members(value);
        if members.is_empty() {
            return Ok(Transformed::Applied(Value::text("")));
        }

        if self
            .c
            .reflection
            .is_contained_by(call.owner_type(), call.property)
        {
            let element_type = element_type(&self.c, &call)?;
            let html = self.table(&call, &element_type, members).await?;
            return Ok(Transformed::Applied(Value::Text(html)));
        }

        let labels: Vec<String> = members
            .iter()
            .map(|m| markup::escape_text(&self.c.representative(m)))
            .collect();
        if let Some(container) = call.context.container_mut().filter(|c| c.container) {
            container.container = false;
            let items: String = labels.iter().map(|l| markup::wrap("li", l)).collect();
            return Ok(Transformed::Applied(Value::Text(markup::wrap("ul", &items))));
        }
        Ok(Transformed::Applied(Value::Text(labels.join(", "))))
    }
}

// ---------------------------------------------------------------------------
// SQL SAVE
// ---------------------------------------------------------------------------

/// Prepares the reconciliation of a collection's link edges.
///
/// Nothing touches the store here: the result is a
/// [`Transformed::Deferred`] [`PendingLinks`] committed once the owner's
/// identifier is final. An explicit desired-identifiers field wins over
/// the member list.
#[derive(Debug)]
pub struct CollectionSave {
    c: Collaborators,
}

impl CollectionSave {
    pub fn new(c: Collaborators) -> Self {
        Self { c }
    }
}

#[async_trait]
impl Transformer for CollectionSave {
    fn name(&self) -> &str {
        "collection.save"
    }

    async fn transform(&self, value: Value, call: Call<'_>) -> TransformResult<Transformed> {
        let property = call.property;
        let desired_field = self.c.config.naming.desired_ids_field(property);
        let desired = match call.owner.get(&desired_field) {
            Some(Value::Identifiers(ids)) => DesiredLinks::Explicit(ids.clone()),
            Some(other) => DesiredLinks::Explicit(
                members(other.clone()).iter().filter_map(identifier_of).collect(),
            ),
            None => DesiredLinks::Members(members(value)),
        };
        let load_previous = self.c.store.is_connected(call.owner);
        debug!(property, load_previous, "collection save prepared");
        let pending = PendingLinks::new(
            property,
            desired,
            load_previous,
            self.c.store.clone(),
            self.c.config.naming.clone(),
        );
        Ok(Transformed::Deferred(Box::new(pending)))
    }
}
