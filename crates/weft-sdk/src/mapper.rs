use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};
use weft_reflect::{Reflection, Schema};
use weft_store::{DataStore, InMemoryDataStore};
use weft_transform::{
    Collaborators, Context, DeferredSave, Dependencies, HtmlContainer, MapperConfig, Transformed,
    TransformerRegistry,
};
use weft_types::{
    identifier_of, Direction, EntityRef, Format, FormData, Identifier, Object, PersistedOwner,
    PropertyType, Record, TypeName, Value,
};

use crate::error::{SdkError, SdkResult};
use crate::init_core_transformers;
use crate::summary::SaveSummary;

/// Representative string of an object: its schema-declared representative
/// properties joined by spaces, else `Type#id`.
fn representative_of(schema: &Schema, object: &Object) -> String {
    let parts: Vec<String> = schema
        .representative_properties(object.type_name())
        .iter()
        .filter_map(|p| object.get(p))
        .map(Value::to_display_string)
        .filter(|s| !s.is_empty())
        .collect();
    if !parts.is_empty() {
        return parts.join(" ");
    }
    match object.id() {
        Some(id) => format!("{}#{id}", object.type_name()),
        None => object.type_name().to_string(),
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for a [`Mapper`].
pub struct MapperBuilder {
    schema: Arc<Schema>,
    store: Option<Arc<dyn DataStore>>,
    config: MapperConfig,
    deps: Option<Dependencies>,
}

impl MapperBuilder {
    /// Defaults to an empty in-memory store.
    pub fn store(mut self, store: Arc<dyn DataStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(mut self, config: MapperConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the injected dependencies. Without this, defaults derived
    /// from the configuration are used, with representative strings taken
    /// from the schema.
    pub fn dependencies(mut self, deps: Dependencies) -> Self {
        self.deps = Some(deps);
        self
    }

    /// Validate the configuration and register every transformer.
    pub fn build(self) -> SdkResult<Mapper> {
        self.config.validate()?;
        let deps = match self.deps {
            Some(deps) => deps,
            None => {
                let schema = Arc::clone(&self.schema);
                Dependencies::from_config(&self.config)
                    .with_representative_value_of(move |object| representative_of(&schema, object))
            }
        };
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryDataStore::new()));
        let reflection: Arc<dyn Reflection> = self.schema.clone();
        let c = Collaborators::new(deps, self.config, reflection, store);

        let mut registry = TransformerRegistry::new();
        init_core_transformers(&mut registry, &c, &self.schema.store_targets());
        info!(transformers = registry.len(), "mapper ready");

        Ok(Mapper {
            schema: self.schema,
            c,
            registry,
        })
    }
}

impl fmt::Debug for MapperBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperBuilder")
            .field("config", &self.config)
            .field("custom_store", &self.store.is_some())
            .field("custom_dependencies", &self.deps.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Mapper
// ---------------------------------------------------------------------------

/// Drives the transformers of every property of an object: edit and
/// display rendering, form input, and the two-phase save.
pub struct Mapper {
    schema: Arc<Schema>,
    c: Collaborators,
    registry: TransformerRegistry,
}

impl Mapper {
    pub fn builder(schema: Schema) -> MapperBuilder {
        MapperBuilder {
            schema: Arc::new(schema),
            store: None,
            config: MapperConfig::default(),
            deps: None,
        }
    }

    /// Declared properties of `type_name` with their types, in
    /// declaration order.
    fn properties(&self, type_name: &TypeName) -> SdkResult<Vec<(String, PropertyType)>> {
        let declared = self
            .schema
            .get(type_name)
            .ok_or_else(|| SdkError::UnknownType(type_name.clone()))?;
        Ok(declared
            .properties
            .iter()
            .map(|p| (p.name.clone(), p.property_type.clone()))
            .collect())
    }

    // ---- Rendering ----

    /// Edit markup of every property, one block per line.
    pub async fn render_edit(&self, object: &Object) -> SdkResult<String> {
        let mut scratch = object.clone();
        let mut blocks = Vec::new();
        for (property, property_type) in self.properties(object.type_name())? {
            let value = scratch.get(&property).cloned().unwrap_or_default();
            let outcome = self
                .registry
                .apply(
                    &property_type,
                    Format::Html,
                    Direction::Edit,
                    value,
                    &mut scratch,
                    &property,
                    Context::None,
                )
                .await?;
            if let Some(html) = outcome.into_value() {
                blocks.push(html.to_display_string());
            }
        }
        Ok(blocks.join("\n"))
    }

    /// Display markup of every property, keyed by property name.
    pub async fn render_output(
        &self,
        object: &Object,
        mandatory_container: bool,
    ) -> SdkResult<BTreeMap<String, String>> {
        let mut scratch = object.clone();
        let mut rendered = BTreeMap::new();
        for (property, property_type) in self.properties(object.type_name())? {
            let value = scratch.get(&property).cloned().unwrap_or_default();
            let mut container = HtmlContainer::new(mandatory_container);
            let outcome = self
                .registry
                .apply(
                    &property_type,
                    Format::Html,
                    Direction::Output,
                    value,
                    &mut scratch,
                    &property,
                    Context::Output(&mut container),
                )
                .await?;
            if let Some(html) = outcome.into_value() {
                rendered.insert(property, html.to_display_string());
            }
        }
        Ok(rendered)
    }

    // ---- Input ----

    /// Apply a submitted form to `object`.
    ///
    /// Properties the form says nothing about are left untouched.
    /// Collections receive their `field.<key>` entries as a map.
    pub async fn apply_input(&self, object: &mut Object, form: &FormData) -> SdkResult<()> {
        let naming = &self.c.config.naming;
        for (property, property_type) in self.properties(object.type_name())? {
            let field_name = self.c.field_name(&property);
            let submitted = match &property_type {
                PropertyType::Collection(_) => {
                    let entries: BTreeMap<String, Value> = form
                        .nested(&field_name)
                        .map(|(key, text)| (key.to_string(), Value::text(text)))
                        .collect();
                    if entries.is_empty() && !form.contains(&field_name) {
                        continue;
                    }
                    Value::Map(entries)
                }
                PropertyType::Store(_) => {
                    let id_input = naming.id_input_name(&field_name);
                    if !form.contains(&field_name) && !form.contains(&id_input) {
                        continue;
                    }
                    Value::text(form.get(&field_name).unwrap_or_default())
                }
                _ => match form.get(&field_name) {
                    Some(text) => Value::text(text),
                    None => continue,
                },
            };

            let outcome = self
                .registry
                .apply(
                    &property_type,
                    Format::Html,
                    Direction::Input,
                    submitted,
                    object,
                    &property,
                    Context::Input(form),
                )
                .await?;
            match outcome {
                Transformed::Applied(value) => {
                    object.set(property, value);
                }
                Transformed::AlreadyApplied => {}
                Transformed::Deferred(pending) => {
                    debug!(
                        property = pending.property(),
                        "ignoring deferred operation during input"
                    );
                }
            }
        }
        Ok(())
    }

    // ---- Persistence ----

    /// `true` if the object holds anything worth saving for `property`.
    fn has_state(&self, object: &Object, property: &str, property_type: &PropertyType) -> bool {
        let naming = &self.c.config.naming;
        object.contains(property)
            || match property_type {
                PropertyType::Store(_) => object.contains(&naming.foreign_key_field(property)),
                PropertyType::Collection(_) => object.contains(&naming.desired_ids_field(property)),
                _ => false,
            }
    }

    /// Two-phase save.
    ///
    /// Every property's SQL SAVE transformer contributes to the owner's
    /// row; relations that need the owner's identifier are deferred. The
    /// row is then written (assigning the identifier of a new owner) and
    /// the deferred relations are committed in property order.
    pub async fn save(&self, object: &mut Object) -> SdkResult<SaveSummary> {
        let mut record = Record::new();
        let mut deferred: Vec<Box<dyn DeferredSave>> = Vec::new();

        for (property, property_type) in self.properties(object.type_name())? {
            if !self.has_state(object, &property, &property_type) {
                continue;
            }
            let value = object.get(&property).cloned().unwrap_or_default();
            let outcome = self
                .registry
                .apply(
                    &property_type,
                    Format::Sql,
                    Direction::Save,
                    value,
                    object,
                    &property,
                    Context::Save(&mut record),
                )
                .await?;
            match outcome {
                Transformed::Applied(value) => {
                    record.set(property, value);
                }
                Transformed::AlreadyApplied => {}
                Transformed::Deferred(pending) => deferred.push(pending),
            }
        }

        let created = object.is_transient();
        let id = self
            .c
            .store
            .write_record(object.type_name(), object.id(), &record)
            .await?;
        if created {
            object.assign_id(id)?;
        }
        let columns = record.len();

        let mut owner = PersistedOwner::new(object)?;
        let entity = owner.entity().clone();
        let mut links = Vec::with_capacity(deferred.len());
        for pending in deferred {
            links.push(pending.commit(&mut owner).await?);
        }

        let summary = SaveSummary {
            entity,
            created,
            columns,
            links,
        };
        info!(
            entity = %summary.entity,
            created,
            columns,
            link_mutations = summary.link_mutations(),
            "saved"
        );
        Ok(summary)
    }

    /// Hydrate an object from a raw row.
    ///
    /// Scalars go through their SQL READ transformers. A single reference
    /// comes back as its foreign-key field; collections are not part of
    /// the row and stay unset.
    pub async fn read(
        &self,
        type_name: &TypeName,
        id: Option<Identifier>,
        record: &Record,
    ) -> SdkResult<Object> {
        let naming = &self.c.config.naming;
        let mut object = match id {
            Some(id) => Object::stub(type_name.clone(), id),
            None => Object::new(type_name.clone()),
        };
        for (property, property_type) in self.properties(type_name)? {
            match &property_type {
                PropertyType::Store(_) => {
                    let column = naming.foreign_key_column(&property);
                    if let Some(id) = record.get(&column).and_then(identifier_of) {
                        object.set(naming.foreign_key_field(&property), Value::Reference(id));
                    }
                }
                PropertyType::Collection(_) => {}
                _ => {
                    let Some(raw) = record.get(&property).cloned() else {
                        continue;
                    };
                    let outcome = self
                        .registry
                        .apply(
                            &property_type,
                            Format::Sql,
                            Direction::Read,
                            raw,
                            &mut object,
                            &property,
                            Context::None,
                        )
                        .await?;
                    if let Some(value) = outcome.into_value().filter(|v| !v.is_null()) {
                        object.set(property, value);
                    }
                }
            }
        }
        Ok(object)
    }

    /// Read an entity's row and its collection memberships. Collections
    /// come back as lists of bare references.
    pub async fn load(&self, entity: &EntityRef) -> SdkResult<Option<Object>> {
        let Some(record) = self.c.store.read_record(entity).await? else {
            return Ok(None);
        };
        let mut object = self.read(&entity.type_name, Some(entity.id), &record).await?;
        for (property, property_type) in self.properties(&entity.type_name)? {
            if property_type.is_collection() {
                let ids = self.c.store.read_linked_ids(entity, &property).await?;
                let members = ids.into_iter().map(Value::Reference).collect();
                object.set(property, Value::List(members));
            }
        }
        Ok(Some(object))
    }

    // ---- Accessors ----

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &MapperConfig {
        &self.c.config
    }

    pub fn registry(&self) -> &TransformerRegistry {
        &self.registry
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.c
    }

    pub fn store(&self) -> &Arc<dyn DataStore> {
        &self.c.store
    }
}

impl fmt::Debug for Mapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapper")
            .field("types", &self.schema.type_names().count())
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use weft_store::StoreOp;

    const SCHEMA: &str = r#"
        [[types]]
        name = "Client"
        representative = ["name"]
        properties = [{ name = "name", type = "text" }]

        [[types]]
        name = "Tag"
        representative = ["label"]
        properties = [{ name = "label", type = "text" }]

        [[types]]
        name = "Order"
        representative = ["number"]

        [[types.properties]]
        name = "number"
        type = "text"

        [[types.properties]]
        name = "paid"
        type = "bool"

        [[types.properties]]
        name = "total"
        type = "number"
        precision = { minimum = 2, maximum = 2 }

        [[types.properties]]
        name = "client"
        type = "Client"

        [[types.properties]]
        name = "tags"
        type = "[Tag]"
    "#;

    fn id(n: u64) -> Identifier {
        Identifier::new(n).unwrap()
    }

    fn mapper() -> (Mapper, Arc<InMemoryDataStore>) {
        let store = Arc::new(InMemoryDataStore::new());
        let mapper = Mapper::builder(Schema::from_toml_str(SCHEMA).unwrap())
            .store(store.clone())
            .build()
            .unwrap();
        (mapper, store)
    }

    async fn seed(store: &InMemoryDataStore, type_name: &str, field: &str, text: &str) -> Identifier {
        let saved = store
            .save(Object::new(type_name).with(field, text))
            .await
            .unwrap();
        saved.id().unwrap()
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn edit_renders_every_property() {
        let (mapper, _) = mapper();
        let order = Object::stub("Order", id(1))
            .with("number", "A-1")
            .with("paid", true)
            .with("client", Object::stub("Client", id(4)).with("name", "Acme"))
            .with("tags", Value::List(vec![Object::stub("Tag", id(2)).with("label", "red").into()]));
        let html = mapper.render_edit(&order).await.unwrap();
        let blocks: Vec<&str> = html.split("<label").skip(1).collect();
        assert_eq!(blocks.len(), 5);
        assert!(html.contains("<input id=\"number\" name=\"number\" value=\"A-1\">"));
        assert!(html.contains("<input checked id=\"paid\""));
        assert!(html.contains("data-fetch=\"/Client/summary\""));
        assert!(html.contains("name=\"client_id\" type=\"hidden\" value=\"4\""));
        assert!(html.contains("<li><input id=\"tags.2\" name=\"tags.2\" value=\"red\"></li>"));
    }

    #[tokio::test]
    async fn output_wraps_scalars_in_containers() {
        let (mapper, _) = mapper();
        let order = Object::new("Order")
            .with("number", "A-1")
            .with("total", 12.5)
            .with("tags", Value::List(vec![Object::stub("Tag", id(2)).with("label", "red").into()]));
        let out = mapper.render_output(&order, true).await.unwrap();
        assert_eq!(out["total"], "<div>12,50</div>");
        assert_eq!(out["paid"], "<div>no</div>");
        assert_eq!(out["tags"], "<ul><li>red</li></ul>");

        let out = mapper.render_output(&order, false).await.unwrap();
        assert_eq!(out["number"], "A-1");
        assert_eq!(out["total"], "12,50");
        assert_eq!(out["client"], "");
    }

    #[tokio::test]
    async fn unknown_type_is_an_error() {
        let (mapper, _) = mapper();
        let err = mapper.render_edit(&Object::new("Ghost")).await.unwrap_err();
        assert!(matches!(err, SdkError::UnknownType(_)));
    }

    // -----------------------------------------------------------------------
    // Input and save
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn form_to_rows_and_links() {
        let (mapper, store) = mapper();
        let globex = seed(&store, "Client", "name", "Globex").await;
        let red = seed(&store, "Tag", "label", "red").await;
        let blue = seed(&store, "Tag", "label", "blue").await;
        store.clear_ops().unwrap();

        let mut order = Object::new("Order");
        let form = FormData::from_pairs([
            ("number".to_string(), "A-7".to_string()),
            ("paid".to_string(), "1".to_string()),
            ("total".to_string(), "1,5K".to_string()),
            ("client".to_string(), "Globex".to_string()),
            ("client_id".to_string(), globex.to_string()),
            (format!("tags.{red}"), "red".to_string()),
            (format!("tags.{blue}"), "blue".to_string()),
            ("tags".to_string(), String::new()),
        ]);
        mapper.apply_input(&mut order, &form).await.unwrap();
        assert_eq!(order.get("paid"), Some(&Value::Bool(true)));
        assert_eq!(order.get("total"), Some(&Value::Number(1500.0)));
        assert_eq!(order.get("clientId"), Some(&Value::Reference(globex)));
        assert_eq!(order.get("tagsIds"), Some(&Value::Identifiers(vec![red, blue])));

        let summary = mapper.save(&mut order).await.unwrap();
        assert!(summary.created);
        let entity = summary.entity.clone();
        assert_eq!(order.id(), Some(entity.id));
        assert_eq!(summary.links_of("tags").unwrap().inserted, vec![red, blue]);

        let row = store.row(&entity).unwrap().unwrap();
        assert_eq!(row.get("number"), Some(&Value::text("A-7")));
        assert_eq!(row.get("paid"), Some(&Value::Integer(1)));
        assert_eq!(row.get("client_id"), Some(&Value::Reference(globex)));
        assert_eq!(store.links(&entity, "tags").unwrap(), vec![red, blue]);

        // A brand-new owner has no previous links to read.
        assert!(!store
            .ops()
            .unwrap()
            .iter()
            .any(|op| matches!(op, StoreOp::ReadLinks { .. })));

        store.clear_ops().unwrap();
        let again = mapper.save(&mut order).await.unwrap();
        assert!(!again.created);
        assert_eq!(again.link_mutations(), 0);
    }

    #[tokio::test]
    async fn new_linked_objects_are_saved_first() {
        let (mapper, store) = mapper();
        let mut order = Object::new("Order")
            .with("number", "B-1")
            .with("client", Object::new("Client").with("name", "Initech"))
            .with("tags", Value::List(vec![Object::new("Tag").with("label", "new").into()]));

        let summary = mapper.save(&mut order).await.unwrap();

        let client = order.get("client").and_then(Value::as_object).unwrap();
        let client_id = client.id().unwrap();
        let row = store.row(&summary.entity).unwrap().unwrap();
        assert_eq!(row.get("client_id"), Some(&Value::Reference(client_id)));

        let tag_id = order
            .get("tags")
            .and_then(Value::as_list)
            .and_then(|l| l.first())
            .and_then(identifier_of)
            .unwrap();
        assert_eq!(store.links(&summary.entity, "tags").unwrap(), vec![tag_id]);
    }

    #[tokio::test]
    async fn unsubmitted_properties_are_untouched() {
        let (mapper, _) = mapper();
        let mut order = Object::new("Order").with("number", "C-3").with("paid", true);
        let form = FormData::from_pairs([("total", "7")]);
        mapper.apply_input(&mut order, &form).await.unwrap();
        assert_eq!(order.get("number"), Some(&Value::text("C-3")));
        assert_eq!(order.get("paid"), Some(&Value::Bool(true)));
        assert_eq!(order.get("total"), Some(&Value::Number(7.0)));
        assert!(!order.contains("tagsIds"));
        assert!(!order.contains("clientId"));
    }

    #[tokio::test]
    async fn load_restores_row_and_links() {
        let (mapper, store) = mapper();
        let acme = seed(&store, "Client", "name", "Acme").await;
        let mut order = Object::new("Order")
            .with("number", "D-4")
            .with("paid", false)
            .with("clientId", Value::Reference(acme))
            .with("tagsIds", Value::Identifiers(vec![id(30), id(31)]));
        let summary = mapper.save(&mut order).await.unwrap();

        let loaded = mapper.load(&summary.entity).await.unwrap().unwrap();
        assert_eq!(loaded.id(), Some(summary.entity.id));
        assert_eq!(loaded.get("number"), Some(&Value::text("D-4")));
        assert_eq!(loaded.get("paid"), Some(&Value::Bool(false)));
        assert_eq!(loaded.get("clientId"), Some(&Value::Reference(acme)));
        assert_eq!(
            loaded.get("tags"),
            Some(&Value::List(vec![Value::Reference(id(30)), Value::Reference(id(31))]))
        );

        let missing = EntityRef::new("Order", id(999));
        assert!(mapper.load(&missing).await.unwrap().is_none());
    }
}
