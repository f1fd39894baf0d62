use std::fmt;
use std::sync::Arc;

use weft_reflect::{Precision, Reflection};
use weft_store::DataStore;
use weft_types::{TypeName, Value};

use crate::config::MapperConfig;
use crate::deps::Dependencies;
use crate::markup;

/// The shared, read-only collaborators a transformer is constructed with.
///
/// Built once before the registry and cloned cheaply into every
/// transformer that needs it.
#[derive(Clone)]
pub struct Collaborators {
    pub deps: Arc<Dependencies>,
    pub config: Arc<MapperConfig>,
    pub reflection: Arc<dyn Reflection>,
    pub store: Arc<dyn DataStore>,
}

impl Collaborators {
    pub fn new(
        deps: Dependencies,
        config: MapperConfig,
        reflection: Arc<dyn Reflection>,
        store: Arc<dyn DataStore>,
    ) -> Self {
        Self {
            deps: Arc::new(deps),
            config: Arc::new(config),
            reflection,
            store,
        }
    }

    pub fn field_id(&self, property: &str) -> String {
        (self.deps.field_id_of)(property)
    }

    pub fn field_name(&self, property: &str) -> String {
        (self.deps.field_name_of)(property)
    }

    /// `<label>` of `owner.property` with its translated display text.
    pub fn label(&self, owner: &TypeName, property: &str) -> String {
        markup::label(&self.field_id(property), &self.deps.label_text(owner, property))
    }

    /// Label, field separator, then the widget markup.
    pub fn labelled(&self, owner: &TypeName, property: &str, widget: &str) -> String {
        format!(
            "{}{}{widget}",
            self.label(owner, property),
            self.config.field_separator
        )
    }

    /// Human-readable string of a linked value.
    ///
    /// Objects go through the injected representative hook; anything else
    /// (a bare identifier, raw text) renders as plain text.
    pub fn representative(&self, value: &Value) -> String {
        match value {
            Value::Object(object) => (self.deps.representative_value_of)(object),
            Value::Null => String::new(),
            other => other.to_display_string(),
        }
    }

    /// Client-side lookup endpoint of a type.
    pub fn fetch_route(&self, type_name: &TypeName) -> String {
        format!("{}{}", (self.deps.route_of)(type_name), self.config.summary_suffix)
    }

    /// Display precision of a numeric property: the injected hook first,
    /// then reflection, then the configured default.
    pub fn precision(&self, owner: &TypeName, property: &str) -> Precision {
        (self.deps.precision_of)(owner, property)
            .or_else(|| self.reflection.precision_of(owner, property))
            .unwrap_or(self.config.number.default_precision)
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
