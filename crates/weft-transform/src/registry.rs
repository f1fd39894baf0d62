use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};
use weft_types::{Direction, Format, Object, PropertyType, TypeKey, Value};

use crate::error::TransformResult;
use crate::transformer::{Call, Context, FormatTransformer, Transformed, Transformer};

/// Lookup table from (subject type, format, direction) to a transformer.
///
/// Resolution order:
///
/// 1. the exact `(type, format, direction)` registration;
/// 2. the wildcard `(format, direction)` registration;
/// 3. nothing, which callers treat as pass-through.
///
/// The registry is filled once at startup and shared read-only afterwards
/// (typically behind an `Arc`). Registering takes `&mut self`, so a
/// registry that is already shared cannot be mutated.
#[derive(Default)]
pub struct TransformerRegistry {
    typed: HashMap<(TypeKey, Format, Direction), Arc<dyn Transformer>>,
    wildcard: HashMap<(Format, Direction), Arc<dyn Transformer>>,
    formats: HashMap<Format, Arc<dyn FormatTransformer>>,
}

impl TransformerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transformer. `None` registers the wildcard fallback for
    /// `(format, direction)`.
    ///
    /// Last write wins per exact key; the replaced transformer is returned.
    pub fn register(
        &mut self,
        subject: Option<TypeKey>,
        format: Format,
        direction: Direction,
        transformer: Arc<dyn Transformer>,
    ) -> Option<Arc<dyn Transformer>> {
        debug!(
            subject = %subject.as_ref().map_or_else(|| "*".to_string(), ToString::to_string),
            %format,
            %direction,
            transformer = transformer.name(),
            "registered transformer"
        );
        match subject {
            Some(key) => self.typed.insert((key, format, direction), transformer),
            None => self.wildcard.insert((format, direction), transformer),
        }
    }

    /// Register the post-processing step of a format.
    pub fn register_format(
        &mut self,
        format: Format,
        transformer: Arc<dyn FormatTransformer>,
    ) -> Option<Arc<dyn FormatTransformer>> {
        debug!(%format, transformer = transformer.name(), "registered format transformer");
        self.formats.insert(format, transformer)
    }

    /// The most specific transformer for the triple, if any.
    pub fn resolve(
        &self,
        subject: &TypeKey,
        format: Format,
        direction: Direction,
    ) -> Option<Arc<dyn Transformer>> {
        self.typed
            .get(&(subject.clone(), format, direction))
            .or_else(|| self.wildcard.get(&(format, direction)))
            .cloned()
    }

    /// Number of type and wildcard registrations.
    pub fn len(&self) -> usize {
        self.typed.len() + self.wildcard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.typed.is_empty() && self.wildcard.is_empty()
    }

    /// Resolve, invoke, then run the format transformer.
    ///
    /// A resolution miss passes `value` through unchanged. The format
    /// transformer only sees [`Transformed::Applied`] values.
    #[allow(clippy::too_many_arguments)]
    pub async fn apply(
        &self,
        property_type: &PropertyType,
        format: Format,
        direction: Direction,
        value: Value,
        owner: &mut Object,
        property: &str,
        mut context: Context<'_>,
    ) -> TransformResult<Transformed> {
        let Some(transformer) = self.resolve(&property_type.key(), format, direction) else {
            trace!(%property_type, %format, %direction, property, "no transformer, passing through");
            return Ok(Transformed::Applied(value));
        };
        let call = Call {
            owner: &mut *owner,
            property,
            context: context.reborrow(),
            registry: self,
        };
        let outcome = transformer.transform(value, call).await?;
        Ok(match (outcome, self.formats.get(&format)) {
            (Transformed::Applied(value), Some(finisher)) => {
                Transformed::Applied(finisher.finish(value, &context))
            }
            (outcome, _) => outcome,
        })
    }
}

impl fmt::Debug for TransformerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformerRegistry")
            .field("typed", &self.typed.len())
            .field("wildcard", &self.wildcard.len())
            .field("formats", &self.formats.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transformer::{FnTransformer, HtmlContainer};
    use weft_types::TypeName;

    fn constant(name: &str, text: &'static str) -> Arc<dyn Transformer> {
        Arc::new(FnTransformer::new(name, move |_, _| {
            Ok(Transformed::Applied(Value::text(text)))
        }))
    }

    fn store_key(name: &str) -> TypeKey {
        TypeKey::Store(TypeName::from(name))
    }

    struct Bracket;

    impl FormatTransformer for Bracket {
        fn name(&self) -> &str {
            "bracket"
        }

        fn finish(&self, value: Value, context: &Context<'_>) -> Value {
            match (value, context.container()) {
                (Value::Text(s), Some(c)) if c.container => Value::Text(format!("[{s}]")),
                (value, _) => value,
            }
        }
    }

    #[test]
    fn exact_match_wins_over_wildcard() {
        let mut registry = TransformerRegistry::new();
        registry.register(None, Format::Html, Direction::Edit, constant("default", "any"));
        registry.register(
            Some(TypeKey::Bool),
            Format::Html,
            Direction::Edit,
            constant("bool", "checkbox"),
        );
        let resolved = registry
            .resolve(&TypeKey::Bool, Format::Html, Direction::Edit)
            .unwrap();
        assert_eq!(resolved.name(), "bool");
    }

    #[test]
    fn wildcard_covers_every_unregistered_type() {
        let mut registry = TransformerRegistry::new();
        registry.register(None, Format::Html, Direction::Edit, constant("default", "any"));
        registry.register(
            Some(TypeKey::Bool),
            Format::Html,
            Direction::Output,
            constant("bool", "yes"),
        );
        for key in [
            TypeKey::Bool,
            TypeKey::Number,
            TypeKey::Text,
            TypeKey::Collection,
            store_key("Client"),
        ] {
            let resolved = registry.resolve(&key, Format::Html, Direction::Edit).unwrap();
            assert_eq!(resolved.name(), "default", "key {key}");
        }
    }

    #[test]
    fn miss_is_silent() {
        let mut registry = TransformerRegistry::new();
        registry.register(None, Format::Html, Direction::Edit, constant("default", "any"));
        assert!(registry
            .resolve(&TypeKey::Text, Format::Sql, Direction::Edit)
            .is_none());
        assert!(registry
            .resolve(&TypeKey::Text, Format::Html, Direction::Output)
            .is_none());
    }

    #[test]
    fn last_registration_wins() {
        let mut registry = TransformerRegistry::new();
        let first = registry.register(
            Some(store_key("Client")),
            Format::Sql,
            Direction::Save,
            constant("first", "1"),
        );
        assert!(first.is_none());
        let replaced = registry
            .register(
                Some(store_key("Client")),
                Format::Sql,
                Direction::Save,
                constant("second", "2"),
            )
            .unwrap();
        assert_eq!(replaced.name(), "first");
        assert_eq!(registry.len(), 1);
        let resolved = registry
            .resolve(&store_key("Client"), Format::Sql, Direction::Save)
            .unwrap();
        assert_eq!(resolved.name(), "second");
    }

    #[test]
    fn store_registrations_are_per_linked_type() {
        let mut registry = TransformerRegistry::new();
        registry.register(
            Some(store_key("Client")),
            Format::Html,
            Direction::Output,
            constant("client", "c"),
        );
        assert!(registry
            .resolve(&store_key("Supplier"), Format::Html, Direction::Output)
            .is_none());
    }

    #[tokio::test]
    async fn apply_passes_through_on_miss() {
        let registry = TransformerRegistry::new();
        let mut owner = Object::new("Order");
        let out = registry
            .apply(
                &PropertyType::Text,
                Format::Html,
                Direction::Output,
                Value::text("raw"),
                &mut owner,
                "number",
                Context::None,
            )
            .await
            .unwrap();
        assert_eq!(out.into_value(), Some(Value::text("raw")));
    }

    #[tokio::test]
    async fn apply_runs_format_transformer_on_applied_values() {
        let mut registry = TransformerRegistry::new();
        registry.register(None, Format::Html, Direction::Output, constant("text", "shown"));
        registry.register_format(Format::Html, Arc::new(Bracket));
        let mut owner = Object::new("Order");

        let mut container = HtmlContainer::new(true);
        let out = registry
            .apply(
                &PropertyType::Text,
                Format::Html,
                Direction::Output,
                Value::Null,
                &mut owner,
                "number",
                Context::Output(&mut container),
            )
            .await
            .unwrap();
        assert_eq!(out.into_value(), Some(Value::text("[shown]")));

        container.container = false;
        let out = registry
            .apply(
                &PropertyType::Text,
                Format::Html,
                Direction::Output,
                Value::Null,
                &mut owner,
                "number",
                Context::Output(&mut container),
            )
            .await
            .unwrap();
        assert_eq!(out.into_value(), Some(Value::text("shown")));
    }

    #[tokio::test]
    async fn already_applied_skips_format_transformer() {
        let mut registry = TransformerRegistry::new();
        registry.register(
            Some(TypeKey::Text),
            Format::Html,
            Direction::Input,
            Arc::new(FnTransformer::new("mutating", |value, mut call| {
                call.owner.set(call.property, value);
                Ok(Transformed::AlreadyApplied)
            })),
        );
        registry.register_format(Format::Html, Arc::new(Bracket));
        let mut owner = Object::new("Order");
        let form = weft_types::FormData::new();
        let out = registry
            .apply(
                &PropertyType::Text,
                Format::Html,
                Direction::Input,
                Value::text("A-1"),
                &mut owner,
                "number",
                Context::Input(&form),
            )
            .await
            .unwrap();
        assert!(matches!(out, Transformed::AlreadyApplied));
        assert_eq!(owner.get("number"), Some(&Value::text("A-1")));
    }
}
