use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use weft_types::{FormData, Identifier, Object, PersistedOwner, Record, TypeName, Value};

use crate::error::{TransformError, TransformResult};
use crate::registry::TransformerRegistry;

// ---------------------------------------------------------------------------
// HtmlContainer
// ---------------------------------------------------------------------------

/// Output state for HTML display rendering.
///
/// A value rendered inside a mandatory container is wrapped in a `<div>`
/// by the container format transformer, unless the type transformer
/// already produced its own block markup and cleared `container`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HtmlContainer {
    pub mandatory_container: bool,
    pub container: bool,
}

impl HtmlContainer {
    pub fn new(mandatory_container: bool) -> Self {
        Self {
            mandatory_container,
            container: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Direction-specific context handed to a transformer.
#[derive(Debug)]
pub enum Context<'a> {
    None,
    /// Submitted form fields (INPUT).
    Input(&'a FormData),
    /// Display container state (OUTPUT).
    Output(&'a mut HtmlContainer),
    /// The owner's in-flight storage row (SAVE).
    Save(&'a mut Record),
}

impl<'a> Context<'a> {
    /// Borrow this context again for a nested call.
    pub fn reborrow(&mut self) -> Context<'_> {
        match self {
            Context::None => Context::None,
            Context::Input(form) => Context::Input(*form),
            Context::Output(container) => Context::Output(&mut **container),
            Context::Save(record) => Context::Save(&mut **record),
        }
    }

    pub fn form(&self) -> Option<&'a FormData> {
        match self {
            Context::Input(form) => Some(*form),
            _ => None,
        }
    }

    pub fn container(&self) -> Option<&HtmlContainer> {
        match self {
            Context::Output(container) => Some(&**container),
            _ => None,
        }
    }

    pub fn container_mut(&mut self) -> Option<&mut HtmlContainer> {
        match self {
            Context::Output(container) => Some(&mut **container),
            _ => None,
        }
    }

    pub fn record_mut(&mut self) -> Option<&mut Record> {
        match self {
            Context::Save(record) => Some(&mut **record),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Call
// ---------------------------------------------------------------------------

/// Everything a transformer receives besides the value itself.
pub struct Call<'a> {
    /// The object owning the property. Transformers that mutate it
    /// directly report [`Transformed::AlreadyApplied`].
    pub owner: &'a mut Object,
    pub property: &'a str,
    pub context: Context<'a>,
    /// The registry the call was dispatched from, for nested rendering.
    pub registry: &'a TransformerRegistry,
}

impl<'a> Call<'a> {
    pub fn owner_type(&self) -> &TypeName {
        self.owner.type_name()
    }

    /// The submitted form, or a `MissingContext` error naming `transformer`.
    pub fn require_form(&self, transformer: &str) -> TransformResult<&'a FormData> {
        self.context.form().ok_or_else(|| TransformError::MissingContext {
            transformer: transformer.to_string(),
            expected: "input",
        })
    }

    /// The in-flight record, or a `MissingContext` error naming `transformer`.
    pub fn require_record(&mut self, transformer: &str) -> TransformResult<&mut Record> {
        self.context
            .record_mut()
            .ok_or_else(|| TransformError::MissingContext {
                transformer: transformer.to_string(),
                expected: "save",
            })
    }
}

impl fmt::Debug for Call<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("owner", &self.owner.type_name())
            .field("property", &self.property)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Transformed
// ---------------------------------------------------------------------------

/// What a transformer produced.
#[derive(Debug)]
pub enum Transformed {
    /// The transformed value; the caller assigns it generically.
    Applied(Value),
    /// The transformer already mutated the owner or record in place; the
    /// caller must not assign anything for this property.
    AlreadyApplied,
    /// Work that can only run once the owner's identifier is final.
    Deferred(Box<dyn DeferredSave>),
}

impl Transformed {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// The applied value, if any.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Applied(value) => Some(value),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Transformer trait
// ---------------------------------------------------------------------------

/// A conversion of one property value for one (format, direction).
///
/// The trait is object-safe and `Send + Sync` so transformers can be
/// stored as `Arc<dyn Transformer>` in the registry.
#[async_trait]
pub trait Transformer: Send + Sync {
    /// Short name used in logs and errors (e.g. "store.save").
    fn name(&self) -> &str;

    async fn transform(&self, value: Value, call: Call<'_>) -> TransformResult<Transformed>;
}

type SyncTransformFn = dyn for<'a> Fn(Value, Call<'a>) -> TransformResult<Transformed> + Send + Sync;

/// A transformer backed by a synchronous closure.
#[derive(Clone)]
pub struct FnTransformer {
    name: String,
    f: Arc<SyncTransformFn>,
}

impl FnTransformer {
    pub fn new(
        name: impl Into<String>,
        f: impl for<'a> Fn(Value, Call<'a>) -> TransformResult<Transformed> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            f: Arc::new(f),
        }
    }
}

impl fmt::Debug for FnTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTransformer").field("name", &self.name).finish()
    }
}

#[async_trait]
impl Transformer for FnTransformer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn transform(&self, value: Value, call: Call<'_>) -> TransformResult<Transformed> {
        (self.f)(value, call)
    }
}

// ---------------------------------------------------------------------------
// Deferred saves
// ---------------------------------------------------------------------------

/// Membership changes issued by one committed relation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LinkChanges {
    pub property: String,
    pub inserted: Vec<Identifier>,
    pub deleted: Vec<Identifier>,
    pub unchanged: Vec<Identifier>,
}

impl LinkChanges {
    /// `true` if no insert or delete was issued.
    pub fn is_noop(&self) -> bool {
        self.inserted.is_empty() && self.deleted.is_empty()
    }
}

/// The second phase of a two-phase save.
///
/// Produced while the owner may still be transient; committed once the
/// owner row is written and its identifier is final, which
/// [`PersistedOwner`] guarantees.
#[async_trait]
pub trait DeferredSave: Send + Sync + fmt::Debug {
    /// The property this operation reconciles.
    fn property(&self) -> &str;

    async fn commit(self: Box<Self>, owner: &mut PersistedOwner<'_>)
        -> TransformResult<LinkChanges>;
}

// ---------------------------------------------------------------------------
// Format transformers
// ---------------------------------------------------------------------------

/// A post-processing step applied to every applied value of a format,
/// after its type transformer ran.
pub trait FormatTransformer: Send + Sync {
    fn name(&self) -> &str;

    fn finish(&self, value: Value, context: &Context<'_>) -> Value;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reborrow_shares_the_underlying_state() {
        let mut container = HtmlContainer::new(true);
        let mut context = Context::Output(&mut container);
        if let Some(c) = context.reborrow().container_mut() {
            c.container = false;
        }
        assert_eq!(context.container().map(|c| c.container), Some(false));
        drop(context);
        assert!(container.mandatory_container);
    }

    #[test]
    fn save_context_exposes_the_record() {
        let mut record = Record::new();
        let mut context = Context::Save(&mut record);
        if let Some(r) = context.reborrow().record_mut() {
            r.set("client_id", Value::Integer(3));
        }
        assert!(context.form().is_none());
        drop(context);
        assert_eq!(record.get("client_id"), Some(&Value::Integer(3)));
    }

    #[test]
    fn transformed_value_access() {
        assert_eq!(
            Transformed::Applied(Value::text("x")).into_value(),
            Some(Value::text("x"))
        );
        assert!(Transformed::AlreadyApplied.into_value().is_none());
        assert!(!Transformed::AlreadyApplied.is_applied());
    }

    #[test]
    fn link_changes_noop() {
        let mut changes = LinkChanges::default();
        assert!(changes.is_noop());
        changes.unchanged.push(Identifier::new(1).unwrap());
        assert!(changes.is_noop());
        changes.deleted.push(Identifier::new(2).unwrap());
        assert!(!changes.is_noop());
    }
}
