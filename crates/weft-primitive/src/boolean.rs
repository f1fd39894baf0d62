//! Boolean transformers.
//!
//! A checkbox submits nothing when unchecked, so the edit markup pairs it
//! with a hidden `0` input of the same name: the form always carries a
//! value, and the checkbox's `1` wins when checked.

use async_trait::async_trait;
use weft_transform::markup::Element;
use weft_transform::{Call, Collaborators, TransformResult, Transformed, Transformer};
use weft_types::Value;

/// Submitted texts that mean `false`, before translation.
const FALSE_WORDS: [&str; 2] = ["false", "no"];

/// Read a submitted boolean.
///
/// `""`, `"0"`, `"false"` and `"no"` are false, as are the translations of
/// `"false"` and `"no"`. Everything else is true.
pub fn parse_bool(c: &Collaborators, text: &str) -> bool {
    if text.is_empty() || text == "0" {
        return false;
    }
    !FALSE_WORDS
        .iter()
        .any(|word| text == *word || text == (c.deps.tr)(word))
}

// ---------------------------------------------------------------------------
// HTML
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct BooleanEdit {
    c: Collaborators,
}

impl BooleanEdit {
    pub fn new(c: Collaborators) -> Self {
        Self { c }
    }
}

#[async_trait]
impl Transformer for BooleanEdit {
    fn name(&self) -> &str {
        "boolean.edit"
    }

    async fn transform(&self, value: Value, call: Call<'_>) -> TransformResult<Transformed> {
        let field_id = self.c.field_id(call.property);
        let field_name = self.c.field_name(call.property);
        let hidden = Element::input()
            .attr("name", field_name.as_str())
            .attr("type", "hidden")
            .attr("value", "0");
        let checkbox = Element::input()
            .flag_if("checked", value.is_truthy())
            .attr("id", field_id)
            .attr("name", field_name)
            .attr("type", "checkbox")
            .attr("value", "1");
        let widgets = format!("{hidden}{}{checkbox}", self.c.config.field_separator);
        let html = self.c.labelled(call.owner_type(), call.property, &widgets);
        Ok(Transformed::Applied(Value::Text(html)))
    }
}

#[derive(Debug)]
pub struct BooleanInput {
    c: Collaborators,
}

impl BooleanInput {
    pub fn new(c: Collaborators) -> Self {
        Self { c }
    }
}

#[async_trait]
impl Transformer for BooleanInput {
    fn name(&self) -> &str {
        "boolean.input"
    }

    async fn transform(&self, value: Value, _call: Call<'_>) -> TransformResult<Transformed> {
        let parsed = match &value {
            Value::Text(text) => parse_bool(&self.c, text),
            other => other.is_truthy(),
        };
        Ok(Transformed::Applied(Value::Bool(parsed)))
    }
}

/// Translated `yes` or `no`.
#[derive(Debug)]
pub struct BooleanOutput {
    c: Collaborators,
}

impl BooleanOutput {
    pub fn new(c: Collaborators) -> Self {
        Self { c }
    }
}

#[async_trait]
impl Transformer for BooleanOutput {
    fn name(&self) -> &str {
        "boolean.output"
    }

    async fn transform(&self, value: Value, _call: Call<'_>) -> TransformResult<Transformed> {
        let word = if value.is_truthy() { "yes" } else { "no" };
        Ok(Transformed::Applied(Value::Text((self.c.deps.tr)(word))))
    }
}

// ---------------------------------------------------------------------------
// SQL
// ---------------------------------------------------------------------------

/// Truthiness of the raw column.
#[derive(Debug, Default)]
pub struct BooleanRead;

#[async_trait]
impl Transformer for BooleanRead {
    fn name(&self) -> &str {
        "boolean.read"
    }

    async fn transform(&self, value: Value, _call: Call<'_>) -> TransformResult<Transformed> {
        Ok(Transformed::Applied(Value::Bool(value.is_truthy())))
    }
}

/// `1` or `0`.
#[derive(Debug, Default)]
pub struct BooleanSave;

#[async_trait]
impl Transformer for BooleanSave {
    fn name(&self) -> &str {
        "boolean.save"
    }

    async fn transform(&self, value: Value, _call: Call<'_>) -> TransformResult<Transformed> {
        Ok(Transformed::Applied(Value::Integer(i64::from(value.is_truthy()))))
    }
}
