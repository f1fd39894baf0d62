//! Date transformers. Formatting and parsing go through the injected
//! `format_date` and `parse_date` hooks.

use async_trait::async_trait;
use tracing::debug;
use weft_transform::markup::Element;
use weft_transform::{Call, Collaborators, TransformResult, Transformed, Transformer};
use weft_types::Value;

fn display(c: &Collaborators, value: &Value) -> String {
    match value {
        Value::Date(date) => (c.deps.format_date)(date),
        Value::Null => String::new(),
        other => other.to_display_string(),
    }
}

#[derive(Debug)]
pub struct DateEdit {
    c: Collaborators,
}

impl DateEdit {
    pub fn new(c: Collaborators) -> Self {
        Self { c }
    }
}

#[async_trait]
impl Transformer for DateEdit {
    fn name(&self) -> &str {
        "date.edit"
    }

    async fn transform(&self, value: Value, call: Call<'_>) -> TransformResult<Transformed> {
        let shown = display(&self.c, &value);
        let input = Element::input()
            .attr("data-type", "date")
            .attr("id", self.c.field_id(call.property))
            .attr("name", self.c.field_name(call.property))
            .attr_opt("value", (!shown.is_empty()).then_some(shown));
        let html = self
            .c
            .labelled(call.owner_type(), call.property, &input.to_string());
        Ok(Transformed::Applied(Value::Text(html)))
    }
}

#[derive(Debug)]
pub struct DateInput {
    c: Collaborators,
}

impl DateInput {
    pub fn new(c: Collaborators) -> Self {
        Self { c }
    }
}

#[async_trait]
impl Transformer for DateInput {
    fn name(&self) -> &str {
        "date.input"
    }

    async fn transform(&self, value: Value, call: Call<'_>) -> TransformResult<Transformed> {
        let parsed = match value {
            Value::Text(text) => match (self.c.deps.parse_date)(text.trim()) {
                Some(date) => Value::Date(date),
                None => {
                    if !text.trim().is_empty() {
                        debug!(property = call.property, text = %text, "unreadable date");
                    }
                    Value::Null
                }
            },
            date @ Value::Date(_) => date,
            _ => Value::Null,
        };
        Ok(Transformed::Applied(parsed))
    }
}

#[derive(Debug)]
pub struct DateOutput {
    c: Collaborators,
}

impl DateOutput {
    pub fn new(c: Collaborators) -> Self {
        Self { c }
    }
}

#[async_trait]
impl Transformer for DateOutput {
    fn name(&self) -> &str {
        "date.output"
    }

    async fn transform(&self, value: Value, _call: Call<'_>) -> TransformResult<Transformed> {
        Ok(Transformed::Applied(Value::Text(display(&self.c, &value))))
    }
}
