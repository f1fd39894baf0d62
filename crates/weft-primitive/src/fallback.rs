//! Edit markup for properties whose type has no edit transformer of its
//! own. Registered as the wildcard of (HTML, EDIT).

use async_trait::async_trait;
use weft_transform::markup::Element;
use weft_transform::{Call, Collaborators, TransformResult, Transformed, Transformer};
use weft_types::Value;

/// Label and a plain input showing the value's display string.
#[derive(Debug)]
pub struct DefaultEdit {
    c: Collaborators,
}

impl DefaultEdit {
    pub fn new(c: Collaborators) -> Self {
        Self { c }
    }
}

#[async_trait]
impl Transformer for DefaultEdit {
    fn name(&self) -> &str {
        "default.edit"
    }

    async fn transform(&self, value: Value, call: Call<'_>) -> TransformResult<Transformed> {
        let shown = value
            .is_truthy()
            .then(|| value.to_display_string());
        let input = Element::input()
            .attr("id", self.c.field_id(call.property))
            .attr("name", self.c.field_name(call.property))
            .attr_opt("value", shown);
        let html = self
            .c
            .labelled(call.owner_type(), call.property, &input.to_string());
        Ok(Transformed::Applied(Value::Text(html)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{collaborators, run};
    use pretty_assertions::assert_eq;
    use weft_transform::Dependencies;

    #[tokio::test]
    async fn renders_label_and_escaped_value() {
        let deps = Dependencies::default()
            .with_display_of(|_, property| format!("{property} label"))
            .with_field_id_of(|property| format!("f-{property}"));
        let edit = DefaultEdit::new(collaborators(deps));
        assert_eq!(
            run(&edit, Value::text("say \"hi\""), "note").await,
            Value::text(
                "<label for=\"f-note\">note label</label>\n\t\t\t\t\
                 <input id=\"f-note\" name=\"note\" value=\"say &quot;hi&quot;\">"
            )
        );
    }

    #[tokio::test]
    async fn empty_value_has_no_value_attribute() {
        let edit = DefaultEdit::new(collaborators(Dependencies::default()));
        assert_eq!(
            run(&edit, Value::text(""), "note").await,
            Value::text("<label for=\"note\">note</label>\n\t\t\t\t<input id=\"note\" name=\"note\">")
        );
    }
}
