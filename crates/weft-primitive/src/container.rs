//! The HTML format transformer that puts display values in a block
//! container.

use weft_transform::markup;
use weft_transform::{Context, FormatTransformer};
use weft_types::Value;

/// Wraps a rendered text value in `<div>..</div>` when the output context
/// asks for a mandatory container and the type transformer left the
/// `container` flag set.
///
/// Values that are not text (and every non-output context) pass through.
#[derive(Debug, Default)]
pub struct ContainerFormat;

impl FormatTransformer for ContainerFormat {
    fn name(&self) -> &str {
        "html.container"
    }

    fn finish(&self, value: Value, context: &Context<'_>) -> Value {
        let wanted = context
            .container()
            .is_some_and(|c| c.mandatory_container && c.container);
        match value {
            Value::Text(text) if wanted => Value::Text(markup::wrap("div", &text)),
            other => other,
        }
    }
}
