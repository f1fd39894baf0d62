//! Small HTML builders shared by the HTML transformers.
//!
//! Only what form widgets and display cells need: escaping, labels, and
//! void elements with ordered attributes.

use std::fmt;

/// Escape text for use inside a double-quoted attribute.
pub fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

/// Escape text for use as element content.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

/// `<label for="{field_id}">{text}</label>`
pub fn label(field_id: &str, text: &str) -> String {
    format!(
        "<label for=\"{}\">{}</label>",
        escape_attr(field_id),
        escape_text(text)
    )
}

/// Wrap content in an element: `<{tag}>{content}</{tag}>`. The content is
/// inserted as is.
pub fn wrap(tag: &str, content: &str) -> String {
    format!("<{tag}>{content}</{tag}>")
}

/// A void element (`<input ...>`) whose attributes render in insertion
/// order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    name: &'static str,
    attrs: Vec<(&'static str, Option<String>)>,
}

impl Element {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            attrs: Vec::new(),
        }
    }

    pub fn input() -> Self {
        Self::new("input")
    }

    /// Add `key="value"`.
    pub fn attr(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((key, Some(value.into())));
        self
    }

    /// Add `key="value"` only when a value is given.
    pub fn attr_opt(self, key: &'static str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.attr(key, value),
            None => self,
        }
    }

    /// Add a bare boolean attribute such as `checked`.
    pub fn flag(mut self, key: &'static str) -> Self {
        self.attrs.push((key, None));
        self
    }

    pub fn flag_if(self, key: &'static str, set: bool) -> Self {
        if set {
            self.flag(key)
        } else {
            self
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for (key, value) in &self.attrs {
            match value {
                Some(value) => write!(f, " {key}=\"{}\"", escape_attr(value))?,
                None => write!(f, " {key}")?,
            }
        }
        f.write_str(">")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn attributes_render_in_order() {
        let input = Element::input()
            .flag_if("checked", true)
            .attr("id", "active")
            .attr("name", "active")
            .attr("type", "checkbox")
            .attr("value", "1");
        assert_eq!(
            input.to_string(),
            r#"<input checked id="active" name="active" type="checkbox" value="1">"#
        );
    }

    #[test]
    fn optional_attributes() {
        let none: Option<String> = None;
        let input = Element::input().attr("id", "x").attr_opt("value", none);
        assert_eq!(input.to_string(), r#"<input id="x">"#);
        let input = Element::input().flag_if("checked", false).attr_opt("value", Some("v"));
        assert_eq!(input.to_string(), r#"<input value="v">"#);
    }

    #[test]
    fn values_are_escaped() {
        let input = Element::input().attr("value", r#"Smith & "Sons" <Ltd>"#);
        assert_eq!(
            input.to_string(),
            r#"<input value="Smith &amp; &quot;Sons&quot; &lt;Ltd&gt;">"#
        );
        assert_eq!(label("q", "a < b"), r#"<label for="q">a &lt; b</label>"#);
    }

    #[test]
    fn wrap_inserts_content_verbatim() {
        assert_eq!(wrap("li", "<b>x</b>"), "<li><b>x</b></li>");
    }
}
