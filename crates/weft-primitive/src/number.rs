//! Number and big-integer transformers.

use async_trait::async_trait;
use tracing::debug;
use weft_reflect::Precision;
use weft_transform::markup::Element;
use weft_transform::{Call, Collaborators, NumberFormat, TransformResult, Transformed, Transformer};
use weft_types::Value;

// ---------------------------------------------------------------------------
// Formatting and parsing
// ---------------------------------------------------------------------------

/// Format `value` with between `precision.minimum` and `precision.maximum`
/// fraction digits, grouping the integer part by thousands.
///
/// ```rust
/// use weft_primitive::format_number;
/// use weft_reflect::Precision;
/// use weft_transform::NumberFormat;
///
/// let format = NumberFormat {
///     decimal_separator: ",".into(),
///     group_separator: " ".into(),
///     ..NumberFormat::default()
/// };
/// assert_eq!(format_number(1234567.891, Precision::new(0, 2), &format), "1 234 567,89");
/// assert_eq!(format_number(3.0, Precision::new(2, 2), &format), "3,00");
/// ```
pub fn format_number(value: f64, precision: Precision, format: &NumberFormat) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let maximum = usize::from(precision.maximum);
    let minimum = usize::from(precision.minimum.min(precision.maximum));
    let fixed = format!("{:.*}", maximum, value.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let trimmed = fraction.trim_end_matches('0');
    let fraction = if trimmed.len() >= minimum {
        trimmed
    } else {
        &fraction[..minimum]
    };

    let mut out = String::with_capacity(fixed.len() + integer.len() / 3);
    if value < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9')) {
        out.push('-');
    }
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            out.push_str(&format.group_separator);
        }
        out.push(digit);
    }
    if !fraction.is_empty() {
        out.push_str(&format.decimal_separator);
        out.push_str(fraction);
    }
    out
}

fn parse_plain(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Read a submitted number.
///
/// Whitespace is ignored and the configured decimal separator is accepted
/// in place of `.`. A trailing magnitude suffix scales the mantissa: `K`
/// (10^3), `M` (10^6), `G` or `MD` (10^9), `T` (10^12), `P` (10^15), in
/// either case. Returns `None` for empty or unreadable input.
pub fn parse_number(text: &str, format: &NumberFormat) -> Option<f64> {
    let mut compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }
    if format.decimal_separator != "." {
        compact = compact.replacen(format.decimal_separator.as_str(), ".", 1);
    }
    if let Some(n) = parse_plain(&compact) {
        return Some(n);
    }

    let upper = compact.to_ascii_uppercase();
    let (mantissa, scale) = if let Some(m) = upper.strip_suffix("MD") {
        (m, 1e9)
    } else if let Some(m) = upper.strip_suffix('K') {
        (m, 1e3)
    } else if let Some(m) = upper.strip_suffix('M') {
        (m, 1e6)
    } else if let Some(m) = upper.strip_suffix('G') {
        (m, 1e9)
    } else if let Some(m) = upper.strip_suffix('T') {
        (m, 1e12)
    } else if let Some(m) = upper.strip_suffix('P') {
        (m, 1e15)
    } else {
        return None;
    };
    parse_plain(mantissa).map(|n| n * scale)
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => Some(*n),
        Value::Integer(n) => Some(*n as f64),
        Value::BigInt(n) => Some(*n as f64),
        _ => None,
    }
}

fn output_text(c: &Collaborators, call: &Call<'_>, value: &Value) -> String {
    match (value, as_number(value)) {
        (_, Some(n)) => format_number(n, c.precision(call.owner_type(), call.property), &c.config.number),
        (Value::Null, None) => String::new(),
        (other, None) => other.to_display_string(),
    }
}

// ---------------------------------------------------------------------------
// HTML
// ---------------------------------------------------------------------------

/// Label and a `data-type="number"` input pre-filled with the display
/// string.
#[derive(Debug)]
pub struct NumberEdit {
    c: Collaborators,
}

impl NumberEdit {
    pub fn new(c: Collaborators) -> Self {
        Self { c }
    }
}

#[async_trait]
impl Transformer for NumberEdit {
    fn name(&self) -> &str {
        "number.edit"
    }

    async fn transform(&self, value: Value, call: Call<'_>) -> TransformResult<Transformed> {
        let input = Element::input()
            .attr("data-type", "number")
            .attr("id", self.c.field_id(call.property))
            .attr("name", self.c.field_name(call.property))
            .attr("value", output_text(&self.c, &call, &value));
        let html = self
            .c
            .labelled(call.owner_type(), call.property, &input.to_string());
        Ok(Transformed::Applied(Value::Text(html)))
    }
}

#[derive(Debug)]
pub struct NumberInput {
    c: Collaborators,
}

impl NumberInput {
    pub fn new(c: Collaborators) -> Self {
        Self { c }
    }
}

#[async_trait]
impl Transformer for NumberInput {
    fn name(&self) -> &str {
        "number.input"
    }

    async fn transform(&self, value: Value, call: Call<'_>) -> TransformResult<Transformed> {
        let parsed = match &value {
            Value::Text(text) => match parse_number(text, &self.c.config.number) {
                Some(n) => Value::Number(n),
                None => {
                    if !text.trim().is_empty() {
                        debug!(property = call.property, text = %text, "unreadable number");
                    }
                    Value::Null
                }
            },
            other => as_number(other).map_or(Value::Null, Value::Number),
        };
        Ok(Transformed::Applied(parsed))
    }
}

/// The number with the property's precision and the configured
/// separators. Empty when unset.
#[derive(Debug)]
pub struct NumberOutput {
    c: Collaborators,
}

impl NumberOutput {
    pub fn new(c: Collaborators) -> Self {
        Self { c }
    }
}

#[async_trait]
impl Transformer for NumberOutput {
    fn name(&self) -> &str {
        "number.output"
    }

    async fn transform(&self, value: Value, call: Call<'_>) -> TransformResult<Transformed> {
        Ok(Transformed::Applied(Value::Text(output_text(&self.c, &call, &value))))
    }
}

// ---------------------------------------------------------------------------
// SQL
// ---------------------------------------------------------------------------

/// Numeric columns pass through; text columns are parsed.
#[derive(Debug, Default)]
pub struct NumberRead;

#[async_trait]
impl Transformer for NumberRead {
    fn name(&self) -> &str {
        "number.read"
    }

    async fn transform(&self, value: Value, _call: Call<'_>) -> TransformResult<Transformed> {
        let parsed = match &value {
            Value::Text(text) => parse_plain(text.trim()).map_or(Value::Null, Value::Number),
            other => as_number(other).map_or(Value::Null, Value::Number),
        };
        Ok(Transformed::Applied(parsed))
    }
}

// ---------------------------------------------------------------------------
// Big integers
// ---------------------------------------------------------------------------

/// Parses submitted text into a 128-bit integer. Unreadable input is null.
#[derive(Debug, Default)]
pub struct BigIntInput;

#[async_trait]
impl Transformer for BigIntInput {
    fn name(&self) -> &str {
        "bigint.input"
    }

    async fn transform(&self, value: Value, call: Call<'_>) -> TransformResult<Transformed> {
        let parsed = match value {
            Value::Text(text) => match text.trim().parse::<i128>() {
                Ok(n) => Value::BigInt(n),
                Err(e) => {
                    debug!(property = call.property, text = %text, error = %e, "unreadable integer");
                    Value::Null
                }
            },
            Value::Integer(n) => Value::BigInt(i128::from(n)),
            big @ Value::BigInt(_) => big,
            _ => Value::Null,
        };
        Ok(Transformed::Applied(parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{collaborators, run};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use weft_transform::Dependencies;

    fn plain() -> NumberFormat {
        NumberFormat {
            decimal_separator: ",".into(),
            group_separator: " ".into(),
            default_precision: Precision::new(0, 3),
        }
    }

    #[test]
    fn formats_with_precision_bounds() {
        let f = plain();
        assert_eq!(format_number(0.0, Precision::new(0, 3), &f), "0");
        assert_eq!(format_number(1.5, Precision::new(0, 3), &f), "1,5");
        assert_eq!(format_number(1.23456, Precision::new(0, 3), &f), "1,235");
        assert_eq!(format_number(2.0, Precision::new(2, 4), &f), "2,00");
        assert_eq!(format_number(2.5, Precision::new(2, 4), &f), "2,50");
        assert_eq!(format_number(999.999, Precision::new(0, 2), &f), "1 000");
    }

    #[test]
    fn groups_thousands_and_keeps_sign() {
        let f = plain();
        assert_eq!(format_number(1234.0, Precision::new(0, 0), &f), "1 234");
        assert_eq!(format_number(-1234567.5, Precision::new(1, 1), &f), "-1 234 567,5");
        assert_eq!(format_number(-0.0001, Precision::new(0, 2), &f), "0");
        assert_eq!(format_number(123.0, Precision::new(0, 0), &f), "123");
    }

    #[test]
    fn parses_separators_and_whitespace() {
        let f = plain();
        assert_eq!(parse_number("12,5", &f), Some(12.5));
        assert_eq!(parse_number(" 1 234,5 ", &f), Some(1234.5));
        assert_eq!(parse_number("1\u{202f}000", &f), Some(1000.0));
        assert_eq!(parse_number("7", &f), Some(7.0));
        assert_eq!(parse_number("", &f), None);
        assert_eq!(parse_number("   ", &f), None);
        assert_eq!(parse_number("abc", &f), None);
        assert_eq!(parse_number("inf", &f), None);
    }

    #[test]
    fn parses_magnitude_suffixes() {
        let f = plain();
        assert_eq!(parse_number("3K", &f), Some(3e3));
        assert_eq!(parse_number("2,5k", &f), Some(2.5e3));
        assert_eq!(parse_number("4M", &f), Some(4e6));
        assert_eq!(parse_number("1G", &f), Some(1e9));
        assert_eq!(parse_number("2MD", &f), Some(2e9));
        assert_eq!(parse_number("3T", &f), Some(3e12));
        assert_eq!(parse_number("1P", &f), Some(1e15));
        assert_eq!(parse_number("K", &f), None);
        assert_eq!(parse_number("3X", &f), None);
    }

    #[tokio::test]
    async fn output_uses_reflected_precision() {
        let c = collaborators(Dependencies::default());
        let output = NumberOutput::new(c);
        let text = run(&output, Value::Number(12.0), "total").await;
        assert_eq!(text, Value::text("12,00"));
        let text = run(&output, Value::Number(12.0), "amount").await;
        assert_eq!(text, Value::text("12"));
        assert_eq!(run(&output, Value::Null, "amount").await, Value::text(""));
    }

    #[tokio::test]
    async fn output_prefers_injected_precision() {
        let deps = Dependencies::default().with_precision_of(|_, _| Some(Precision::new(1, 1)));
        let output = NumberOutput::new(collaborators(deps));
        assert_eq!(run(&output, Value::Number(12.0), "total").await, Value::text("12,0"));
    }

    #[tokio::test]
    async fn edit_prefills_display_string() {
        let edit = NumberEdit::new(collaborators(Dependencies::default()));
        let html = run(&edit, Value::Number(3.5), "total").await;
        assert_eq!(
            html,
            Value::text(
                "<label for=\"total\">total</label>\n\t\t\t\t\
                 <input data-type=\"number\" id=\"total\" name=\"total\" value=\"3,50\">"
            )
        );
    }

    #[tokio::test]
    async fn input_and_read_yield_numbers_or_null() {
        let input = NumberInput::new(collaborators(Dependencies::default()));
        assert_eq!(run(&input, Value::text("1,5K"), "amount").await, Value::Number(1500.0));
        assert_eq!(run(&input, Value::text("n/a"), "amount").await, Value::Null);
        assert_eq!(run(&input, Value::text(""), "amount").await, Value::Null);
        assert_eq!(run(&NumberRead, Value::text("42.5"), "amount").await, Value::Number(42.5));
        assert_eq!(run(&NumberRead, Value::Integer(3), "amount").await, Value::Number(3.0));
        assert_eq!(run(&NumberRead, Value::Null, "amount").await, Value::Null);
    }

    #[tokio::test]
    async fn bigint_input_parses_wide_integers() {
        let wide = "170141183460469231731687303715884105727";
        assert_eq!(run(&BigIntInput, Value::text(wide), "reference").await, Value::BigInt(i128::MAX));
        assert_eq!(run(&BigIntInput, Value::text(" -12 "), "reference").await, Value::BigInt(-12));
        assert_eq!(run(&BigIntInput, Value::text("12.5"), "reference").await, Value::Null);
    }

    proptest! {
        #[test]
        fn formatted_numbers_read_back(cents in -10_000_000_000i64..10_000_000_000i64) {
            let f = plain();
            let value = cents as f64 / 100.0;
            let text = format_number(value, Precision::new(2, 2), &f);
            let back = parse_number(&text, &f).unwrap();
            prop_assert!((back - value).abs() < 1e-6, "{text} -> {back}");
        }
    }
}
