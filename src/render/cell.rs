//! Turning cell values into text.

use crate::error::CellError;
use crate::table::Value;

/// Converts cells into the text written as leaf content.
///
/// Scalar cells go through [`render_plain`](CellRenderer::render_plain),
/// object cells through [`render_rich`](CellRenderer::render_rich). A failing
/// rich render aborts the whole render.
pub trait CellRenderer {
    /// Text of a scalar cell without any type decoration.
    fn render_plain(&self, value: &Value<'_>) -> String {
        plain_text(value)
    }

    /// Text of an object cell. May span several lines.
    fn render_rich(&self, value: &serde_json::Value) -> Result<String, CellError>;
}

/// Prints object cells as pretty JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRenderer;

impl CellRenderer for DefaultRenderer {
    fn render_rich(&self, value: &serde_json::Value) -> Result<String, CellError> {
        Ok(serde_json::to_string_pretty(value)?)
    }
}

/// Plain text of a cell: `NA` for missing values, `TRUE`/`FALSE` for
/// logicals, labels for factors.
pub fn plain_text(value: &Value<'_>) -> String {
    match value {
        Value::Missing => "NA".to_string(),
        Value::Logical(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Value::Integer(n) => n.to_string(),
        Value::Double(x) if x.is_nan() => "NaN".to_string(),
        Value::Double(x) if x.is_infinite() => {
            if x.is_sign_positive() { "Inf" } else { "-Inf" }.to_string()
        }
        Value::Double(x) => format_double(*x),
        Value::Text(s) => s.to_string(),
        Value::Factor { label, .. } => label.to_string(),
        Value::Object(json) => match json {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    }
}

/// Positional notation for ordinary magnitudes, exponent notation outside
/// `[1e-4, 1e15)`. Signed zero prints as `0`.
fn format_double(x: f64) -> String {
    let magnitude = x.abs();
    if magnitude == 0.0 {
        "0".to_string()
    } else if !(1e-4..1e15).contains(&magnitude) {
        format!("{:e}", x)
    } else {
        x.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_text_extreme_doubles() {
        assert_eq!(plain_text(&Value::Double(1e21)), "1e21");
        assert_eq!(plain_text(&Value::Double(-2.5e-7)), "-2.5e-7");
        assert_eq!(plain_text(&Value::Double(123456.5)), "123456.5");
        assert_eq!(plain_text(&Value::Double(0.001)), "0.001");
    }

    #[test]
    fn test_plain_text_scalars() {
        assert_eq!(plain_text(&Value::Missing), "NA");
        assert_eq!(plain_text(&Value::Logical(true)), "TRUE");
        assert_eq!(plain_text(&Value::Integer(-3)), "-3");
        assert_eq!(plain_text(&Value::Double(10.0)), "10");
        assert_eq!(plain_text(&Value::Double(0.25)), "0.25");
        assert_eq!(plain_text(&Value::Double(f64::NEG_INFINITY)), "-Inf");
        assert_eq!(plain_text(&Value::Double(-0.0)), "0");
        assert_eq!(plain_text(&Value::Text("a b")), "a b");
    }

    #[test]
    fn test_plain_text_factor_uses_label() {
        let value = Value::Factor {
            code: 2,
            label: "c",
        };
        assert_eq!(plain_text(&value), "c");
    }

    #[test]
    fn test_default_renderer_pretty_prints() {
        let value = json!({"a": [1, 2]});
        let text = DefaultRenderer.render_rich(&value).unwrap();
        assert_eq!(text, "{\n  \"a\": [\n    1,\n    2\n  ]\n}");
    }
}
