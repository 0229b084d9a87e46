//! Colorized JSON pretty-printing for terminal output.
//!
//! Renders JSON values with syntax highlighting:
//! - Field names in cyan
//! - Strings in green
//! - Numbers in yellow
//! - Booleans in magenta
//! - Null in red

use owo_colors::Style;
use serde_json::Value;

use super::paint;

const INDENT: &str = "  ";

/// Render a JSON value with 2-space indentation.
///
/// When `use_color` is false the output is byte-identical to
/// `serde_json::to_string_pretty`, so it stays safe to pipe.
pub fn render_json(value: &Value, use_color: bool) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0, use_color);
    out
}

fn quoted(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{text}\""))
}

fn write_value(out: &mut String, value: &Value, depth: usize, use_color: bool) {
    match value {
        Value::Null => out.push_str(&paint("null", Style::new().red(), use_color)),
        Value::Bool(b) => out.push_str(&paint(&b.to_string(), Style::new().magenta(), use_color)),
        Value::Number(n) => out.push_str(&paint(&n.to_string(), Style::new().yellow(), use_color)),
        Value::String(s) => out.push_str(&paint(&quoted(s), Style::new().green(), use_color)),
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(items) => {
            out.push_str("[\n");
            for (i, item) in items.iter().enumerate() {
                out.push_str(&INDENT.repeat(depth + 1));
                write_value(out, item, depth + 1, use_color);
                if i + 1 < items.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            out.push_str(&INDENT.repeat(depth));
            out.push(']');
        }
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Object(map) => {
            out.push_str("{\n");
            for (i, (key, item)) in map.iter().enumerate() {
                out.push_str(&INDENT.repeat(depth + 1));
                out.push_str(&paint(&quoted(key), Style::new().cyan(), use_color));
                out.push_str(": ");
                write_value(out, item, depth + 1, use_color);
                if i + 1 < map.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            out.push_str(&INDENT.repeat(depth));
            out.push('}');
        }
    }
}
