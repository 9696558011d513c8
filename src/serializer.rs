//! Rendering of [JsonValue] trees back into text, either compact or indented.
//!
//! Serialisation is total: every [JsonValue] has a rendering. The only values with no JSON
//! equivalent are non-finite numbers, which can't be produced by the parser and are written out
//! as `null`.
use std::fmt::Write;

use crate::JsonValue;

/// The indentation unit used by [crate::pretty_print]
pub const DEFAULT_INDENT: &str = "  ";

/// Magnitude at (and above) which numbers switch to exponent notation
const EXPONENT_UPPER_BOUND: f64 = 1e21;

/// Magnitude below which (non-zero) numbers switch to exponent notation
const EXPONENT_LOWER_BOUND: f64 = 1e-7;

/// A serializer, configured either for compact or indented output
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Serializer {
    /// The string repeated once per nesting level. `None` produces compact output
    indent: Option<String>,
}

impl Serializer {
    /// A serializer which produces output with no insignificant whitespace
    pub fn compact() -> Self {
        Serializer { indent: None }
    }

    /// A serializer which puts every member and element onto its own line, indented by
    /// `indent_unit` per level of nesting
    pub fn pretty(indent_unit: &str) -> Self {
        Serializer {
            indent: Some(indent_unit.to_string()),
        }
    }

    /// Render a value
    pub fn serialize(&self, value: &JsonValue) -> String {
        let mut out = String::new();
        self.write_value(value, 0, &mut out);
        out
    }

    fn write_value(&self, value: &JsonValue, depth: usize, out: &mut String) {
        match value {
            JsonValue::Object(map) if map.is_empty() => out.push_str("{}"),
            JsonValue::Object(map) => {
                out.push('{');
                for (index, (key, child)) in map.iter().enumerate() {
                    if index > 0 {
                        out.push(',');
                    }
                    self.write_newline(depth + 1, out);
                    write_string(key, out);
                    out.push(':');
                    if self.indent.is_some() {
                        out.push(' ');
                    }
                    self.write_value(child, depth + 1, out);
                }
                self.write_newline(depth, out);
                out.push('}');
            }
            JsonValue::Array(values) if values.is_empty() => out.push_str("[]"),
            JsonValue::Array(values) => {
                out.push('[');
                for (index, child) in values.iter().enumerate() {
                    if index > 0 {
                        out.push(',');
                    }
                    self.write_newline(depth + 1, out);
                    self.write_value(child, depth + 1, out);
                }
                self.write_newline(depth, out);
                out.push(']');
            }
            JsonValue::String(s) => write_string(s, out),
            JsonValue::Number(n) => out.push_str(&format_number(*n)),
            JsonValue::Boolean(true) => out.push_str("true"),
            JsonValue::Boolean(false) => out.push_str("false"),
            JsonValue::Null => out.push_str("null"),
        }
    }

    /// Start a new line at a given depth. A no-op for compact output
    fn write_newline(&self, depth: usize, out: &mut String) {
        if let Some(indent) = &self.indent {
            out.push('\n');
            for _ in 0..depth {
                out.push_str(indent);
            }
        }
    }
}

/// Write a string out as a quoted JSON string literal, escaping as required by RFC 8259
pub fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Format a number using the shortest decimal representation which parses back to the same
/// value. Very large and very small magnitudes use exponent notation
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return "null".to_string();
    }
    let magnitude = n.abs();
    if magnitude == 0.0 || (EXPONENT_LOWER_BOUND..EXPONENT_UPPER_BOUND).contains(&magnitude) {
        format!("{}", n)
    } else {
        format!("{:e}", n)
    }
}
