//! Rendering of loosely typed JSON scalars.
//!
//! Snapshot values are frequently "stringly" typed: a case value can arrive as `"25"` or `25`, a
//! tick value as a number or a string. These helpers give every scalar a single text form.

use serde_json::{Number, Value};

/// Render a number the way a reader expects: integral floats drop their fraction.
pub fn format_number(number: &Number) -> String {
    if let Some(int) = number.as_i64() {
        return int.to_string();
    }
    if let Some(uint) = number.as_u64() {
        return uint.to_string();
    }
    match number.as_f64() {
        Some(float) if float.is_finite() && float.fract() == 0.0 && float.abs() < 1e15 => {
            format!("{}", float as i64)
        }
        Some(float) => float.to_string(),
        None => number.to_string(),
    }
}

/// Text of a scalar value. Returns `None` for `null`, arrays and objects.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(format_number(number)),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Text of any value: scalars as text, `null` as `"null"`, containers as compact JSON.
pub fn display_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
        scalar => scalar_text(scalar).unwrap_or_default(),
    }
}

/// Look up `key` on an object and render it as a scalar string, empty if absent.
pub fn field_text(value: &Value, key: &str) -> String {
    value.get(key).and_then(scalar_text).unwrap_or_default()
}
