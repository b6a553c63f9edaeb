//! # JSON Text Projection
//!
//! Rendering of values as JSON text. This is a writer only — parsing JSON
//! text is out of scope for the core; `from_json` consumes the owned
//! [`Value`] tree instead.
//!
//! Object keys render in hash order, the enumeration order of the format.
//! Non-finite floats have no JSON representation and render as `null`.

use crate::value::Value;

impl Value {
    pub fn to_json_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format_json_float(*f),
            Value::Str(s) => escape_json_string(s),
            Value::Bytes(b) => format_json_bytes(b),
            Value::Array(elements) => {
                let mut result = String::from("[");
                let mut first = true;
                for element in elements {
                    if !first {
                        result.push(',');
                    }
                    first = false;
                    result.push_str(&element.to_json_string());
                }
                result.push(']');
                result
            }
            Value::Object(entries) => {
                let mut result = String::from("{");
                let mut first = true;
                for (key, value) in entries {
                    if !first {
                        result.push(',');
                    }
                    first = false;
                    result.push_str(&escape_json_string(key));
                    result.push(':');
                    result.push_str(&value.to_json_string());
                }
                result.push('}');
                result
            }
        }
    }
}

pub(crate) fn escape_json_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    result.push('"');
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result.push('"');
    result
}

pub(crate) fn format_json_float(f: f64) -> String {
    if f.is_nan() || f.is_infinite() {
        "null".to_string()
    } else if f.fract() == 0.0 && f.abs() < (i64::MAX as f64) {
        format!("{}", f as i64)
    } else {
        format!("{}", f)
    }
}

/// Byte sequences have no JSON type; render as an array of numbers.
pub(crate) fn format_json_bytes(bytes: &[u8]) -> String {
    let mut result = String::from("[");
    let mut first = true;
    for b in bytes {
        if !first {
            result.push(',');
        }
        first = false;
        result.push_str(&b.to_string());
    }
    result.push(']');
    result
}
