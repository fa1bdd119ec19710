//! Bidirectional key case conversion between the caller's `lowerCamel` form
//! and the wire's `lower_snake` form.
//!
//! `to_wire` and `from_wire` recurse over [`serde_json::Value`] trees,
//! renaming object keys and leaving scalars untouched. Array elements are
//! recursed into but arrays themselves carry no keys to rename.

use serde_json::Value;

/// Converts every key in `value` from `lowerCamel` to `lower_snake`,
/// recursively over nested objects and arrays.
pub fn to_wire(value: &Value) -> Value {
    transform(value, camel_to_snake)
}

/// Converts every key in `value` from `lower_snake` back to `lowerCamel`,
/// recursively over nested objects and arrays.
pub fn from_wire(value: &Value) -> Value {
    transform(value, snake_to_camel)
}

fn transform(value: &Value, rename: fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, val) in map {
                out.insert(rename(key), transform(val, rename));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(|v| transform(v, rename)).collect()),
        scalar => scalar.clone(),
    }
}

/// `httpStatus` -> `http_status`. Every uppercase ASCII letter is treated as
/// a word boundary on its own; there is no run-of-uppercase special case.
fn camel_to_snake(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('_');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// `http_status` -> `httpStatus`. Each `_<letter>` run collapses to the
/// uppercased letter; a key already in camel form (no underscores) is
/// returned unchanged.
fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars();
    while let Some(ch) = chars.next() {
        if ch == '_' {
            if let Some(next) = chars.next() {
                out.push(next.to_ascii_uppercase());
            }
        } else {
            out.push(ch);
        }
    }
    out
}
