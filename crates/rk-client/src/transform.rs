//! Helpers for reshaping decoded response bodies inside
//! [`Endpoint::handle_response`](crate::Endpoint::handle_response).

use serde_json::{Map, Value};

/// Coerce string flags to booleans.
///
/// Each listed field (every field when `fields` is empty) becomes `true` when
/// its value is `"true"` or `true`, else `false`. Listed fields missing from
/// the map are added as `false`.
pub fn fix_booleans(map: &mut Map<String, Value>, fields: &[&str]) {
    for (key, value) in map.iter_mut() {
        if fields.is_empty() || fields.contains(&key.as_str()) {
            let flag = matches!(value, Value::Bool(true))
                || matches!(value, Value::String(s) if s == "true");
            *value = Value::Bool(flag);
        }
    }
    for field in fields {
        if !map.contains_key(*field) {
            map.insert((*field).to_string(), Value::Bool(false));
        }
    }
}

/// Recursively camel-case every object key.
pub fn fix_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (camel_case(&key), fix_keys(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(fix_keys).collect()),
        other => other,
    }
}

/// `foo_bar`, `foo-bar`, `foo bar` and `FooBar` all become `fooBar`.
pub fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for word in key.split(['_', '-', ' ']).filter(|w| !w.is_empty()) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if out.is_empty() {
                out.extend(first.to_lowercase());
            } else {
                out.extend(first.to_uppercase());
            }
            out.push_str(chars.as_str());
        }
    }
    out
}
