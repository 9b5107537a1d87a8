//! Flattening of nested attribute trees into dotted-key maps.

use serde_json::Value;
use std::collections::BTreeMap;

/// Flatten a nested JSON value into a map of dotted paths to rendered scalars.
///
/// Objects contribute their keys, arrays their indices. Scalars render as
/// strings: string values verbatim, numbers and booleans via their JSON
/// representation, null as the empty string.
pub fn flatten(value: &Value) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    flatten_into(value, String::new(), &mut out);
    out
}

fn flatten_into(value: &Value, prefix: String, out: &mut BTreeMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(child, join(&prefix, key), out);
            }
        }
        Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                flatten_into(child, join(&prefix, &idx.to_string()), out);
            }
        }
        scalar => {
            out.insert(prefix, render(scalar));
        }
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
