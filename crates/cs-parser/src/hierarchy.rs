//! Flattened path index over a parsed content tree.

use cs_core::HierarchyEntry;
use serde_json::Value;
use std::collections::BTreeMap;

/// Build the hierarchy index: dotted paths for mapping keys, bracketed
/// indices for sequence elements, leaf entries carrying the original
/// value's type name.
pub fn extract_hierarchy(value: &Value) -> BTreeMap<String, HierarchyEntry> {
    let mut index = BTreeMap::new();
    walk(value, "", &mut index);
    index
}

fn walk(value: &Value, prefix: &str, index: &mut BTreeMap<String, HierarchyEntry>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                insert(child, &path, index);
            }
        }
        Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                let path = format!("{prefix}[{idx}]");
                insert(child, &path, index);
            }
        }
        _ => {}
    }
}

fn insert(value: &Value, path: &str, index: &mut BTreeMap<String, HierarchyEntry>) {
    if value.is_object() || value.is_array() {
        index.insert(path.to_string(), HierarchyEntry::container());
        walk(value, path, index);
    } else {
        index.insert(path.to_string(), HierarchyEntry::leaf(type_name(value)));
    }
}

/// Type name recorded for a leaf value.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) => {
            if n.is_f64() {
                "float"
            } else {
                "integer"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) | Value::Object(_) => "container",
    }
}
