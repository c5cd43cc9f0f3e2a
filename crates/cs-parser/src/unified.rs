//! The cross-stage interchange envelope.

use std::collections::BTreeMap;

use cs_core::{ConfigStructure, HierarchyEntry};
use serde::Serialize;
use serde_json::Value;

/// Serializable envelope wrapping one parsed config: format metadata,
/// normalized content tree, hierarchy index and line map.
#[derive(Debug, Clone, Serialize)]
pub struct UnifiedDocument {
    pub metadata: BTreeMap<String, Value>,
    pub config: Value,
    pub hierarchy: BTreeMap<String, HierarchyEntry>,
    pub line_mapping: BTreeMap<String, Vec<usize>>,
}

/// Wrap a parse result into the unified envelope. Leaf scalars are
/// normalized to strings, mirroring the loose typing of the sources.
pub fn convert_to_unified(structure: &ConfigStructure) -> UnifiedDocument {
    let mut metadata = structure.metadata.clone();
    metadata.insert(
        "original_format".to_string(),
        Value::String(structure.format.as_str().to_string()),
    );

    UnifiedDocument {
        metadata,
        config: normalize(&structure.content),
        hierarchy: structure.hierarchy.clone(),
        line_mapping: structure.line_mapping.clone(),
    }
}

/// Convert every leaf scalar to its string form. `null` becomes the
/// empty string.
pub fn normalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), normalize(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(normalize).collect()),
        Value::Null => Value::String(String::new()),
        Value::String(s) => Value::String(s.clone()),
        Value::Bool(b) => Value::String(b.to_string()),
        Value::Number(n) => Value::String(n.to_string()),
    }
}
