//! YAML parser (safe parse, no custom constructors).

use std::collections::BTreeMap;

use cs_core::{ConfigStructure, CsError, Format, Result};
use serde_json::Value;

use crate::hierarchy::extract_hierarchy;

/// Parse YAML content. A `null` document becomes an empty mapping and a
/// bare scalar document is wrapped as `{value: scalar}` so every parsed
/// config is mapping-rooted downstream.
pub fn parse_yaml(content: &str) -> Result<ConfigStructure> {
    let parsed: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| CsError::Parse {
            format: "yaml".into(),
            message: e.to_string(),
        })?;
    let mut json = yaml_to_json(parsed);

    json = match json {
        Value::Null => Value::Object(serde_json::Map::new()),
        Value::Object(_) | Value::Array(_) => json,
        scalar => {
            let mut map = serde_json::Map::new();
            map.insert("value".to_string(), scalar);
            Value::Object(map)
        }
    };

    let mut metadata = BTreeMap::new();
    metadata.insert("type".to_string(), Value::String("yaml".into()));
    match &json {
        Value::Object(map) => {
            let keys: Vec<Value> = map.keys().cloned().map(Value::String).collect();
            metadata.insert("root_keys".to_string(), Value::Array(keys));
        }
        Value::Array(items) => {
            metadata.insert("items".to_string(), Value::from(items.len()));
        }
        _ => {}
    }

    Ok(ConfigStructure {
        format: Format::Yaml,
        hierarchy: extract_hierarchy(&json),
        line_mapping: line_mapping(content),
        metadata,
        content: json,
    })
}

fn yaml_to_json(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64().map(Value::from).unwrap_or(Value::Null)
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => {
            Value::Array(items.into_iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(map) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s,
                    other => serde_yaml::to_string(&other)
                        .map(|s| s.trim().to_string())
                        .unwrap_or_default(),
                };
                out.insert(key, yaml_to_json(v));
            }
            Value::Object(out)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

/// Best-effort YAML key -> line-number index.
fn line_mapping(content: &str) -> BTreeMap<String, Vec<usize>> {
    let mut mapping: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (idx, raw_line) in content.lines().enumerate() {
        let stripped = raw_line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }

        let key = if let Some(rest) = stripped.strip_prefix("- ") {
            let candidate = rest.trim();
            if let Some((k, _)) = candidate.split_once(':') {
                k.trim().trim_matches(|c| c == '\'' || c == '"').to_string()
            } else {
                "list_item".to_string()
            }
        } else if let Some((k, _)) = stripped.split_once(':') {
            k.trim().trim_matches(|c| c == '\'' || c == '"').to_string()
        } else {
            continue;
        };

        if !key.is_empty() {
            mapping.entry(key).or_default().push(idx + 1);
        }
    }
    mapping
}
