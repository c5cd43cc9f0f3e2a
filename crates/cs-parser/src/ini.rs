//! INI parser.
//!
//! Section-based key/value parse with `=` and `:` delimiters. Bare
//! top-level keys before the first section header land in an implicit
//! `DEFAULT` section.

use std::collections::BTreeMap;

use cs_core::{ConfigStructure, Format, Result};
use serde_json::Value;

use crate::hierarchy::extract_hierarchy;

pub fn parse_ini(content: &str) -> Result<ConfigStructure> {
    let mut sections: serde_json::Map<String, Value> = serde_json::Map::new();
    let mut line_mapping: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    let mut current = "DEFAULT".to_string();

    for (idx, raw_line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            current = line[1..line.len() - 1].to_string();
            sections
                .entry(current.clone())
                .or_insert_with(|| Value::Object(serde_json::Map::new()));
            line_mapping
                .entry(format!("section_{current}"))
                .or_default()
                .push(line_no);
            continue;
        }

        if let Some((key, value)) = split_key_value(line) {
            let section = sections
                .entry(current.clone())
                .or_insert_with(|| Value::Object(serde_json::Map::new()));
            if let Value::Object(map) = section {
                map.insert(key.to_string(), Value::String(value.to_string()));
            }
            line_mapping
                .entry(format!("{current}.{key}"))
                .or_default()
                .push(line_no);
        }
    }

    let section_names: Vec<Value> = sections.keys().cloned().map(Value::String).collect();
    let content_value = Value::Object(sections);

    let mut metadata = BTreeMap::new();
    metadata.insert("type".to_string(), Value::String("ini".into()));
    metadata.insert("sections".to_string(), Value::Array(section_names));

    Ok(ConfigStructure {
        format: Format::Ini,
        hierarchy: extract_hierarchy(&content_value),
        line_mapping,
        metadata,
        content: content_value,
    })
}

/// Split on whichever of `=` / `:` comes first.
fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let eq = line.find('=');
    let colon = line.find(':');
    let pos = match (eq, colon) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => return None,
    };
    let (key, rest) = line.split_at(pos);
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, rest[1..].trim()))
}
