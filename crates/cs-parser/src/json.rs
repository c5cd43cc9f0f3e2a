//! JSON parser.

use std::collections::BTreeMap;

use cs_core::{ConfigStructure, CsError, Format, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use crate::hierarchy::extract_hierarchy;

fn key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""([^"]+)"\s*:"#).expect("valid literal pattern"))
}

/// Parse JSON content. A top-level scalar or array is preserved as-is.
pub fn parse_json(content: &str) -> Result<ConfigStructure> {
    let parsed: Value = serde_json::from_str(content).map_err(|e| CsError::Parse {
        format: "json".into(),
        message: e.to_string(),
    })?;

    let mut metadata = BTreeMap::new();
    metadata.insert("type".to_string(), Value::String("json".into()));
    metadata.insert("is_array".to_string(), Value::Bool(parsed.is_array()));

    Ok(ConfigStructure {
        format: Format::Json,
        hierarchy: extract_hierarchy(&parsed),
        line_mapping: line_mapping(content),
        metadata,
        content: parsed,
    })
}

/// Best-effort key -> line-number index from the raw text.
fn line_mapping(content: &str) -> BTreeMap<String, Vec<usize>> {
    let mut mapping: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (idx, line) in content.lines().enumerate() {
        if let Some(caps) = key_regex().captures(line) {
            mapping
                .entry(caps[1].to_string())
                .or_default()
                .push(idx + 1);
        }
    }
    mapping
}
