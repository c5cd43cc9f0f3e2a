//! Line-oriented heuristic parser for text/conf files with no formal
//! grammar. Three key/value patterns are tried in order; first match
//! wins.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use cs_core::{ConfigStructure, Format, Result};
use regex::Regex;
use serde_json::Value;

use crate::hierarchy::extract_hierarchy;

fn section_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[([^\]]+)\]").expect("valid literal pattern"))
}

fn kv_regexes() -> &'static [Regex; 3] {
    static RES: OnceLock<[Regex; 3]> = OnceLock::new();
    RES.get_or_init(|| {
        [
            Regex::new(r"^([^=]+)=(.+)$").expect("valid literal pattern"),
            Regex::new(r"^([^:]+):(.+)$").expect("valid literal pattern"),
            Regex::new(r"^(\S+)\s+(.+)$").expect("valid literal pattern"),
        ]
    })
}

pub fn parse_text(content: &str, format: Format) -> Result<ConfigStructure> {
    let mut sections: serde_json::Map<String, Value> = serde_json::Map::new();
    let mut line_mapping: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    let mut current = "default".to_string();

    for (idx, raw_line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(caps) = section_regex().captures(line) {
            current = caps[1].to_string();
            sections
                .entry(current.clone())
                .or_insert_with(|| Value::Object(serde_json::Map::new()));
            line_mapping
                .entry(format!("section_{current}"))
                .or_default()
                .push(line_no);
            continue;
        }

        for re in kv_regexes() {
            if let Some(caps) = re.captures(line) {
                let key = caps[1].trim().to_string();
                let value = caps[2].trim().to_string();
                let section = sections
                    .entry(current.clone())
                    .or_insert_with(|| Value::Object(serde_json::Map::new()));
                if let Value::Object(map) = section {
                    map.insert(key.clone(), Value::String(value));
                }
                line_mapping
                    .entry(format!("{current}.{key}"))
                    .or_default()
                    .push(line_no);
                break;
            }
        }
    }

    let section_names: Vec<Value> = sections.keys().cloned().map(Value::String).collect();
    let content_value = Value::Object(sections);

    let mut metadata = BTreeMap::new();
    metadata.insert("type".to_string(), Value::String("text".into()));
    metadata.insert("sections".to_string(), Value::Array(section_names));

    Ok(ConfigStructure {
        format,
        hierarchy: extract_hierarchy(&content_value),
        line_mapping,
        metadata,
        content: content_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_equals_pattern() {
        let s = parse_text("server_ip = 192.168.1.100\n", Format::Text).unwrap();
        assert_eq!(s.content["default"]["server_ip"], json!("192.168.1.100"));
    }

    #[test]
    fn test_colon_pattern() {
        let s = parse_text("port: 8080\n", Format::Conf).unwrap();
        assert_eq!(s.format, Format::Conf);
        assert_eq!(s.content["default"]["port"], json!("8080"));
    }

    #[test]
    fn test_space_pattern() {
        let s = parse_text("mode fast_path\n", Format::Text).unwrap();
        assert_eq!(s.content["default"]["mode"], json!("fast_path"));
    }

    #[test]
    fn test_first_pattern_wins() {
        // Contains both '=' and ':'; the '=' pattern is tried first.
        let s = parse_text("endpoint = http://host:8080\n", Format::Text).unwrap();
        assert_eq!(
            s.content["default"]["endpoint"],
            json!("http://host:8080")
        );
    }

    #[test]
    fn test_sections() {
        let s = parse_text("[amf]\nname = AMF_01\n[smf]\nname = SMF_01\n", Format::Text).unwrap();
        assert_eq!(s.content["amf"]["name"], json!("AMF_01"));
        assert_eq!(s.content["smf"]["name"], json!("SMF_01"));
        assert_eq!(s.line_mapping["smf.name"], vec![4]);
    }

    #[test]
    fn test_comments_and_blanks_skipped() {
        let s = parse_text("# comment\n\n; other\nk = v\n", Format::Text).unwrap();
        assert_eq!(s.content["default"].as_object().unwrap().len(), 1);
        assert_eq!(s.line_mapping["default.k"], vec![4]);
    }

    #[test]
    fn test_unmatched_lines_ignored() {
        let s = parse_text("justaword\n", Format::Text).unwrap();
        assert_eq!(s.content, json!({}));
    }
}
