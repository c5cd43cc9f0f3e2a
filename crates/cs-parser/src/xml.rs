//! XML parser.
//!
//! Parses into a nested mapping following the common convention of
//! prefixing attribute keys with `@` and storing mixed text content
//! under `#text`. Repeated sibling tags collapse into an array.
//!
//! Built on `quick-xml` behind the `xml` feature; with the feature off,
//! XML input is reported as a recoverable "XML support unavailable"
//! condition instead of a hard failure.

#[cfg(feature = "xml")]
use std::collections::BTreeMap;

#[cfg(not(feature = "xml"))]
use cs_core::CsError;
use cs_core::{ConfigStructure, Result};

#[cfg(not(feature = "xml"))]
pub fn parse_xml(_content: &str) -> Result<ConfigStructure> {
    Err(CsError::UnsupportedFormat("XML support unavailable".into()))
}

#[cfg(feature = "xml")]
pub fn parse_xml(content: &str) -> Result<ConfigStructure> {
    use cs_core::{CsError, Format};
    use quick_xml::events::Event;
    use quick_xml::Reader;
    use serde_json::Value;

    use crate::hierarchy::extract_hierarchy;

    struct Frame {
        name: String,
        map: serde_json::Map<String, Value>,
        text: String,
    }

    fn parse_err(message: impl ToString) -> CsError {
        CsError::Parse {
            format: "xml".into(),
            message: message.to_string(),
        }
    }

    fn attr_map(e: &quick_xml::events::BytesStart<'_>) -> Result<serde_json::Map<String, Value>> {
        let mut map = serde_json::Map::new();
        for attr in e.attributes() {
            let attr = attr.map_err(parse_err)?;
            let key = format!("@{}", String::from_utf8_lossy(attr.key.as_ref()));
            let value = attr.unescape_value().map_err(parse_err)?.into_owned();
            map.insert(key, Value::String(value));
        }
        Ok(map)
    }

    fn finish_frame(map: serde_json::Map<String, Value>, text: String) -> Value {
        let text = text.trim().to_string();
        if map.is_empty() {
            if text.is_empty() {
                Value::Null
            } else {
                Value::String(text)
            }
        } else {
            let mut map = map;
            if !text.is_empty() {
                map.insert("#text".to_string(), Value::String(text));
            }
            Value::Object(map)
        }
    }

    /// Repeated sibling tags become an array.
    fn insert_child(parent: &mut serde_json::Map<String, Value>, name: String, value: Value) {
        match parent.get_mut(&name) {
            None => {
                parent.insert(name, value);
            }
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
        }
    }

    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut root: serde_json::Map<String, Value> = serde_json::Map::new();
    let mut stack: Vec<Frame> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let map = attr_map(&e)?;
                stack.push(Frame {
                    name,
                    map,
                    text: String::new(),
                });
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let value = finish_frame(attr_map(&e)?, String::new());
                let parent = match stack.last_mut() {
                    Some(frame) => &mut frame.map,
                    None => &mut root,
                };
                insert_child(parent, name, value);
            }
            Ok(Event::End(_)) => {
                let frame = stack.pop().ok_or_else(|| parse_err("unexpected close tag"))?;
                let value = finish_frame(frame.map, frame.text);
                let parent = match stack.last_mut() {
                    Some(top) => &mut top.map,
                    None => &mut root,
                };
                insert_child(parent, frame.name, value);
            }
            Ok(Event::Text(t)) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&t.unescape().map_err(parse_err)?);
                }
            }
            Ok(Event::CData(t)) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(t.as_ref()));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(parse_err(e)),
        }
    }

    if !stack.is_empty() {
        return Err(parse_err("unclosed element"));
    }

    let root_element = root.keys().next().cloned();
    let content_value = Value::Object(root);

    let mut metadata = BTreeMap::new();
    metadata.insert("type".to_string(), Value::String("xml".into()));
    metadata.insert(
        "root_element".to_string(),
        root_element.map(Value::String).unwrap_or(Value::Null),
    );

    Ok(ConfigStructure {
        format: Format::Xml,
        hierarchy: extract_hierarchy(&content_value),
        line_mapping: line_mapping(content),
        metadata,
        content: content_value,
    })
}

/// Best-effort opening-tag -> line-number index.
#[cfg(feature = "xml")]
fn line_mapping(content: &str) -> BTreeMap<String, Vec<usize>> {
    use regex::Regex;
    use std::sync::OnceLock;

    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"<(\w+)[^>]*>").expect("valid literal pattern"));

    let mut mapping: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (idx, line) in content.lines().enumerate() {
        if let Some(caps) = re.captures(line) {
            mapping
                .entry(caps[1].to_string())
                .or_default()
                .push(idx + 1);
        }
    }
    mapping
}

#[cfg(all(test, feature = "xml"))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_elements() {
        let s = parse_xml("<config><network><ip>10.0.0.1</ip></network></config>").unwrap();
        assert_eq!(s.content["config"]["network"]["ip"], json!("10.0.0.1"));
        assert_eq!(s.metadata["root_element"], json!("config"));
    }

    #[test]
    fn test_attributes_prefixed() {
        let s = parse_xml(r#"<service name="web"><port>8080</port></service>"#).unwrap();
        assert_eq!(s.content["service"]["@name"], json!("web"));
        assert_eq!(s.content["service"]["port"], json!("8080"));
    }

    #[test]
    fn test_text_with_attributes() {
        let s = parse_xml(r#"<node id="1">hello</node>"#).unwrap();
        assert_eq!(s.content["node"]["@id"], json!("1"));
        assert_eq!(s.content["node"]["#text"], json!("hello"));
    }

    #[test]
    fn test_repeated_tags_become_array() {
        let s = parse_xml("<list><item>a</item><item>b</item></list>").unwrap();
        assert_eq!(s.content["list"]["item"], json!(["a", "b"]));
    }

    #[test]
    fn test_empty_element() {
        let s = parse_xml("<root><empty/></root>").unwrap();
        assert_eq!(s.content["root"]["empty"], json!(null));
    }

    #[test]
    fn test_invalid_xml() {
        assert!(parse_xml("<a><b></a>").is_err());
        assert!(parse_xml("<unclosed>").is_err());
    }

    #[test]
    fn test_line_mapping() {
        let s = parse_xml("<config>\n  <ip>1.2.3.4</ip>\n</config>").unwrap();
        assert_eq!(s.line_mapping["config"], vec![1]);
        assert_eq!(s.line_mapping["ip"], vec![2]);
    }

    #[test]
    fn test_declaration_skipped() {
        let s = parse_xml("<?xml version=\"1.0\"?><root><a>1</a></root>").unwrap();
        assert_eq!(s.content["root"]["a"], json!("1"));
    }
}
