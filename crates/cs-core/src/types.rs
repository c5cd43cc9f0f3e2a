use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Detected input format. Closed set, never extended at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Xml,
    Json,
    Yaml,
    Ini,
    Text,
    Conf,
    Unknown,
}

impl Format {
    /// Map a file extension (without the dot, lowercased) to a format.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext {
            "xml" => Some(Format::Xml),
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            "ini" | "cfg" => Some(Format::Ini),
            "conf" | "config" => Some(Format::Conf),
            "txt" | "text" | "log" => Some(Format::Text),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Xml => "xml",
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Ini => "ini",
            Format::Text => "text",
            Format::Conf => "conf",
            Format::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a node in the hierarchy index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Container,
    Leaf,
}

/// One entry in the flattened hierarchy index: dotted/bracketed path
/// to node kind plus the leaf's original value type name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyEntry {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
}

impl HierarchyEntry {
    pub fn container() -> Self {
        Self {
            kind: NodeKind::Container,
            value_type: None,
        }
    }

    pub fn leaf(value_type: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Leaf,
            value_type: Some(value_type.into()),
        }
    }
}

/// Unified parse result for one input file.
///
/// Created once per file by the parser, immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigStructure {
    pub format: Format,
    /// Parsed content tree with original value types retained.
    pub content: serde_json::Value,
    /// Format-specific facts (root element, section names, ...).
    pub metadata: BTreeMap<String, serde_json::Value>,
    /// Flattened path index over the content tree.
    pub hierarchy: BTreeMap<String, HierarchyEntry>,
    /// Structural key to 1-based source line numbers. Best-effort.
    pub line_mapping: BTreeMap<String, Vec<usize>>,
}

/// One chunk of a text, with 1-based inclusive line range.
///
/// `overlap_start` is the first line of this chunk that repeats content
/// already emitted by the previous chunk; `overlap_end` is the last
/// line of this chunk that the next chunk repeats. Both are `None` when
/// the chunk shares nothing with its neighbor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigChunk {
    pub chunk_id: usize,
    pub start_line: usize,
    pub end_line: usize,
    pub content: String,
    /// Domain-feature keywords present in the content.
    pub features: Vec<String>,
    pub metadata: BTreeMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlap_start: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlap_end: Option<usize>,
}

/// Outcome of one `process_file` run.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingResult {
    pub success: bool,
    pub file_path: String,
    pub original_format: String,
    pub message: String,
    /// Artifact locations, in creation order.
    pub processed_files: Vec<std::path::PathBuf>,
    /// Artifact name to bytes, populated instead of on-disk output when
    /// the in-memory sink is selected.
    #[serde(skip_serializing)]
    pub in_memory: Option<BTreeMap<String, Vec<u8>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub statistics: RunStatistics,
    pub errors: Vec<String>,
    /// Wall-clock seconds for this file.
    pub processing_time: f64,
    /// The preferred output root was unwritable and a temp directory
    /// was used instead.
    pub used_temp_fallback: bool,
    /// Set when mirroring temp output back to the preferred root
    /// failed; the run itself still succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirror_error: Option<String>,
}

/// Cumulative run counters, persisted across calls on one instance.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStatistics {
    pub files_processed: u64,
    pub total_size_mb: f64,
    pub processing_time_seconds: f64,
    pub chunks_created: u64,
    pub desensitization_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_extension("xml"), Some(Format::Xml));
        assert_eq!(Format::from_extension("yml"), Some(Format::Yaml));
        assert_eq!(Format::from_extension("cfg"), Some(Format::Ini));
        assert_eq!(Format::from_extension("config"), Some(Format::Conf));
        assert_eq!(Format::from_extension("log"), Some(Format::Text));
        assert_eq!(Format::from_extension("exe"), None);
    }

    #[test]
    fn test_format_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Format::Yaml).unwrap(), "\"yaml\"");
        let f: Format = serde_json::from_str("\"unknown\"").unwrap();
        assert_eq!(f, Format::Unknown);
    }

    #[test]
    fn test_hierarchy_entry_leaf() {
        let e = HierarchyEntry::leaf("string");
        assert_eq!(e.kind, NodeKind::Leaf);
        assert_eq!(e.value_type.as_deref(), Some("string"));
    }

    #[test]
    fn test_hierarchy_entry_container_serde() {
        let e = HierarchyEntry::container();
        let json = serde_json::to_string(&e).unwrap();
        assert_eq!(json, "{\"type\":\"container\"}");
    }
}
