//! Pipeline configuration.
//!
//! Plain serde value types, loaded once at construction and passed by
//! reference into each stage. Regex patterns stay as strings here;
//! every stage compiles its own patterns at construction so a bad
//! pattern fails (and is skipped) at startup, not mid-run.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CsError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    pub file_processing: FileProcessingConfig,
    pub desensitization: DesensitizeConfig,
    pub chunking: ChunkingConfig,
    pub metadata: MetadataConfig,
    pub output: OutputConfig,
}

impl PreprocessConfig {
    /// Load from a YAML or JSON document, chosen by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            Ok(serde_json::from_str(&text)?)
        } else {
            serde_yaml::from_str(&text)
                .map_err(|e| CsError::InvalidConfig(e.to_string()))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProcessingConfig {
    pub supported_formats: Vec<String>,
    pub encoding_detection: bool,
    pub default_encoding: String,
}

impl Default for FileProcessingConfig {
    fn default() -> Self {
        Self {
            supported_formats: ["xml", "json", "yaml", "ini", "conf", "txt"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            encoding_detection: true,
            default_encoding: "utf-8".into(),
        }
    }
}

/// One regex-driven desensitization category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    pub pattern: String,
    pub replacement: String,
    /// IP addresses: keep the first two octets, mask the rest.
    pub keep_subnet: bool,
    /// URLs: keep scheme and top-level domain, mask the rest.
    pub keep_domain: bool,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            pattern: String::new(),
            replacement: "MASKED".into(),
            keep_subnet: false,
            keep_domain: false,
        }
    }
}

impl PatternConfig {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    pub keywords: Vec<String>,
    pub replacement: String,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            keywords: ["password", "passwd", "pwd", "secret", "key", "token"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            replacement: "***MASKED***".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerConfig {
    /// Optional newline-separated keyword file; overrides `keywords`.
    pub keywords_file: Option<PathBuf>,
    /// Built-in fallback: well-known operator names.
    pub keywords: Vec<String>,
}

impl Default for CustomerConfig {
    fn default() -> Self {
        Self {
            keywords_file: None,
            keywords: [
                "China Mobile",
                "China Unicom",
                "China Telecom",
                "Vodafone",
                "Orange",
                "T-Mobile",
                "AT&T",
                "Verizon",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DesensitizePatterns {
    pub ip_addresses: Option<PatternConfig>,
    pub phone_numbers: Option<PatternConfig>,
    pub imsi: Option<PatternConfig>,
    pub imei: Option<PatternConfig>,
    pub passwords: PasswordConfig,
    pub customer_names: CustomerConfig,
    pub urls: Option<PatternConfig>,
}

impl Default for DesensitizePatterns {
    fn default() -> Self {
        Self {
            ip_addresses: Some(PatternConfig::new(
                r"\b(?:[0-9]{1,3}\.){3}[0-9]{1,3}\b",
                "xxx.xxx.xxx.xxx",
            )),
            phone_numbers: Some(PatternConfig::new(r"\b1[3-9][0-9]{9}\b", "MASKED_PHONE")),
            imsi: Some(PatternConfig::new(r"\b460[0-9]{12}\b", "IMSI")),
            imei: Some(PatternConfig::new(r"\b86[0-9]{13}\b", "IMEI")),
            passwords: PasswordConfig::default(),
            customer_names: CustomerConfig::default(),
            urls: Some(PatternConfig::new(r"https?://[^\s,;]+", "https://masked.url")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DesensitizeConfig {
    pub enabled: bool,
    pub patterns: DesensitizePatterns,
}

impl Default for DesensitizeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            patterns: DesensitizePatterns::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkStrategy {
    Smart,
    FixedLines,
    FixedSize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreserveBlock {
    pub pattern: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartChunkingConfig {
    /// Substrings whose presence in a line marks a new logical section.
    pub section_markers: Vec<String>,
    /// Multi-line regex spans that must never be split across chunks.
    pub preserve_blocks: Vec<PreserveBlock>,
}

impl Default for PreserveBlock {
    fn default() -> Self {
        Self {
            pattern: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub enabled: bool,
    pub strategy: ChunkStrategy,
    pub chunk_size_lines: usize,
    pub chunk_size_kb: usize,
    pub overlap_lines: usize,
    pub smart_chunking: SmartChunkingConfig,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strategy: ChunkStrategy::Smart,
            chunk_size_lines: 5000,
            chunk_size_kb: 1024,
            overlap_lines: 100,
            smart_chunking: SmartChunkingConfig {
                section_markers: vec!["SECTION".into()],
                preserve_blocks: vec![PreserveBlock {
                    pattern: r"BEGIN[\s\S]*?END".into(),
                }],
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    pub extract_project_info: bool,
    pub extract_version: bool,
    pub extract_timestamp: bool,
    pub project_patterns: Vec<String>,
    pub version_patterns: Vec<String>,
    pub timestamp_patterns: Vec<String>,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            extract_project_info: true,
            extract_version: true,
            extract_timestamp: true,
            project_patterns: Vec::new(),
            version_patterns: Vec::new(),
            timestamp_patterns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub base_dir: PathBuf,
    pub create_timestamp_folder: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("./output"),
            create_timestamp_folder: true,
        }
    }
}
