//! Format detection and parsing into the unified representation.

pub mod encoding;
pub mod hierarchy;
pub mod ini;
pub mod json;
pub mod text;
pub mod unified;
pub mod xml;
pub mod yaml;

use std::path::Path;

use cs_core::config::FileProcessingConfig;
use cs_core::{ConfigStructure, CsError, Format, Result};
use tracing::debug;

pub use unified::{convert_to_unified, UnifiedDocument};

/// Detects a file's format and parses it into a [`ConfigStructure`].
pub struct FormatParser {
    config: FileProcessingConfig,
}

impl FormatParser {
    pub fn new(config: FileProcessingConfig) -> Self {
        Self { config }
    }

    /// Detect a file's format: extension table first, then a sniff of
    /// the first ~1KB of decoded content. Never errors; an unreadable
    /// file yields [`Format::Unknown`].
    pub fn detect_format(&self, path: impl AsRef<Path>) -> Format {
        let path = path.as_ref();
        if let Some(format) = extension_format(path) {
            return format;
        }
        match std::fs::read(path) {
            Ok(bytes) => self.detect_format_bytes(path, &bytes),
            Err(_) => Format::Unknown,
        }
    }

    /// Detect format from raw bytes plus a declared filename. The name
    /// is used only for extension hinting.
    pub fn detect_format_bytes(&self, name: impl AsRef<Path>, bytes: &[u8]) -> Format {
        if let Some(format) = extension_format(name.as_ref()) {
            return format;
        }
        let head = &bytes[..bytes.len().min(1024)];
        match encoding::decode_bytes(head, &self.config) {
            Ok(text) => sniff_content(&text),
            Err(_) => Format::Unknown,
        }
    }

    /// Read a file's content using encoding detection and the
    /// legacy-encoding fallback chain.
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|_| CsError::FileNotFound(path.display().to_string()))?;
        encoding::decode_bytes(&bytes, &self.config)
    }

    /// Parse content in a known format.
    pub fn parse(&self, format: Format, content: &str) -> Result<ConfigStructure> {
        match format {
            Format::Xml => xml::parse_xml(content),
            Format::Json => json::parse_json(content),
            Format::Yaml => yaml::parse_yaml(content),
            Format::Ini => ini::parse_ini(content),
            Format::Text | Format::Conf => text::parse_text(content, format),
            Format::Unknown => Err(CsError::UnsupportedFormat("unknown".into())),
        }
    }

    /// Detect, read and parse one file, returning the unified envelope.
    pub fn process_path(&self, path: impl AsRef<Path>) -> Result<UnifiedDocument> {
        let path = path.as_ref();
        let format = self.detect_format(path);
        debug!(path = %path.display(), format = %format, "detected format");
        let content = self.read_file(path)?;
        let structure = self.parse(format, &content)?;
        Ok(convert_to_unified(&structure))
    }
}

impl Default for FormatParser {
    fn default() -> Self {
        Self::new(FileProcessingConfig::default())
    }
}

fn extension_format(path: &Path) -> Option<Format> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(|e| Format::from_extension(&e.to_ascii_lowercase()))
}

/// Content sniff used when the extension gives no answer. Heuristic,
/// not a grammar check.
fn sniff_content(head: &str) -> Format {
    let trimmed = head.trim_start();
    if trimmed.starts_with('<') {
        Format::Xml
    } else if trimmed.starts_with('{') || trimmed.starts_with('[') {
        Format::Json
    } else if head.contains(':') && head.contains('-') {
        Format::Yaml
    } else {
        Format::Text
    }
}
