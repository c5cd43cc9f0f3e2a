//! Metadata extraction over raw config text.
//!
//! `extract` is a pure function of the text: no cross-call state, every
//! sub-extraction best-effort and individually omittable. Configured
//! patterns are compiled once at construction; a malformed pattern is
//! logged and skipped.

pub mod core_network;
pub mod network;
pub mod record;
pub mod stats;

use std::sync::OnceLock;

use cs_core::config::MetadataConfig;
use regex::Regex;
use tracing::{debug, warn};

use core_network::{extract_core_network, total_nf_mentions};
use network::extract_network_info;
pub use record::{
    CharacterStats, Complexity, ComplexityLevel, CoreNetworkInfo, FileMetadata, IpSummary,
    NetworkFunction, NetworkInfo, TextStatistics,
};
use stats::{assess_complexity, extract_statistics};

const VERSION_KEYWORDS: [&str; 4] = ["Version", "Release", "Build", "Revision"];

fn label_patterns() -> &'static [(usize, Regex); 3] {
    // Index into the (customer, site, region) field triple.
    static PATTERNS: OnceLock<[(usize, Regex); 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (0, Regex::new(r"(?i)Customer[:\s]+([^\n]+)").expect("valid literal pattern")),
            (1, Regex::new(r"(?i)Site[:\s]+([^\n]+)").expect("valid literal pattern")),
            (2, Regex::new(r"(?i)Region[:\s]+([^\n]+)").expect("valid literal pattern")),
        ]
    })
}

fn version_fallbacks() -> &'static Vec<Regex> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        VERSION_KEYWORDS
            .iter()
            .map(|keyword| {
                Regex::new(&format!(r"(?i){}[:\s]+([^\s,\n]+)", keyword))
                    .expect("valid literal pattern")
            })
            .collect()
    })
}

fn timestamp_fallbacks() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // ISO, US and EU orderings, in that precedence.
            Regex::new(r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}").expect("valid literal pattern"),
            Regex::new(r"\d{2}/\d{2}/\d{4}\s+\d{2}:\d{2}:\d{2}").expect("valid literal pattern"),
            Regex::new(r"\d{2}\.\d{2}\.\d{4}\s+\d{2}:\d{2}:\d{2}").expect("valid literal pattern"),
        ]
    })
}

/// Extracts the per-file metadata record.
pub struct MetadataExtractor {
    extract_project_info: bool,
    extract_version: bool,
    extract_timestamp: bool,
    project_patterns: Vec<Regex>,
    version_patterns: Vec<Regex>,
    timestamp_patterns: Vec<Regex>,
}

impl MetadataExtractor {
    pub fn new(config: &MetadataConfig) -> Self {
        Self {
            extract_project_info: config.extract_project_info,
            extract_version: config.extract_version,
            extract_timestamp: config.extract_timestamp,
            project_patterns: compile_all("project", &config.project_patterns),
            version_patterns: compile_all("version", &config.version_patterns),
            timestamp_patterns: compile_all("timestamp", &config.timestamp_patterns),
        }
    }

    /// Build the metadata record for `text`.
    pub fn extract(&self, text: &str) -> FileMetadata {
        let mut metadata = FileMetadata::default();

        if self.extract_project_info {
            self.find_project_info(text, &mut metadata);
        }
        if self.extract_version {
            metadata.version = self.find_version(text);
        }
        if self.extract_timestamp {
            metadata.timestamp = self.find_timestamp(text);
        }

        let core = extract_core_network(text);
        let nf_mentions = total_nf_mentions(&core);
        if !core.is_empty() {
            metadata.core_network = Some(core);
        }

        let network = extract_network_info(text);
        if !network.is_empty() {
            metadata.network = Some(network);
        }

        metadata.statistics = extract_statistics(text);
        metadata.complexity = assess_complexity(text, &metadata.statistics, nf_mentions);

        debug!(
            config_items = metadata.statistics.config_items,
            score = metadata.complexity.score,
            "metadata extracted"
        );
        metadata
    }

    fn find_project_info(&self, text: &str, metadata: &mut FileMetadata) {
        for re in &self.project_patterns {
            if let Some(caps) = re.captures(text) {
                let value = match caps.get(1) {
                    Some(m) => m.as_str(),
                    None => caps[0].trim(),
                };
                if metadata.project.is_none() {
                    metadata.project = Some(value.trim().to_string());
                }
            }
        }

        for (slot, re) in label_patterns() {
            if let Some(caps) = re.captures(text) {
                let value = caps[1].trim().to_string();
                match slot {
                    0 => metadata.customer = Some(value),
                    1 => metadata.site = Some(value),
                    _ => metadata.region = Some(value),
                }
            }
        }
    }

    fn find_version(&self, text: &str) -> Option<String> {
        for re in &self.version_patterns {
            if let Some(caps) = re.captures(text) {
                let m = caps.get(1).or_else(|| caps.get(0))?;
                return Some(m.as_str().to_string());
            }
        }
        for re in version_fallbacks() {
            if let Some(caps) = re.captures(text) {
                return Some(caps[1].to_string());
            }
        }
        None
    }

    fn find_timestamp(&self, text: &str) -> Option<String> {
        for re in self
            .timestamp_patterns
            .iter()
            .chain(timestamp_fallbacks().iter())
        {
            if let Some(mat) = re.find(text) {
                return Some(mat.as_str().to_string());
            }
        }
        None
    }
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new(&MetadataConfig::default())
    }
}

fn compile_all(kind: &str, patterns: &[String]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|pattern| match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!(kind, pattern, error = %e, "metadata pattern skipped");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests;
