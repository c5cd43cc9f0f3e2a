//! Serializable metadata record types.
//!
//! Every sub-extraction is best-effort; a section that found nothing is
//! omitted from the serialized record rather than emitted empty.

use std::collections::BTreeMap;

use serde::Serialize;

/// The metadata record for one file's text.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(rename = "5gc_info", skip_serializing_if = "Option::is_none")]
    pub core_network: Option<CoreNetworkInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkInfo>,
    pub statistics: TextStatistics,
    pub complexity: Complexity,
}

/// Network-function inventory plus feature, interface and identifier
/// findings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CoreNetworkInfo {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub network_functions: BTreeMap<String, NetworkFunction>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub identifiers: BTreeMap<String, Vec<String>>,
}

impl CoreNetworkInfo {
    pub fn is_empty(&self) -> bool {
        self.network_functions.is_empty()
            && self.features.is_empty()
            && self.interfaces.is_empty()
            && self.identifiers.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NetworkFunction {
    pub count: u64,
    /// Up to 5 distinct matched tokens, in order of first occurrence.
    pub instances: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NetworkInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_addresses: Option<IpSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<String>,
}

impl NetworkInfo {
    pub fn is_empty(&self) -> bool {
        self.ip_addresses.is_none()
            && self.ports.is_empty()
            && self.urls.is_empty()
            && self.domains.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IpSummary {
    /// Distinct addresses seen.
    pub total: usize,
    /// Up to 10 distinct addresses, in order of first occurrence.
    pub samples: Vec<String>,
    /// The 5 most frequent first-two-octet prefixes, with occurrence
    /// counts over all (non-distinct) matches.
    pub common_segments: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TextStatistics {
    pub total_lines: usize,
    pub non_empty_lines: usize,
    pub comment_lines: usize,
    pub size_bytes: usize,
    pub size_mb: f64,
    /// Non-comment lines containing `=` or `:`.
    pub config_items: usize,
    /// Lines of the form `[name]`.
    pub sections: usize,
    pub character_stats: CharacterStats,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CharacterStats {
    pub alphabetic: usize,
    pub numeric: usize,
    pub whitespace: usize,
    pub special: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    #[default]
    Low,
    Medium,
    High,
}

/// Coarse additive heuristic, not a certified complexity metric.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Complexity {
    pub level: ComplexityLevel,
    pub score: u32,
    pub factors: Vec<String>,
}
