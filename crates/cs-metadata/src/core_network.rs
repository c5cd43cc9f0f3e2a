//! 5G core inventory: network functions, feature keywords, reference
//! points and domain identifiers.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::record::{CoreNetworkInfo, NetworkFunction};

const NF_NAMES: [&str; 13] = [
    "AMF", "SMF", "UPF", "NRF", "UDM", "AUSF", "NSSF", "PCF", "BSF", "CHF", "SEPP", "SCP", "NEF",
];

const FEATURE_GROUPS: [(&str, &str); 10] = [
    ("slice", r"(?i)\b(slice|sst|sd|NSSAI)"),
    ("roaming", r"(?i)\b(roaming|VPLMN|HPLMN)"),
    ("handover", r"(?i)\b(handover|mobility|HO)"),
    ("QoS", r"(?i)\b(QoS|5QI|QFI|AMBR|GBR)"),
    ("charging", r"(?i)\b(charging|CHF|billing|CDR)"),
    ("authentication", r"(?i)\b(auth|AUSF|SUPI|SUCI|AKA)"),
    ("security", r"(?i)\b(security|encryption|integrity|ciphering)"),
    ("policy", r"(?i)\b(policy|PCF|PCC|rule)"),
    ("session", r"(?i)\b(session|PDU|PDN|bearer)"),
    ("registration", r"(?i)\b(registration|attach|UE)"),
];

const INTERFACES: [&str; 14] = [
    "N1", "N2", "N3", "N4", "N6", "N7", "N8", "N9", "N10", "N11", "SBI", "Namf", "Nsmf", "Nudm",
];

fn nf_patterns() -> &'static Vec<(&'static str, Regex)> {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        NF_NAMES
            .iter()
            .map(|name| {
                let re = Regex::new(&format!(r"(?i)\b{}[_\-]?\w*", name))
                    .expect("valid literal pattern");
                (*name, re)
            })
            .collect()
    })
}

fn feature_patterns() -> &'static Vec<(&'static str, Regex)> {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        FEATURE_GROUPS
            .iter()
            .map(|(name, pattern)| (*name, Regex::new(pattern).expect("valid literal pattern")))
            .collect()
    })
}

fn interface_patterns() -> &'static Vec<(&'static str, Regex)> {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        INTERFACES
            .iter()
            .map(|name| {
                let re =
                    Regex::new(&format!(r"(?i)\b{}\b", name)).expect("valid literal pattern");
                (*name, re)
            })
            .collect()
    })
}

fn identifier_patterns() -> &'static Vec<(&'static str, Regex)> {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            (
                "PLMN",
                Regex::new(r"PLMN[:\s]+([0-9]{5,6})").expect("valid literal pattern"),
            ),
            (
                "TAC",
                Regex::new(r"TAC[:\s]+(?:0x)?([0-9A-Fa-f]+)").expect("valid literal pattern"),
            ),
            (
                "DNN",
                Regex::new(r"DNN[:\s]+([^\s,]+(?:,[^\s,]+)*)").expect("valid literal pattern"),
            ),
            (
                "SST",
                Regex::new(r"SST[:\s]+([0-9]+)").expect("valid literal pattern"),
            ),
        ]
    })
}

/// Scan for network functions (count + up to 5 distinct instances),
/// feature-keyword presence, reference-point labels and labeled domain
/// identifiers.
pub fn extract_core_network(text: &str) -> CoreNetworkInfo {
    let mut info = CoreNetworkInfo::default();

    for (name, re) in nf_patterns() {
        let mut count = 0u64;
        let mut instances: Vec<String> = Vec::new();
        for mat in re.find_iter(text) {
            count += 1;
            let token = mat.as_str();
            if instances.len() < 5 && !instances.iter().any(|i| i == token) {
                instances.push(token.to_string());
            }
        }
        if count > 0 {
            info.network_functions
                .insert((*name).to_string(), NetworkFunction { count, instances });
        }
    }

    for (name, re) in feature_patterns() {
        if re.is_match(text) {
            info.features.push((*name).to_string());
        }
    }

    for (name, re) in interface_patterns() {
        if re.is_match(text) {
            info.interfaces.push((*name).to_string());
        }
    }

    let mut identifiers: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, re) in identifier_patterns() {
        let mut values: Vec<String> = Vec::new();
        for caps in re.captures_iter(text) {
            let raw = &caps[1];
            // DNN labels may carry a comma-separated list.
            for value in raw.split(',') {
                if !value.is_empty() && !values.iter().any(|v| v == value) {
                    values.push(value.to_string());
                }
            }
        }
        if !values.is_empty() {
            identifiers.insert((*name).to_string(), values);
        }
    }
    info.identifiers = identifiers;

    info
}

/// Total network-function mentions, used by the complexity score.
pub fn total_nf_mentions(info: &CoreNetworkInfo) -> u64 {
    info.network_functions.values().map(|nf| nf.count).sum()
}
