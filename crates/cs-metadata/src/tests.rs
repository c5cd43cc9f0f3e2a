use crate::*;
use cs_core::config::MetadataConfig;

const SAMPLE: &str = "\
# 5GC Network Configuration
# Project: Beijing-5GC-Phase2
# Customer: China Mobile
# Version: 2.1.0
# Date: 2024-01-15T10:30:00

[GLOBAL]
site_id = BJ001
region = North-China

[AMF_CONFIG]
amf_name = AMF_01
amf_ip = 192.168.100.10
plmn_id = 46000
PLMN: 46000
TAC: 0x0001

[SMF_CONFIG]
smf_name = SMF_01
n4_interface_ip = 192.168.100.20
DNN: internet,ims,mms

[SLICE_CONFIG]
SST: 1

[SECURITY]
authentication = enabled
encryption = AES256
";

fn extractor() -> MetadataExtractor {
    MetadataExtractor::default()
}

// ========== Project / version / timestamp ==========

#[test]
fn test_version_label() {
    let m = extractor().extract("Version: 2.1.0");
    assert_eq!(m.version.as_deref(), Some("2.1.0"));
}

#[test]
fn test_version_fallback_keywords() {
    let m = extractor().extract("Build: 20240115-rc1");
    assert_eq!(m.version.as_deref(), Some("20240115-rc1"));
}

#[test]
fn test_customer_site_region_labels() {
    let m = extractor().extract("Customer: Vodafone\nSite: Munich-01\nRegion: EU-Central");
    assert_eq!(m.customer.as_deref(), Some("Vodafone"));
    assert_eq!(m.site.as_deref(), Some("Munich-01"));
    assert_eq!(m.region.as_deref(), Some("EU-Central"));
}

#[test]
fn test_configured_project_pattern() {
    let config = MetadataConfig {
        project_patterns: vec![r"Project[:\s]+([^\n]+)".to_string()],
        ..Default::default()
    };
    let m = MetadataExtractor::new(&config).extract("# Project: Beijing-5GC-Phase2");
    assert_eq!(m.project.as_deref(), Some("Beijing-5GC-Phase2"));
}

#[test]
fn test_timestamp_iso() {
    let m = extractor().extract("generated 2024-01-15T10:30:00 by tool");
    assert_eq!(m.timestamp.as_deref(), Some("2024-01-15T10:30:00"));
}

#[test]
fn test_timestamp_us_and_eu() {
    let us = extractor().extract("at 01/15/2024 10:30:00");
    assert_eq!(us.timestamp.as_deref(), Some("01/15/2024 10:30:00"));
    let eu = extractor().extract("at 15.01.2024 10:30:00");
    assert_eq!(eu.timestamp.as_deref(), Some("15.01.2024 10:30:00"));
}

#[test]
fn test_disabled_sub_extractions() {
    let config = MetadataConfig {
        extract_version: false,
        extract_timestamp: false,
        ..Default::default()
    };
    let m = MetadataExtractor::new(&config).extract("Version: 9.9\n2024-01-15T10:30:00");
    assert!(m.version.is_none());
    assert!(m.timestamp.is_none());
}

#[test]
fn test_bad_configured_pattern_skipped() {
    let config = MetadataConfig {
        version_patterns: vec!["[unclosed".to_string()],
        ..Default::default()
    };
    // Falls through to the fixed keyword list.
    let m = MetadataExtractor::new(&config).extract("Version: 3.0");
    assert_eq!(m.version.as_deref(), Some("3.0"));
}

// ========== Core network inventory ==========

#[test]
fn test_network_function_counts_and_instances() {
    let m = extractor().extract(SAMPLE);
    let core = m.core_network.expect("core info");
    let amf = &core.network_functions["AMF"];
    assert!(amf.count >= 2);
    assert!(amf.instances.iter().any(|i| i == "AMF_CONFIG" || i == "amf_name"));
    assert!(amf.instances.len() <= 5);
    assert!(core.network_functions.contains_key("SMF"));
}

#[test]
fn test_instance_sample_cap() {
    let text = "amf_a amf_b amf_c amf_d amf_e amf_f amf_g";
    let core = extractor().extract(text).core_network.unwrap();
    assert_eq!(core.network_functions["AMF"].count, 7);
    assert_eq!(core.network_functions["AMF"].instances.len(), 5);
}

#[test]
fn test_features_present() {
    let m = extractor().extract(SAMPLE);
    let features = m.core_network.unwrap().features;
    assert!(features.iter().any(|f| f == "slice"));
    assert!(features.iter().any(|f| f == "authentication"));
    assert!(features.iter().any(|f| f == "security"));
}

#[test]
fn test_interfaces() {
    let m = extractor().extract("bind N2 and N4; expose SBI via Namf");
    let interfaces = m.core_network.unwrap().interfaces;
    assert_eq!(interfaces, vec!["N2", "N4", "SBI", "Namf"]);
}

#[test]
fn test_interface_word_boundaries() {
    let m = extractor().extract("N11 only");
    let interfaces = m.core_network.unwrap().interfaces;
    assert!(!interfaces.iter().any(|i| i == "N1"));
    assert!(interfaces.iter().any(|i| i == "N11"));
}

#[test]
fn test_identifiers() {
    let m = extractor().extract(SAMPLE);
    let ids = m.core_network.unwrap().identifiers;
    assert_eq!(ids["PLMN"], vec!["46000"]);
    assert_eq!(ids["TAC"], vec!["0001"]);
    assert_eq!(ids["DNN"], vec!["internet", "ims", "mms"]);
    assert_eq!(ids["SST"], vec!["1"]);
}

#[test]
fn test_no_core_section_when_nothing_matches() {
    let m = extractor().extract("plain = text\n");
    assert!(m.core_network.is_none());
}

// ========== Network facts ==========

#[test]
fn test_ip_summary() {
    let text = "a = 10.1.0.1\nb = 10.1.0.2\nc = 10.2.0.1\nagain = 10.1.0.1\n";
    let net = extractor().extract(text).network.unwrap();
    let ips = net.ip_addresses.unwrap();
    assert_eq!(ips.total, 3);
    assert_eq!(ips.samples.len(), 3);
    // 10.1 counts both distinct addresses plus the repeat.
    assert_eq!(ips.common_segments["10.1"], 3);
    assert_eq!(ips.common_segments["10.2"], 1);
}

#[test]
fn test_ports_urls_domains() {
    let text = "port: 8080\nPort: 443\nsee https://nrf.core.local/reg\nhost core.example.com\n";
    let net = extractor().extract(text).network.unwrap();
    assert!(net.ports.contains(&"8080".to_string()));
    assert!(net.ports.contains(&"443".to_string()));
    assert_eq!(net.urls.len(), 1);
    assert!(net.domains.iter().any(|d| d == "core.example.com"));
}

#[test]
fn test_sample_caps() {
    let mut text = String::new();
    for i in 0..30 {
        text.push_str(&format!("ip = 10.0.{}.1\n", i));
    }
    let ips = extractor().extract(&text).network.unwrap().ip_addresses.unwrap();
    assert_eq!(ips.total, 30);
    assert_eq!(ips.samples.len(), 10);
    assert!(ips.common_segments.len() <= 5);
}

// ========== Statistics ==========

#[test]
fn test_statistics() {
    let m = extractor().extract(SAMPLE);
    let s = &m.statistics;
    assert!(s.total_lines > 20);
    assert!(s.comment_lines >= 5);
    assert!(s.non_empty_lines < s.total_lines);
    assert_eq!(s.sections, 5);
    assert!(s.config_items >= 10);
    assert_eq!(s.size_bytes, SAMPLE.len());
    assert!(s.character_stats.alphabetic > 0);
    assert!(s.character_stats.numeric > 0);
}

#[test]
fn test_config_item_heuristic() {
    let s = extractor().extract("# c: not counted\na = 1\nb: 2\nplain\n").statistics;
    assert_eq!(s.config_items, 2);
    assert_eq!(s.comment_lines, 1);
}

// ========== Complexity ==========

#[test]
fn test_small_file_is_low() {
    let m = extractor().extract("a = 1\n");
    assert_eq!(m.complexity.level, ComplexityLevel::Low);
    assert_eq!(m.complexity.score, 0);
}

#[test]
fn test_many_items_raise_score() {
    let mut text = String::new();
    for i in 0..150 {
        text.push_str(&format!("key_{} = {}\n", i, i));
    }
    let m = extractor().extract(&text);
    assert!(m.complexity.score >= 10);
    assert!(m
        .complexity
        .factors
        .iter()
        .any(|f| f == "moderate_config_items"));
}

#[test]
fn test_score_monotonic_in_config_items() {
    let base: String = (0..90).map(|i| format!("k{} = {}\n", i, i)).collect();
    let bigger: String = (0..1200).map(|i| format!("k{} = {}\n", i, i)).collect();
    let small = extractor().extract(&base).complexity.score;
    let large = extractor().extract(&bigger).complexity.score;
    assert!(large >= small);
}

#[test]
fn test_nf_density_factor() {
    let text = "AMF SMF UPF AMF SMF UPF AMF SMF UPF AMF SMF UPF\n";
    let m = extractor().extract(text);
    assert!(m
        .complexity
        .factors
        .iter()
        .any(|f| f == "multiple_network_functions"));
}

#[test]
fn test_deep_nesting_factor() {
    let text = format!("root:\n{}leaf: 1\n", " ".repeat(24));
    let m = extractor().extract(&text);
    assert!(m.complexity.factors.iter().any(|f| f == "deep_nesting"));
}

// ========== Record serialization ==========

#[test]
fn test_empty_sections_omitted() {
    let m = extractor().extract("plain text with nothing notable\n");
    let json = serde_json::to_value(&m).unwrap();
    assert!(json.get("5gc_info").is_none());
    assert!(json.get("version").is_none());
    assert!(json.get("statistics").is_some());
    assert_eq!(json["complexity"]["level"], "low");
}

#[test]
fn test_record_round_trips_to_json() {
    let m = extractor().extract(SAMPLE);
    let text = serde_json::to_string_pretty(&m).unwrap();
    assert!(text.contains("\"5gc_info\""));
    assert!(text.contains("\"network_functions\""));
}
