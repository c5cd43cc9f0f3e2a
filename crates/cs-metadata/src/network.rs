//! Network facts: addresses, ports, URLs and domain names, each capped
//! to a bounded sample size to keep the record small.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::record::{IpSummary, NetworkInfo};

fn ip_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:[0-9]{1,3}\.){3}[0-9]{1,3}\b").expect("valid literal pattern")
    })
}

fn port_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)port[:\s]+([0-9]{1,5})").expect("valid literal pattern"))
}

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://[^\s]+").expect("valid literal pattern"))
}

fn domain_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b([a-z0-9]+(?:[-.][a-z0-9]+)*\.[a-z]{2,})\b")
            .expect("valid literal pattern")
    })
}

pub fn extract_network_info(text: &str) -> NetworkInfo {
    let mut info = NetworkInfo::default();

    let mut distinct_ips: Vec<String> = Vec::new();
    let mut segments: BTreeMap<String, u64> = BTreeMap::new();
    for mat in ip_regex().find_iter(text) {
        let ip = mat.as_str();
        if !distinct_ips.iter().any(|seen| seen == ip) {
            distinct_ips.push(ip.to_string());
        }
        // First two octets approximate a /16.
        let segment: String = ip.split('.').take(2).collect::<Vec<_>>().join(".");
        *segments.entry(segment).or_default() += 1;
    }
    if !distinct_ips.is_empty() {
        let mut ranked: Vec<(String, u64)> = segments.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        info.ip_addresses = Some(IpSummary {
            total: distinct_ips.len(),
            samples: distinct_ips.iter().take(10).cloned().collect(),
            common_segments: ranked.into_iter().take(5).collect(),
        });
    }

    info.ports = distinct_captures(port_regex(), text, usize::MAX);
    info.urls = distinct_matches(url_regex(), text, 10);
    info.domains = distinct_captures(domain_regex(), text, 10);

    info
}

fn distinct_matches(re: &Regex, text: &str, cap: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for mat in re.find_iter(text) {
        let value = mat.as_str();
        if out.len() >= cap {
            break;
        }
        if !out.iter().any(|seen| seen == value) {
            out.push(value.to_string());
        }
    }
    out
}

fn distinct_captures(re: &Regex, text: &str, cap: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for caps in re.captures_iter(text) {
        let value = &caps[1];
        if out.len() >= cap {
            break;
        }
        if !out.iter().any(|seen| seen == value) {
            out.push(value.to_string());
        }
    }
    out
}
