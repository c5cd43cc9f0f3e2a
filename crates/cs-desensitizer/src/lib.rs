//! Sensitive-value masking with consistent, re-identification-resistant
//! substitution.
//!
//! Categories run as an ordered sequence of independent passes over the
//! same text: ip_addresses, phone_numbers, imsi, imei, passwords,
//! customers, urls. Order matters: later passes must not re-match text
//! already replaced by earlier ones. Within one call a given original
//! value always receives the same mask; the cumulative mapping and the
//! per-category statistics persist across files on one instance.

pub mod digest;

use std::collections::BTreeMap;
use std::path::Path;

use cs_core::config::{DesensitizeConfig, PatternConfig};
use cs_core::Result;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use digest::token_digest;

/// Masking category, in pass order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    IpAddresses,
    PhoneNumbers,
    Imsi,
    Imei,
    Passwords,
    Customers,
    Urls,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::IpAddresses => "ip_addresses",
            Category::PhoneNumbers => "phone_numbers",
            Category::Imsi => "imsi",
            Category::Imei => "imei",
            Category::Passwords => "passwords",
            Category::Customers => "customers",
            Category::Urls => "urls",
        }
    }
}

/// original value -> masked value, for one category.
pub type CategoryMapping = BTreeMap<String, String>;

/// category name -> per-category mapping.
pub type Mapping = BTreeMap<String, CategoryMapping>;

#[derive(Debug, Clone, Default, Serialize)]
pub struct DesensitizeStats {
    pub total_replacements: u64,
    pub by_type: BTreeMap<String, u64>,
}

struct RegexPass {
    regex: Regex,
    replacement: String,
    keep_subnet: bool,
    keep_domain: bool,
}

impl RegexPass {
    /// Compile one configured category. A malformed pattern is logged
    /// and the category is skipped, never fatal.
    fn compile(category: Category, config: Option<&PatternConfig>) -> Option<Self> {
        let config = config?;
        match Regex::new(&config.pattern) {
            Ok(regex) => {
                debug!(category = category.as_str(), "compiled pattern");
                Some(Self {
                    regex,
                    replacement: config.replacement.clone(),
                    keep_subnet: config.keep_subnet,
                    keep_domain: config.keep_domain,
                })
            }
            Err(e) => {
                warn!(
                    category = category.as_str(),
                    error = %e,
                    "pattern failed to compile, category skipped"
                );
                None
            }
        }
    }
}

/// Scans text for sensitive value classes and substitutes stable
/// masked tokens, recording a reversible mapping.
pub struct Desensitizer {
    enabled: bool,
    ip: Option<RegexPass>,
    phone: Option<RegexPass>,
    imsi: Option<RegexPass>,
    imei: Option<RegexPass>,
    passwords: Vec<Regex>,
    password_replacement: String,
    customers: Vec<String>,
    url: Option<RegexPass>,
    mapping: Mapping,
    stats: DesensitizeStats,
}

impl Desensitizer {
    pub fn new(config: &DesensitizeConfig) -> Self {
        let patterns = &config.patterns;
        let passwords = patterns
            .passwords
            .keywords
            .iter()
            .filter_map(|keyword| {
                let pattern = format!(r"(?i)({})\s*[=:]\s*([^\s,;]+)", regex::escape(keyword));
                match Regex::new(&pattern) {
                    Ok(re) => Some(re),
                    Err(e) => {
                        warn!(keyword, error = %e, "password keyword pattern skipped");
                        None
                    }
                }
            })
            .collect();

        Self {
            enabled: config.enabled,
            ip: RegexPass::compile(Category::IpAddresses, patterns.ip_addresses.as_ref()),
            phone: RegexPass::compile(Category::PhoneNumbers, patterns.phone_numbers.as_ref()),
            imsi: RegexPass::compile(Category::Imsi, patterns.imsi.as_ref()),
            imei: RegexPass::compile(Category::Imei, patterns.imei.as_ref()),
            passwords,
            password_replacement: patterns.passwords.replacement.clone(),
            customers: load_customer_keywords(patterns.customer_names.keywords_file.as_deref())
                .unwrap_or_else(|| patterns.customer_names.keywords.clone()),
            url: RegexPass::compile(Category::Urls, patterns.urls.as_ref()),
            mapping: Mapping::new(),
            stats: DesensitizeStats::default(),
        }
    }

    /// Run all category passes over `text`. Returns the masked text and
    /// the mapping local to this call; the cumulative mapping and
    /// statistics are updated as a side effect.
    pub fn desensitize_text(&mut self, text: &str) -> (String, Mapping) {
        if !self.enabled {
            return (text.to_string(), Mapping::new());
        }

        let mut result = text.to_string();
        let mut local = Mapping::new();

        let (next, map) = self.mask_ips(&result);
        result = next;
        record(&mut local, Category::IpAddresses, map);

        let (next, map) = self.mask_phones(&result);
        result = next;
        record(&mut local, Category::PhoneNumbers, map);

        let (next, map) = mask_identifiers(self.imsi.as_ref(), &result);
        result = next;
        record(&mut local, Category::Imsi, map);

        let (next, map) = mask_identifiers(self.imei.as_ref(), &result);
        result = next;
        record(&mut local, Category::Imei, map);

        let (next, map) = self.mask_passwords(&result);
        result = next;
        record(&mut local, Category::Passwords, map);

        let (next, map) = self.mask_customers(&result);
        result = next;
        record(&mut local, Category::Customers, map);

        let (next, map) = self.mask_urls(&result);
        result = next;
        record(&mut local, Category::Urls, map);

        self.update_statistics(&local);
        (result, local)
    }

    fn mask_ips(&self, text: &str) -> (String, CategoryMapping) {
        let Some(pass) = &self.ip else {
            return (text.to_string(), CategoryMapping::new());
        };
        let keep_subnet = pass.keep_subnet;
        let replacement = pass.replacement.clone();
        regex_pass(&pass.regex, text, |ip| {
            if keep_subnet {
                let parts: Vec<&str> = ip.split('.').collect();
                format!("{}.{}.xxx.xxx", parts[0], parts[1])
            } else {
                replacement.clone()
            }
        })
    }

    fn mask_phones(&self, text: &str) -> (String, CategoryMapping) {
        let Some(pass) = &self.phone else {
            return (text.to_string(), CategoryMapping::new());
        };
        regex_pass(&pass.regex, text, |phone| {
            // Keep the first 3 and last 2 digits.
            if phone.len() >= 5 {
                format!("{}****{}", &phone[..3], &phone[phone.len() - 2..])
            } else {
                "****".to_string()
            }
        })
    }

    fn mask_passwords(&self, text: &str) -> (String, CategoryMapping) {
        let mut result = text.to_string();
        let mut map = CategoryMapping::new();
        for re in &self.passwords {
            let replacement = &self.password_replacement;
            let next = re
                .replace_all(&result, |caps: &regex::Captures| {
                    let full = caps[0].to_string();
                    let masked = format!("{}={}", &caps[1], replacement);
                    if full == masked {
                        // Already masked from an earlier run.
                        return full;
                    }
                    map.insert(full, masked.clone());
                    masked
                })
                .into_owned();
            result = next;
        }
        (result, map)
    }

    fn mask_customers(&self, text: &str) -> (String, CategoryMapping) {
        let mut result = text.to_string();
        let mut map = CategoryMapping::new();
        // Numbered by position in the keyword list, not by occurrence
        // order in the text, so the same keyword gets the same token
        // across files.
        for (idx, keyword) in self.customers.iter().enumerate() {
            if result.contains(keyword.as_str()) {
                let replacement = format!("CUSTOMER_{:03}", idx + 1);
                result = result.replace(keyword.as_str(), &replacement);
                map.insert(keyword.clone(), replacement);
            }
        }
        (result, map)
    }

    fn mask_urls(&self, text: &str) -> (String, CategoryMapping) {
        let Some(pass) = &self.url else {
            return (text.to_string(), CategoryMapping::new());
        };
        let keep_domain = pass.keep_domain;
        let replacement = pass.replacement.clone();
        regex_pass(&pass.regex, text, |url| {
            if keep_domain {
                mask_url_keep_domain(url)
            } else {
                replacement.clone()
            }
        })
    }

    fn update_statistics(&mut self, local: &Mapping) {
        for (category, entries) in local {
            if entries.is_empty() {
                continue;
            }
            let count = entries.len() as u64;
            *self.stats.by_type.entry(category.clone()).or_default() += count;
            self.stats.total_replacements += count;
            let cumulative = self.mapping.entry(category.clone()).or_default();
            for (original, masked) in entries {
                cumulative
                    .entry(original.clone())
                    .or_insert_with(|| masked.clone());
            }
        }
    }

    /// Cumulative mapping across all files seen by this instance.
    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn statistics(&self) -> &DesensitizeStats {
        &self.stats
    }

    /// Drop all accumulated state. Callers needing per-file isolation
    /// can also just construct a fresh instance.
    pub fn reset(&mut self) {
        self.mapping.clear();
        self.stats = DesensitizeStats::default();
    }

    /// Persist the cumulative mapping as pretty JSON.
    pub fn save_mapping(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.mapping)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl Default for Desensitizer {
    fn default() -> Self {
        Self::new(&DesensitizeConfig::default())
    }
}

/// IMSI/IMEI style identifiers: `<REPLACEMENT>_<8-hex-digest>`.
fn mask_identifiers(pass: Option<&RegexPass>, text: &str) -> (String, CategoryMapping) {
    let Some(pass) = pass else {
        return (text.to_string(), CategoryMapping::new());
    };
    let prefix = pass.replacement.clone();
    regex_pass(&pass.regex, text, |id| {
        format!("{}_{}", prefix, token_digest(id))
    })
}

/// Shared regex substitution: every distinct match gets one stable mask
/// within this pass. A match whose mask equals itself (already-masked
/// text) is left out of the mapping.
fn regex_pass(
    regex: &Regex,
    text: &str,
    mut make_mask: impl FnMut(&str) -> String,
) -> (String, CategoryMapping) {
    let mut map = CategoryMapping::new();
    let result = regex
        .replace_all(text, |caps: &regex::Captures| {
            let original = caps[0].to_string();
            if let Some(masked) = map.get(&original) {
                return masked.clone();
            }
            let masked = make_mask(&original);
            if masked == original {
                return masked;
            }
            map.insert(original, masked.clone());
            masked
        })
        .into_owned();
    (result, map)
}

fn mask_url_keep_domain(url: &str) -> String {
    let (scheme, rest) = url.split_once("://").unwrap_or(("https", url));
    let netloc = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    let masked_domain = match netloc.rsplit_once('.') {
        Some((_, tld)) if !tld.is_empty() => format!("masked.{tld}"),
        _ => "masked.domain".to_string(),
    };
    format!("{scheme}://{masked_domain}/path")
}

fn load_customer_keywords(path: Option<&Path>) -> Option<Vec<String>> {
    let path = path?;
    match std::fs::read_to_string(path) {
        Ok(text) => {
            let keywords: Vec<String> = text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect();
            Some(keywords)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "customer keyword file unreadable, using built-in list");
            None
        }
    }
}

fn record(local: &mut Mapping, category: Category, map: CategoryMapping) {
    if !map.is_empty() {
        local.insert(category.as_str().to_string(), map);
    }
}
