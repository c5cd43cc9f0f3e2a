//! Text statistics and the additive complexity heuristic.

use crate::record::{CharacterStats, Complexity, ComplexityLevel, TextStatistics};

pub fn extract_statistics(text: &str) -> TextStatistics {
    let lines: Vec<&str> = text.split('\n').collect();
    let size_bytes = text.len();

    let mut stats = TextStatistics {
        total_lines: lines.len(),
        non_empty_lines: lines.iter().filter(|l| !l.trim().is_empty()).count(),
        comment_lines: lines
            .iter()
            .filter(|l| l.trim_start().starts_with('#'))
            .count(),
        size_bytes,
        size_mb: (size_bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0,
        ..Default::default()
    };

    for raw in &lines {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.contains('=') || line.contains(':') {
            stats.config_items += 1;
        }
        if line.starts_with('[') && line.ends_with(']') {
            stats.sections += 1;
        }
    }

    let mut chars = CharacterStats::default();
    for c in text.chars() {
        if c.is_alphabetic() {
            chars.alphabetic += 1;
        } else if c.is_numeric() {
            chars.numeric += 1;
        } else if c.is_whitespace() {
            chars.whitespace += 1;
        } else {
            chars.special += 1;
        }
    }
    stats.character_stats = chars;

    stats
}

/// Additive threshold score over size, config-item count, network
/// function density and indentation depth, bucketed low/medium/high.
/// Monotonic in every input: growing a file never lowers its score.
pub fn assess_complexity(text: &str, stats: &TextStatistics, nf_mentions: u64) -> Complexity {
    let mut score = 0u32;
    let mut factors: Vec<String> = Vec::new();

    if stats.size_mb > 10.0 {
        score += 30;
        factors.push("large_file_size".into());
    } else if stats.size_mb > 1.0 {
        score += 10;
        factors.push("medium_file_size".into());
    }

    if stats.config_items > 1000 {
        score += 30;
        factors.push("many_config_items".into());
    } else if stats.config_items > 100 {
        score += 10;
        factors.push("moderate_config_items".into());
    }

    if nf_mentions > 10 {
        score += 20;
        factors.push("multiple_network_functions".into());
    }

    let max_indent = text
        .split('\n')
        .map(|line| line.len() - line.trim_start().len())
        .max()
        .unwrap_or(0);
    if max_indent > 20 {
        score += 15;
        factors.push("deep_nesting".into());
    }

    let level = if score >= 50 {
        ComplexityLevel::High
    } else if score >= 20 {
        ComplexityLevel::Medium
    } else {
        ComplexityLevel::Low
    };

    Complexity {
        level,
        score,
        factors,
    }
}
