//! Splits large config texts into bounded chunks while keeping
//! structurally atomic blocks intact.
//!
//! Three strategies: `smart` (section-aware, preserve-block atomic,
//! with line overlap between neighboring chunks), `fixed_lines`
//! (sliding window with overlap) and `fixed_size` (byte budget, cut
//! before overflow). With chunking disabled the whole text becomes a
//! single chunk. `merge_chunks` reverses the split; reconstruction is
//! exact for the fixed strategies.

pub mod persist;

use std::collections::BTreeMap;

use cs_core::config::{ChunkStrategy, ChunkingConfig};
pub use cs_core::ConfigChunk;
use regex::{Regex, RegexBuilder};
use serde_json::json;
use tracing::{debug, info, warn};

/// Domain keywords scanned for per-chunk feature tagging.
pub const FEATURE_KEYWORDS: [&str; 28] = [
    "PLMN", "TAC", "AMF", "SMF", "UPF", "NRF", "UDM", "AUSF", "NSSF", "PCF", "BSF", "CHF",
    "SEPP", "SCP", "slice", "DNN", "APN", "QoS", "bearer", "session", "roaming", "handover",
    "authentication", "security", "charging", "billing", "policy", "routing",
];

/// Case-insensitive substring scan over the fixed keyword vocabulary.
pub fn extract_features(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    FEATURE_KEYWORDS
        .iter()
        .filter(|keyword| lower.contains(&keyword.to_lowercase()))
        .map(|keyword| keyword.to_string())
        .collect()
}

pub struct Chunker {
    enabled: bool,
    strategy: ChunkStrategy,
    chunk_size_lines: usize,
    chunk_size_kb: usize,
    overlap_lines: usize,
    section_markers: Vec<String>,
    preserve_patterns: Vec<Regex>,
}

impl Chunker {
    pub fn new(config: &ChunkingConfig) -> Self {
        let preserve_patterns = config
            .smart_chunking
            .preserve_blocks
            .iter()
            .filter_map(|block| {
                match RegexBuilder::new(&block.pattern)
                    .dot_matches_new_line(true)
                    .multi_line(true)
                    .build()
                {
                    Ok(re) => Some(re),
                    Err(e) => {
                        warn!(pattern = block.pattern, error = %e, "preserve pattern skipped");
                        None
                    }
                }
            })
            .collect();

        Self {
            enabled: config.enabled,
            strategy: config.strategy,
            chunk_size_lines: config.chunk_size_lines.max(1),
            chunk_size_kb: config.chunk_size_kb.max(1),
            overlap_lines: config.overlap_lines,
            section_markers: config.smart_chunking.section_markers.clone(),
            preserve_patterns,
        }
    }

    pub fn chunk_text(&self, text: &str) -> Vec<ConfigChunk> {
        if !self.enabled {
            let mut metadata = BTreeMap::new();
            metadata.insert("strategy".to_string(), json!("disabled"));
            return vec![ConfigChunk {
                chunk_id: 0,
                start_line: 1,
                end_line: text.split('\n').count(),
                content: text.to_string(),
                features: Vec::new(),
                metadata,
                overlap_start: None,
                overlap_end: None,
            }];
        }

        let chunks = match self.strategy {
            ChunkStrategy::Smart => self.smart_chunking(text),
            ChunkStrategy::FixedLines => self.fixed_lines_chunking(text),
            ChunkStrategy::FixedSize => self.fixed_size_chunking(text),
        };
        info!(
            strategy = self.strategy_name(),
            chunks = chunks.len(),
            "chunking complete"
        );
        chunks
    }

    /// Section-aware splitting. Preserve blocks are buffered wholesale
    /// and never cut; a section marker forces a cut once the buffer is
    /// past half its budget; each cut seeds the next chunk with the
    /// last `overlap_lines` lines and their features.
    fn smart_chunking(&self, text: &str) -> Vec<ConfigChunk> {
        let lines: Vec<&str> = text.split('\n').collect();
        let blocks = self.identify_preserve_blocks(text);
        debug!(blocks = blocks.len(), "preserve blocks identified");

        let limit = self.chunk_size_lines;
        let mut chunks: Vec<ConfigChunk> = Vec::new();
        let mut buf: Vec<&str> = Vec::new();
        let mut pending_overlap: Option<usize> = None;
        let mut next_block = 0usize;
        let mut i = 0usize;

        while i < lines.len() {
            let line_no = i + 1;

            if next_block < blocks.len() && blocks[next_block].0 == line_no {
                let (block_start, block_end) = blocks[next_block];
                next_block += 1;
                let block_len = block_end - block_start + 1;
                // The block would overflow the running chunk: cut first.
                if !buf.is_empty() && buf.len() + block_len > limit {
                    chunks.push(self.build_chunk(
                        chunks.len(),
                        line_no - buf.len(),
                        line_no - 1,
                        &buf,
                        pending_overlap.take(),
                        None,
                    ));
                    buf.clear();
                }
                for block_line in block_start..=block_end.min(lines.len()) {
                    buf.push(lines[block_line - 1]);
                }
                i = block_end;
                continue;
            }

            let line = lines[i];
            buf.push(line);

            let mut split = buf.len() >= limit;
            if !split && buf.len() > limit / 2 {
                split = self
                    .section_markers
                    .iter()
                    .any(|marker| line.contains(marker.as_str()));
            }

            if split {
                let keep = self.overlap_lines.min(buf.len());
                let overlap_end = (keep > 0 && i + 1 < lines.len()).then_some(line_no);
                chunks.push(self.build_chunk(
                    chunks.len(),
                    line_no + 1 - buf.len(),
                    line_no,
                    &buf,
                    pending_overlap.take(),
                    overlap_end,
                ));
                buf.drain(..buf.len() - keep);
                pending_overlap = (keep > 0).then(|| line_no + 1 - keep);
            }

            i += 1;
        }

        if !buf.is_empty() {
            chunks.push(self.build_chunk(
                chunks.len(),
                lines.len() + 1 - buf.len(),
                lines.len(),
                &buf,
                pending_overlap.take(),
                None,
            ));
        }

        chunks
    }

    /// Sliding window of `chunk_size_lines` advancing by window minus
    /// overlap; stops once a window reaches the end of the text.
    fn fixed_lines_chunking(&self, text: &str) -> Vec<ConfigChunk> {
        let lines: Vec<&str> = text.split('\n').collect();
        let window = self.chunk_size_lines;
        let overlap = self.overlap_lines.min(window.saturating_sub(1));
        let step = window - overlap;

        let mut chunks = Vec::new();
        let mut start = 0usize;
        loop {
            let end = (start + window).min(lines.len());
            let content = lines[start..end].join("\n");
            let features = extract_features(&content);
            let mut metadata = BTreeMap::new();
            metadata.insert("strategy".to_string(), json!("fixed_lines"));
            chunks.push(ConfigChunk {
                chunk_id: chunks.len(),
                start_line: start + 1,
                end_line: end,
                content,
                features,
                metadata,
                overlap_start: (start > 0 && overlap > 0).then(|| start + 1),
                overlap_end: (end < lines.len() && overlap > 0).then_some(end),
            });
            if end >= lines.len() {
                break;
            }
            start += step;
        }
        chunks
    }

    /// Byte-budget strategy: a line that would push the running chunk
    /// past `chunk_size_kb` starts the next chunk instead. No overlap.
    fn fixed_size_chunking(&self, text: &str) -> Vec<ConfigChunk> {
        let target = self.chunk_size_kb * 1024;
        let lines: Vec<&str> = text.split('\n').collect();

        let mut chunks: Vec<ConfigChunk> = Vec::new();
        let mut buf: Vec<&str> = Vec::new();
        let mut size = 0usize;
        let mut chunk_start = 1usize;

        for (idx, line) in lines.iter().enumerate() {
            let line_no = idx + 1;
            if size + line.len() > target && !buf.is_empty() {
                chunks.push(self.sized_chunk(chunks.len(), chunk_start, line_no - 1, &buf, size));
                buf.clear();
                size = 0;
                chunk_start = line_no;
            }
            buf.push(line);
            size += line.len();
        }
        if !buf.is_empty() {
            chunks.push(self.sized_chunk(chunks.len(), chunk_start, lines.len(), &buf, size));
        }
        chunks
    }

    /// Reassemble chunk contents into one text, dropping lines a chunk
    /// repeats from its predecessor.
    pub fn merge_chunks(&self, chunks: &[ConfigChunk]) -> String {
        let mut ordered: Vec<&ConfigChunk> = chunks.iter().collect();
        ordered.sort_by_key(|c| c.chunk_id);

        let mut merged: Vec<&str> = Vec::new();
        let mut last_end = 0usize;
        for chunk in ordered {
            let mut lines: Vec<&str> = chunk.content.split('\n').collect();
            if let Some(overlap_start) = chunk.overlap_start {
                if overlap_start <= last_end {
                    let skip = (last_end + 1 - chunk.start_line).min(lines.len());
                    lines.drain(..skip);
                }
            }
            merged.extend(lines);
            last_end = chunk.end_line;
        }
        merged.join("\n")
    }

    /// Line ranges matched by the preserve patterns, overlapping and
    /// adjacent ranges merged.
    fn identify_preserve_blocks(&self, text: &str) -> Vec<(usize, usize)> {
        let mut blocks: Vec<(usize, usize)> = Vec::new();
        for re in &self.preserve_patterns {
            for mat in re.find_iter(text) {
                let start_line = line_of(text, mat.start());
                let end_line = line_of(text, mat.end());
                blocks.push((start_line, end_line));
            }
        }
        if blocks.is_empty() {
            return blocks;
        }

        blocks.sort_unstable();
        let mut merged: Vec<(usize, usize)> = Vec::new();
        for (start, end) in blocks {
            match merged.last().copied() {
                Some((_, last_end)) if start <= last_end + 1 => {
                    if let Some(last) = merged.last_mut() {
                        last.1 = last_end.max(end);
                    }
                }
                _ => merged.push((start, end)),
            }
        }
        merged
    }

    fn build_chunk(
        &self,
        chunk_id: usize,
        start_line: usize,
        end_line: usize,
        lines: &[&str],
        overlap_start: Option<usize>,
        overlap_end: Option<usize>,
    ) -> ConfigChunk {
        let content = lines.join("\n");
        let features = extract_features(&content);
        let mut metadata = BTreeMap::new();
        metadata.insert("strategy".to_string(), json!(self.strategy_name()));
        metadata.insert("line_count".to_string(), json!(lines.len()));
        metadata.insert("feature_count".to_string(), json!(features.len()));
        ConfigChunk {
            chunk_id,
            start_line,
            end_line,
            content,
            features,
            metadata,
            overlap_start,
            overlap_end,
        }
    }

    fn sized_chunk(
        &self,
        chunk_id: usize,
        start_line: usize,
        end_line: usize,
        lines: &[&str],
        size_bytes: usize,
    ) -> ConfigChunk {
        let content = lines.join("\n");
        let features = extract_features(&content);
        let mut metadata = BTreeMap::new();
        metadata.insert("strategy".to_string(), json!("fixed_size"));
        metadata.insert("size_bytes".to_string(), json!(size_bytes));
        ConfigChunk {
            chunk_id,
            start_line,
            end_line,
            content,
            features,
            metadata,
            overlap_start: None,
            overlap_end: None,
        }
    }

    fn strategy_name(&self) -> &'static str {
        match self.strategy {
            ChunkStrategy::Smart => "smart",
            ChunkStrategy::FixedLines => "fixed_lines",
            ChunkStrategy::FixedSize => "fixed_size",
        }
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(&ChunkingConfig::default())
    }
}

/// 1-based line number containing byte offset `pos`.
fn line_of(text: &str, pos: usize) -> usize {
    text.as_bytes()[..pos].iter().filter(|&&b| b == b'\n').count() + 1
}

#[cfg(test)]
mod tests;
