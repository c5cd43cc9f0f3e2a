use crate::*;
use cs_core::config::{ChunkingConfig, PreserveBlock};

fn numbered_lines(n: usize) -> String {
    (1..=n)
        .map(|i| format!("key_{} = value_{}", i, i))
        .collect::<Vec<_>>()
        .join("\n")
}

fn config(strategy: ChunkStrategy, window: usize, overlap: usize) -> ChunkingConfig {
    ChunkingConfig {
        strategy,
        chunk_size_lines: window,
        overlap_lines: overlap,
        ..Default::default()
    }
}

// ========== Disabled ==========

#[test]
fn test_disabled_single_chunk_verbatim() {
    let cfg = ChunkingConfig {
        enabled: false,
        ..Default::default()
    };
    let text = "line one\nline two\nline three";
    let chunks = Chunker::new(&cfg).chunk_text(text);
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].chunk_id, 0);
    assert_eq!(chunks[0].start_line, 1);
    assert_eq!(chunks[0].end_line, 3);
    assert_eq!(chunks[0].content, text);
    assert_eq!(chunks[0].metadata["strategy"], serde_json::json!("disabled"));
}

// ========== Fixed lines ==========

#[test]
fn test_fixed_lines_chunk_count_formula() {
    // L=250, W=100, O=20: ceil((250-20)/(100-20)) = 3 chunks.
    let text = numbered_lines(250);
    let chunker = Chunker::new(&config(ChunkStrategy::FixedLines, 100, 20));
    let chunks = chunker.chunk_text(&text);
    assert_eq!(chunks.len(), 3);
    // Every non-final chunk spans exactly the window.
    for chunk in &chunks[..chunks.len() - 1] {
        assert_eq!(chunk.end_line - chunk.start_line + 1, 100);
    }
    assert_eq!(chunks[1].start_line, 81);
    assert_eq!(chunks[1].overlap_start, Some(81));
    assert_eq!(chunks[0].overlap_end, Some(100));
    assert_eq!(chunks[2].end_line, 250);
    assert_eq!(chunks[2].overlap_end, None);
}

#[test]
fn test_fixed_lines_short_text_single_chunk() {
    let text = numbered_lines(50);
    let chunks = Chunker::new(&config(ChunkStrategy::FixedLines, 100, 20)).chunk_text(&text);
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].overlap_start, None);
    assert_eq!(chunks[0].content, text);
}

#[test]
fn test_fixed_lines_zero_overlap_disjoint() {
    let text = numbered_lines(30);
    let chunks = Chunker::new(&config(ChunkStrategy::FixedLines, 10, 0)).chunk_text(&text);
    assert_eq!(chunks.len(), 3);
    for chunk in &chunks {
        assert_eq!(chunk.overlap_start, None);
    }
    assert_eq!(chunks[1].start_line, 11);
}

#[test]
fn test_fixed_lines_merge_round_trip() {
    let text = numbered_lines(237);
    let chunker = Chunker::new(&config(ChunkStrategy::FixedLines, 50, 7));
    let chunks = chunker.chunk_text(&text);
    assert!(chunks.len() > 1);
    assert_eq!(chunker.merge_chunks(&chunks), text);
}

#[test]
fn test_fixed_lines_merge_unordered_input() {
    let text = numbered_lines(120);
    let chunker = Chunker::new(&config(ChunkStrategy::FixedLines, 50, 10));
    let mut chunks = chunker.chunk_text(&text);
    chunks.reverse();
    assert_eq!(chunker.merge_chunks(&chunks), text);
}

// ========== Fixed size ==========

#[test]
fn test_fixed_size_respects_budget() {
    let cfg = ChunkingConfig {
        strategy: ChunkStrategy::FixedSize,
        chunk_size_kb: 1,
        ..Default::default()
    };
    let line = "x".repeat(100);
    let text = vec![line.as_str(); 40].join("\n");
    let chunks = Chunker::new(&cfg).chunk_text(&text);
    assert!(chunks.len() > 1);
    for chunk in &chunks {
        // Budget counts line bytes, cut happens before overflow.
        let line_bytes: usize = chunk.content.split('\n').map(str::len).sum();
        assert!(line_bytes <= 1024);
        assert_eq!(chunk.metadata["size_bytes"], serde_json::json!(line_bytes));
    }
}

#[test]
fn test_fixed_size_oversized_line_kept_whole() {
    let cfg = ChunkingConfig {
        strategy: ChunkStrategy::FixedSize,
        chunk_size_kb: 1,
        ..Default::default()
    };
    let text = format!("short\n{}\nshort", "y".repeat(3000));
    let chunks = Chunker::new(&cfg).chunk_text(&text);
    assert!(chunks.iter().any(|c| c.content.contains(&"y".repeat(3000))));
}

#[test]
fn test_fixed_size_merge_round_trip() {
    let cfg = ChunkingConfig {
        strategy: ChunkStrategy::FixedSize,
        chunk_size_kb: 1,
        ..Default::default()
    };
    let text = numbered_lines(500);
    let chunker = Chunker::new(&cfg);
    let chunks = chunker.chunk_text(&text);
    assert!(chunks.len() > 1);
    assert_eq!(chunker.merge_chunks(&chunks), text);
}

// ========== Smart ==========

fn smart_config(window: usize, overlap: usize) -> ChunkingConfig {
    let mut cfg = config(ChunkStrategy::Smart, window, overlap);
    cfg.smart_chunking.section_markers = vec!["SECTION".to_string()];
    cfg.smart_chunking.preserve_blocks = vec![PreserveBlock {
        pattern: r"BEGIN[\s\S]*?END".to_string(),
    }];
    cfg
}

#[test]
fn test_smart_splits_at_size_limit() {
    let text = numbered_lines(25);
    let chunks = Chunker::new(&smart_config(10, 0)).chunk_text(&text);
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].end_line, 10);
    assert_eq!(chunks[1].start_line, 11);
    assert_eq!(chunks[2].end_line, 25);
}

#[test]
fn test_smart_preserve_block_never_split() {
    let mut lines: Vec<String> = (1..=4).map(|i| format!("lead_{} = {}", i, i)).collect();
    lines.push("BEGIN".to_string());
    for i in 1..=6 {
        lines.push(format!("block_{} = {}", i, i));
    }
    lines.push("END".to_string());
    for i in 1..=4 {
        lines.push(format!("tail_{} = {}", i, i));
    }
    let text = lines.join("\n");

    let chunks = Chunker::new(&smart_config(5, 0)).chunk_text(&text);
    for chunk in &chunks {
        let has_begin = chunk.content.contains("BEGIN");
        let has_end = chunk.content.contains("END");
        assert_eq!(has_begin, has_end, "block split across chunks");
    }
    assert!(chunks.iter().any(|c| c.content.contains("BEGIN")));
}

#[test]
fn test_smart_block_larger_than_window_kept_whole() {
    let mut lines = vec!["BEGIN".to_string()];
    for i in 1..=20 {
        lines.push(format!("block_{} = {}", i, i));
    }
    lines.push("END".to_string());
    let text = lines.join("\n");

    let chunks = Chunker::new(&smart_config(5, 0)).chunk_text(&text);
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].content, text);
}

#[test]
fn test_smart_section_marker_cuts_after_half_budget() {
    let mut lines: Vec<String> = (1..=7).map(|i| format!("item_{} = {}", i, i)).collect();
    lines.push("#### SECTION two ####".to_string());
    for i in 8..=10 {
        lines.push(format!("item_{} = {}", i, i));
    }
    let text = lines.join("\n");

    // Window 10: marker at line 8 is past half budget, forces a cut.
    let chunks = Chunker::new(&smart_config(10, 0)).chunk_text(&text);
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].end_line, 8);
    assert_eq!(chunks[1].start_line, 9);
}

#[test]
fn test_smart_marker_before_half_budget_ignored() {
    let mut lines = vec!["#### SECTION one ####".to_string()];
    for i in 1..=5 {
        lines.push(format!("item_{} = {}", i, i));
    }
    let text = lines.join("\n");
    let chunks = Chunker::new(&smart_config(10, 0)).chunk_text(&text);
    assert_eq!(chunks.len(), 1);
}

#[test]
fn test_smart_overlap_seeding() {
    let text = numbered_lines(25);
    let chunks = Chunker::new(&smart_config(10, 3)).chunk_text(&text);
    assert!(chunks.len() >= 2);
    let first = &chunks[0];
    let second = &chunks[1];
    assert_eq!(second.overlap_start, Some(second.start_line));
    assert_eq!(second.start_line, first.end_line - 2);
    // Seeded prefix repeats the previous chunk's tail.
    let tail: Vec<&str> = first.content.split('\n').rev().take(3).collect();
    let head: Vec<&str> = second.content.split('\n').take(3).collect();
    assert_eq!(head[0], tail[2]);
    assert_eq!(first.overlap_end, Some(first.end_line));
}

#[test]
fn test_smart_merge_round_trip_size_splits() {
    let text = numbered_lines(60);
    let chunker = Chunker::new(&smart_config(10, 3));
    let chunks = chunker.chunk_text(&text);
    assert!(chunks.len() > 1);
    assert_eq!(chunker.merge_chunks(&chunks), text);
}

#[test]
fn test_smart_bad_preserve_pattern_skipped() {
    let mut cfg = smart_config(10, 0);
    cfg.smart_chunking.preserve_blocks = vec![PreserveBlock {
        pattern: "[unclosed".to_string(),
    }];
    let text = numbered_lines(15);
    // Still chunks by size, pattern just dropped.
    let chunks = Chunker::new(&cfg).chunk_text(&text);
    assert_eq!(chunks.len(), 2);
}

// ========== Features ==========

#[test]
fn test_extract_features_vocabulary() {
    let features = extract_features("amf_ip = 1.2.3.4\nQoS profile with bearer setup");
    assert!(features.iter().any(|f| f == "AMF"));
    assert!(features.iter().any(|f| f == "QoS"));
    assert!(features.iter().any(|f| f == "bearer"));
    assert!(!features.iter().any(|f| f == "roaming"));
}

#[test]
fn test_chunk_features_and_metadata() {
    let text = "AMF config\nslice settings\nplain line";
    let cfg = ChunkingConfig {
        enabled: true,
        strategy: ChunkStrategy::Smart,
        ..Default::default()
    };
    let chunks = Chunker::new(&cfg).chunk_text(text);
    assert_eq!(chunks.len(), 1);
    assert!(chunks[0].features.iter().any(|f| f == "AMF"));
    assert!(chunks[0].features.iter().any(|f| f == "slice"));
    assert_eq!(chunks[0].metadata["strategy"], serde_json::json!("smart"));
    assert_eq!(chunks[0].metadata["line_count"], serde_json::json!(3));
}

// ========== Persistence ==========

#[test]
fn test_save_chunks_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let text = numbered_lines(30);
    let chunker = Chunker::new(&config(ChunkStrategy::FixedLines, 10, 0));
    let chunks = chunker.chunk_text(&text);

    let written = persist::save_chunks(&chunks, dir.path()).unwrap();
    // One text + one meta per chunk, plus the index.
    assert_eq!(written.len(), chunks.len() * 2 + 1);

    let first = std::fs::read_to_string(dir.path().join("chunk_0000.txt")).unwrap();
    assert_eq!(first, chunks[0].content);

    let meta: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("chunk_0001_meta.json")).unwrap())
            .unwrap();
    assert_eq!(meta["chunk_id"], serde_json::json!(1));
    assert_eq!(meta["start_line"], serde_json::json!(11));

    let index: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("chunks_index.json")).unwrap())
            .unwrap();
    assert_eq!(index["total_chunks"], serde_json::json!(3));
    assert_eq!(index["chunks"][0]["lines"], serde_json::json!("1-10"));
}
