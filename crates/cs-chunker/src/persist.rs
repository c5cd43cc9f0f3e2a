//! Chunk artifact persistence: one text file and one metadata document
//! per chunk, plus an index over the whole set.

use std::fs;
use std::path::{Path, PathBuf};

use cs_core::{ConfigChunk, Result};
use serde_json::json;
use tracing::info;

/// Write `chunk_NNNN.txt` + `chunk_NNNN_meta.json` per chunk and a
/// `chunks_index.json`, returning every path written.
pub fn save_chunks(chunks: &[ConfigChunk], output_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;

    let mut written = Vec::new();
    for chunk in chunks {
        let chunk_file = output_dir.join(format!("chunk_{:04}.txt", chunk.chunk_id));
        fs::write(&chunk_file, &chunk.content)?;
        written.push(chunk_file);

        let meta = json!({
            "chunk_id": chunk.chunk_id,
            "start_line": chunk.start_line,
            "end_line": chunk.end_line,
            "features": chunk.features,
            "metadata": chunk.metadata,
            "overlap_start": chunk.overlap_start,
            "overlap_end": chunk.overlap_end,
        });
        let meta_file = output_dir.join(format!("chunk_{:04}_meta.json", chunk.chunk_id));
        fs::write(&meta_file, serde_json::to_string_pretty(&meta)?)?;
        written.push(meta_file);
    }

    let index = json!({
        "total_chunks": chunks.len(),
        "chunks": chunks
            .iter()
            .map(|chunk| {
                json!({
                    "id": chunk.chunk_id,
                    "lines": format!("{}-{}", chunk.start_line, chunk.end_line),
                    "features": chunk.features,
                    "size": chunk.content.len(),
                })
            })
            .collect::<Vec<_>>(),
    });
    let index_file = output_dir.join("chunks_index.json");
    fs::write(&index_file, serde_json::to_string_pretty(&index)?)?;
    written.push(index_file);

    info!(chunks = chunks.len(), dir = %output_dir.display(), "chunks saved");
    Ok(written)
}
