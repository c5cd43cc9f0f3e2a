//! The orchestrator: runs parsing, metadata extraction, masking and
//! chunking over one file in a fixed stage order and persists the
//! artifacts.
//!
//! Stage order is conversion, metadata, desensitization, chunking,
//! report. Metadata and desensitization always work on the original
//! text, never on the re-rendered unified tree; chunking works on the
//! masked text when masking ran. Everything is synchronous; one
//! in-flight call per instance.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use cs_chunker::{persist::save_chunks, Chunker};
use cs_core::{CsError, PreprocessConfig, ProcessingResult, Result, RunStatistics};
use cs_desensitizer::Desensitizer;
use cs_metadata::MetadataExtractor;
use cs_parser::{convert_to_unified, FormatParser};
use serde_json::{json, Value};
use tempfile::TempDir;
use tracing::{error, info, warn};

/// Which optional stages to run. All on by default.
#[derive(Debug, Clone, Copy)]
pub struct StepFlags {
    pub desensitize: bool,
    pub convert_format: bool,
    pub chunk: bool,
    pub extract_metadata: bool,
}

impl Default for StepFlags {
    fn default() -> Self {
        Self {
            desensitize: true,
            convert_format: true,
            chunk: true,
            extract_metadata: true,
        }
    }
}

pub struct Preprocessor {
    config: PreprocessConfig,
    parser: FormatParser,
    desensitizer: Desensitizer,
    chunker: Chunker,
    metadata_extractor: MetadataExtractor,
    /// Directory artifacts are actually written to.
    output_dir: PathBuf,
    /// Directory the configuration asked for. Differs from
    /// `output_dir` only under the temp fallback.
    preferred_dir: PathBuf,
    used_temp_fallback: bool,
    in_memory: bool,
    // Keeps the fallback directory alive for the instance's lifetime.
    _temp_root: Option<TempDir>,
    statistics: RunStatistics,
}

impl Preprocessor {
    /// Filesystem-backed instance writing under the configured output
    /// root (optionally inside a timestamped run folder).
    pub fn new(config: PreprocessConfig) -> Result<Self> {
        Self::build(config, false)
    }

    /// Instance for environments with no writable output root:
    /// artifacts go to a scoped temp directory and are read back into
    /// each result's name-to-bytes map.
    pub fn in_memory(config: PreprocessConfig) -> Result<Self> {
        Self::build(config, true)
    }

    fn build(config: PreprocessConfig, in_memory: bool) -> Result<Self> {
        let mut preferred = config.output.base_dir.clone();
        if config.output.create_timestamp_folder {
            let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
            preferred = preferred.join(stamp);
        }

        let (output_dir, temp_root, used_temp_fallback) = if in_memory {
            let temp = TempDir::new()?;
            (temp.path().to_path_buf(), Some(temp), false)
        } else {
            match fs::create_dir_all(&preferred) {
                Ok(()) => (preferred.clone(), None, false),
                Err(e) => {
                    warn!(
                        dir = %preferred.display(),
                        error = %e,
                        "output root not writable, falling back to temp dir"
                    );
                    let temp = TempDir::new()?;
                    (temp.path().to_path_buf(), Some(temp), true)
                }
            }
        };

        Ok(Self {
            parser: FormatParser::new(config.file_processing.clone()),
            desensitizer: Desensitizer::new(&config.desensitization),
            chunker: Chunker::new(&config.chunking),
            metadata_extractor: MetadataExtractor::new(&config.metadata),
            config,
            output_dir,
            preferred_dir: preferred,
            used_temp_fallback,
            in_memory,
            _temp_root: temp_root,
            statistics: RunStatistics::default(),
        })
    }

    /// Run the requested stages over one file. Errors never escape:
    /// any failure becomes a failed result with its message recorded
    /// and the processing time still measured.
    pub fn process_file(&mut self, path: impl AsRef<Path>, flags: StepFlags) -> ProcessingResult {
        let path = path.as_ref();
        let start = Instant::now();
        let mut processed_files: Vec<PathBuf> = Vec::new();
        let mut metadata_value: Option<Value> = None;

        let outcome = self.run_stages(path, flags, &mut processed_files, &mut metadata_value);
        let processing_time = start.elapsed().as_secs_f64();
        self.statistics.processing_time_seconds += processing_time;

        match outcome {
            Ok((original_format, file_dir)) => {
                let mirror_error = if self.used_temp_fallback {
                    self.mirror_back(&file_dir)
                } else {
                    None
                };
                let in_memory = if self.in_memory {
                    match collect_artifacts(&file_dir) {
                        Ok(map) => Some(map),
                        Err(e) => {
                            warn!(error = %e, "artifact read-back failed");
                            None
                        }
                    }
                } else {
                    None
                };

                info!(
                    file = %path.display(),
                    seconds = processing_time,
                    "file processed"
                );
                ProcessingResult {
                    success: true,
                    file_path: path.display().to_string(),
                    original_format,
                    message: "File processed successfully".to_string(),
                    processed_files,
                    in_memory,
                    metadata: metadata_value,
                    statistics: self.statistics.clone(),
                    errors: Vec::new(),
                    processing_time,
                    used_temp_fallback: self.used_temp_fallback,
                    mirror_error,
                }
            }
            Err(e) => {
                error!(file = %path.display(), error = %e, "file processing failed");
                ProcessingResult {
                    success: false,
                    file_path: path.display().to_string(),
                    original_format: "unknown".to_string(),
                    message: format!("Processing failed: {e}"),
                    processed_files,
                    in_memory: None,
                    metadata: metadata_value,
                    statistics: self.statistics.clone(),
                    errors: vec![e.to_string()],
                    processing_time,
                    used_temp_fallback: self.used_temp_fallback,
                    mirror_error: None,
                }
            }
        }
    }

    fn run_stages(
        &mut self,
        path: &Path,
        flags: StepFlags,
        processed: &mut Vec<PathBuf>,
        metadata_out: &mut Option<Value>,
    ) -> Result<(String, PathBuf)> {
        if !path.is_file() {
            return Err(CsError::FileNotFound(path.display().to_string()));
        }

        let file_size_mb = fs::metadata(path)?.len() as f64 / (1024.0 * 1024.0);
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("input")
            .to_string();
        let file_dir = self.output_dir.join(&stem);
        fs::create_dir_all(&file_dir)?;

        let format = self.parser.detect_format(path);
        let original = self.parser.read_file(path)?;

        if flags.convert_format {
            let structure = self.parser.parse(format, &original)?;
            let unified = convert_to_unified(&structure);
            let unified_file = file_dir.join(format!("{stem}_unified.json"));
            fs::write(&unified_file, serde_json::to_string_pretty(&unified)?)?;
            processed.push(unified_file);
        }

        if flags.extract_metadata {
            let record = self.metadata_extractor.extract(&original);
            let value = serde_json::to_value(&record)?;
            let metadata_file = file_dir.join(format!("{stem}_metadata.json"));
            fs::write(&metadata_file, serde_json::to_string_pretty(&value)?)?;
            processed.push(metadata_file);
            *metadata_out = Some(value);
        }

        let mut latest = original;
        if flags.desensitize {
            let (masked, mapping) = self.desensitizer.desensitize_text(&latest);
            let masked_file = file_dir.join(format!("{stem}_desensitized.txt"));
            fs::write(&masked_file, &masked)?;
            processed.push(masked_file);

            let mapping_file = file_dir.join(format!("{stem}_desensitize_mapping.json"));
            fs::write(&mapping_file, serde_json::to_string_pretty(&mapping)?)?;
            processed.push(mapping_file);

            self.statistics.desensitization_count =
                self.desensitizer.statistics().total_replacements;
            latest = masked;
        }

        let mut chunks_created = 0usize;
        if flags.chunk {
            let chunks = self.chunker.chunk_text(&latest);
            chunks_created = chunks.len();
            let chunks_dir = file_dir.join("chunks");
            save_chunks(&chunks, &chunks_dir)?;
            processed.push(chunks_dir);
            self.statistics.chunks_created += chunks_created as u64;
        }

        let report = json!({
            "timestamp": chrono::Local::now().to_rfc3339(),
            "version": env!("CARGO_PKG_VERSION"),
            "file_path": path.display().to_string(),
            "original_format": format.as_str(),
            "metadata": metadata_out.clone().unwrap_or_else(|| json!({})),
            "processed_files": path_strings(processed),
            "statistics": {
                "file_size_mb": file_size_mb,
                "chunks_created": chunks_created,
                "desensitization": if flags.desensitize {
                    serde_json::to_value(self.desensitizer.statistics())?
                } else {
                    json!({})
                },
            },
        });
        let report_file = file_dir.join(format!("{stem}_report.json"));
        fs::write(&report_file, serde_json::to_string_pretty(&report)?)?;
        processed.push(report_file);

        self.statistics.files_processed += 1;
        self.statistics.total_size_mb += file_size_mb;

        Ok((format.as_str().to_string(), file_dir))
    }

    /// Enumerate files under `dir` matching `pattern` and process each
    /// with default flags. A failed file is recorded and the walk
    /// continues. Emits `processing_summary.json` in the run folder.
    pub fn process_directory(
        &mut self,
        dir: impl AsRef<Path>,
        pattern: &str,
        recursive: bool,
    ) -> Result<Vec<ProcessingResult>> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(CsError::FileNotFound(dir.display().to_string()));
        }

        let glob_expr = if recursive {
            dir.join("**").join(pattern)
        } else {
            dir.join(pattern)
        };
        let paths = glob::glob(&glob_expr.to_string_lossy())
            .map_err(|e| CsError::InvalidConfig(format!("bad file pattern: {e}")))?;

        let mut results = Vec::new();
        for entry in paths {
            match entry {
                Ok(path) if path.is_file() => {
                    results.push(self.process_file(&path, StepFlags::default()));
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "unreadable directory entry skipped"),
            }
        }
        info!(files = results.len(), "directory walk complete");

        self.write_summary(&results)?;
        Ok(results)
    }

    /// Byte-oriented entry point: the bytes are staged in a scoped temp
    /// file (named after `name` for format hinting and output naming)
    /// which is removed on every exit path.
    pub fn process_bytes(&mut self, name: &str, bytes: &[u8], flags: StepFlags) -> ProcessingResult {
        let staged = TempDir::new().and_then(|dir| {
            let file_name = Path::new(name)
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "input.txt".into());
            let input = dir.path().join(file_name);
            fs::write(&input, bytes)?;
            Ok((dir, input))
        });

        match staged {
            Ok((_dir, input)) => {
                let mut result = self.process_file(&input, flags);
                result.file_path = name.to_string();
                result
            }
            Err(e) => ProcessingResult {
                success: false,
                file_path: name.to_string(),
                original_format: "unknown".to_string(),
                message: format!("Processing failed: {e}"),
                processed_files: Vec::new(),
                in_memory: None,
                metadata: None,
                statistics: self.statistics.clone(),
                errors: vec![e.to_string()],
                processing_time: 0.0,
                used_temp_fallback: self.used_temp_fallback,
                mirror_error: None,
            },
        }
    }

    /// Cumulative counters across all calls on this instance.
    pub fn statistics(&self) -> &RunStatistics {
        &self.statistics
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    fn write_summary(&self, results: &[ProcessingResult]) -> Result<()> {
        let summary = json!({
            "total_files": results.len(),
            "successful": results.iter().filter(|r| r.success).count(),
            "failed": results.iter().filter(|r| !r.success).count(),
            "total_processing_time": results.iter().map(|r| r.processing_time).sum::<f64>(),
            "total_size_mb": self.statistics.total_size_mb,
            "total_chunks": self.statistics.chunks_created,
            "files": results
                .iter()
                .map(|r| {
                    json!({
                        "file": r.file_path,
                        "success": r.success,
                        "format": r.original_format,
                        "processing_time": r.processing_time,
                        "errors": r.errors,
                    })
                })
                .collect::<Vec<_>>(),
        });
        let summary_file = self.output_dir.join("processing_summary.json");
        fs::write(&summary_file, serde_json::to_string_pretty(&summary)?)?;
        info!(file = %summary_file.display(), "summary written");
        Ok(())
    }

    /// Best-effort copy of one file's artifacts from the temp fallback
    /// to the configured root. Failure is surfaced, never fatal.
    fn mirror_back(&self, file_dir: &Path) -> Option<String> {
        let target = match file_dir.file_name() {
            Some(name) => self.preferred_dir.join(name),
            None => return Some("artifact directory has no name".to_string()),
        };
        match copy_dir(file_dir, &target) {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, "mirror-back to preferred output root failed");
                Some(e.to_string())
            }
        }
    }
}

fn path_strings(paths: &[PathBuf]) -> Vec<String> {
    paths.iter().map(|p| p.display().to_string()).collect()
}

fn copy_dir(src: &Path, dst: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), target)?;
        }
    }
    Ok(())
}

/// Read every artifact under `dir` into a relative-name to bytes map.
fn collect_artifacts(dir: &Path) -> Result<BTreeMap<String, Vec<u8>>> {
    let mut files = BTreeMap::new();
    collect_into(dir, dir, &mut files)?;
    Ok(files)
}

fn collect_into(
    root: &Path,
    dir: &Path,
    files: &mut BTreeMap<String, Vec<u8>>,
) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_into(root, &path, files)?;
        } else {
            let name = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .to_string_lossy()
                .into_owned();
            files.insert(name, fs::read(&path)?);
        }
    }
    Ok(())
}
