//! Shared types for the config sanitizer pipeline.

pub mod config;
pub mod error;
pub mod types;

pub use config::PreprocessConfig;
pub use error::{CsError, Result};
pub use types::{
    ConfigChunk, ConfigStructure, Format, HierarchyEntry, NodeKind, ProcessingResult,
    RunStatistics,
};
