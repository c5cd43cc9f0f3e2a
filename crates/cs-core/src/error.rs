use thiserror::Error;

#[derive(Error, Debug)]
pub enum CsError {
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("Parse error ({format}): {message}")]
    Parse { format: String, message: String },
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Encoding error: {0}")]
    Encoding(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Output error: {0}")]
    Output(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CsError>;
