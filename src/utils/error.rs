use crate::domain::model::StageId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Decoding(#[from] serde_json::Error),

    #[error("{} failed: {message}", .stage.label())]
    Stage { stage: StageId, message: String },

    #[error("missing required reference data: {resource}")]
    DependencyMissing { resource: String },

    #[error("invalid file type: {filename} (expected a .csv file)")]
    InvalidFileType { filename: String },

    #[error("file too large: {size_bytes} bytes (limit is {limit} bytes)")]
    FileTooLarge { size_bytes: u64, limit: u64 },

    #[error("normalization failed: {message}")]
    Normalization { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Processing error: {message}")]
    ProcessingError { message: String },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
