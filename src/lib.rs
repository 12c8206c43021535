pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::config::{cli::LocalStorage, CliConfig, Settings};
pub use crate::core::{
    catalog, normalizer, orchestrator::PipelineOrchestrator, stage_client::StageClient,
};
pub use crate::domain::model::{
    CsvUpload, GeneratedFileRecord, PipelineRunResult, PipelineStatistics, StageId, StageOutcome,
    UploadCandidate,
};
pub use crate::domain::ports::{ApiConfig, StageTransport, Storage};
pub use crate::utils::error::{PipelineError, Result};
