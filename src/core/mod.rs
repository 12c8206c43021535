pub mod catalog;
pub mod normalizer;
pub mod orchestrator;
pub mod stage_client;

pub use crate::domain::model::{
    CsvUpload, GeneratedFileRecord, PipelineRunResult, PipelineStatistics, StageBody, StageId,
    StageOutcome, UploadCandidate,
};
pub use crate::domain::ports::{ApiConfig, StageTransport, Storage};
pub use crate::utils::error::Result;
