use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Upload size limit enforced by the remote service (16 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

/// Well-known name of the side-input document required by the
/// misspelling-correction stage.
pub const REFERENCE_DOCUMENT: &str = "representatives.json";

/// Metadata of a file the user selected for upload, checked before any
/// network call. Ephemeral; discarded after validation.
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    pub name: String,
    pub size_bytes: u64,
    pub mime_or_extension: String,
}

/// A CSV dataset read into memory, ready to be submitted to the pipeline.
#[derive(Debug, Clone)]
pub struct CsvUpload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl CsvUpload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let bytes = std::fs::read(path)?;
        Ok(Self { name, bytes })
    }

    pub fn candidate(&self) -> UploadCandidate {
        let extension = Path::new(&self.name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        UploadCandidate {
            name: self.name.clone(),
            size_bytes: self.bytes.len() as u64,
            mime_or_extension: extension,
        }
    }
}

/// One network-mediated step of the remote pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageId {
    InitialUpload,
    Standardize,
    MisspellingCorrection,
    Deduplicate,
}

impl StageId {
    pub fn label(&self) -> &'static str {
        match self {
            StageId::InitialUpload => "initial upload",
            StageId::Standardize => "standardization",
            StageId::MisspellingCorrection => "misspelling correction",
            StageId::Deduplicate => "deduplication",
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Request body for a single stage call.
#[derive(Debug, Clone)]
pub enum StageBody {
    /// No body; the stage operates on server-side state left by prior stages.
    Empty,
    /// Multipart form with a single named file field.
    File {
        field: &'static str,
        filename: String,
        content_type: &'static str,
        bytes: Vec<u8>,
    },
}

impl StageBody {
    pub fn csv_file(upload: &CsvUpload) -> Self {
        StageBody::File {
            field: "file",
            filename: upload.name.clone(),
            content_type: "text/csv",
            bytes: upload.bytes.clone(),
        }
    }

    pub fn reference_file(bytes: Vec<u8>) -> Self {
        StageBody::File {
            field: "representatives",
            filename: REFERENCE_DOCUMENT.to_string(),
            content_type: "application/json",
            bytes,
        }
    }
}

/// Classified result of a single stage call. Never persisted.
#[derive(Debug, Clone)]
pub enum StageOutcome {
    Success { payload: serde_json::Value },
    Failure { stage: StageId, message: String },
}

/// Terminal result of one pipeline run. Elapsed time is wall-clock across
/// all stages, including the side-input fetch, and is reported on failure
/// as well (time spent so far).
#[derive(Debug, Clone)]
pub enum PipelineRunResult {
    Completed {
        final_payload: serde_json::Value,
        elapsed_ms: u64,
    },
    /// `stage` is `None` when the run was refused before any stage was
    /// attempted (no file provided).
    Failed {
        stage: Option<StageId>,
        message: String,
        elapsed_ms: u64,
    },
}

impl PipelineRunResult {
    pub fn is_success(&self) -> bool {
        matches!(self, PipelineRunResult::Completed { .. })
    }

    pub fn elapsed_ms(&self) -> u64 {
        match self {
            PipelineRunResult::Completed { elapsed_ms, .. } => *elapsed_ms,
            PipelineRunResult::Failed { elapsed_ms, .. } => *elapsed_ms,
        }
    }
}

/// Decoded response of the initial-dataset upload.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub message: String,
    pub data_info: Option<DataInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataInfo {
    /// `[rows, columns]` of the uploaded dataset.
    pub shape: [u64; 2],
    #[serde(default)]
    pub columns: Vec<String>,
}

/// The canonical statistics model. This is the only statistics shape the
/// rest of the system may depend on, regardless of backend payload variant.
///
/// `after_count` (sum of the two group-specific final counts) and
/// `dedup_after` (the dedup block's final count) are different aggregation
/// paths and may legitimately disagree; both are kept, never reconciled.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineStatistics {
    pub total_columns: u64,
    pub before_count: i64,
    pub after_count: i64,
    pub removed: i64,
    pub dedup_before: i64,
    pub dedup_after: i64,
    pub dedup_removed: i64,
    pub status_distribution: StatusDistribution,
    pub provider_distribution: ProviderDistribution,
    pub pipeline_steps: Vec<PipelineStep>,
    pub npi_validation: Option<NpiValidation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusDistribution {
    pub group_a: BTreeMap<String, i64>,
    pub group_b: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProviderDistribution {
    pub group_a: i64,
    pub group_b: i64,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineStep {
    pub step: String,
    pub records: i64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NpiValidation {
    pub valid_count: i64,
    pub invalid_count: i64,
    pub total_count: i64,
    pub valid_percentage: f64,
    pub invalid_percentage: f64,
    pub group_a_stats: GroupNpiStats,
    pub group_b_stats: GroupNpiStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupNpiStats {
    pub valid: i64,
    pub invalid: i64,
    pub total: i64,
}

/// One artifact produced by the remote pipeline, as listed by `/files/list`.
/// Immutable once received; `filename` is unique within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedFileRecord {
    pub filename: String,
    #[serde(default)]
    pub filepath: String,
    #[serde(default)]
    pub step: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub records: u64,
    #[serde(default)]
    pub columns: u64,
    #[serde(default)]
    pub size_mb: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_from_upload() {
        let upload = CsvUpload::new("Providers.CSV", vec![0u8; 128]);
        let candidate = upload.candidate();
        assert_eq!(candidate.name, "Providers.CSV");
        assert_eq!(candidate.size_bytes, 128);
        assert_eq!(candidate.mime_or_extension, "csv");
    }

    #[test]
    fn test_stage_labels() {
        assert_eq!(StageId::Standardize.label(), "standardization");
        assert_eq!(StageId::MisspellingCorrection.to_string(), "misspelling correction");
    }

    #[test]
    fn test_generated_file_record_tolerates_missing_fields() {
        let record: GeneratedFileRecord =
            serde_json::from_value(serde_json::json!({ "filename": "ca_split_20240101_120000.csv" }))
                .unwrap();
        assert_eq!(record.filename, "ca_split_20240101_120000.csv");
        assert_eq!(record.records, 0);
        assert_eq!(record.size_mb, 0.0);
    }
}
