use crate::domain::model::{
    CsvUpload, PipelineRunResult, StageBody, StageId, StageOutcome, UploadReceipt,
};
use crate::domain::ports::{ApiConfig, StageTransport};
use crate::utils::error::{PipelineError, Result};
use std::time::Instant;

/// States of one pipeline run. Data a later state needs travels inside the
/// variant that produced it.
#[derive(Debug, Clone)]
pub enum RunState {
    Idle,
    Standardizing,
    FetchingAuxInput,
    CorrectingMisspellings { representatives: Vec<u8> },
    Deduplicating,
    Succeeded { payload: serde_json::Value },
    Failed { stage: Option<StageId>, message: String },
}

impl RunState {
    fn name(&self) -> &'static str {
        match self {
            RunState::Idle => "Idle",
            RunState::Standardizing => "Standardizing",
            RunState::FetchingAuxInput => "FetchingAuxInput",
            RunState::CorrectingMisspellings { .. } => "CorrectingMisspellings",
            RunState::Deduplicating => "Deduplicating",
            RunState::Succeeded { .. } => "Succeeded",
            RunState::Failed { .. } => "Failed",
        }
    }
}

/// Drives the four stage calls in fixed order, stopping at the first failure.
/// Stages are strictly sequential; stage n+1 is never issued before stage
/// n's outcome is known, and nothing is retried.
pub struct PipelineOrchestrator<T: StageTransport, C: ApiConfig> {
    transport: T,
    config: C,
}

impl<T: StageTransport, C: ApiConfig> PipelineOrchestrator<T, C> {
    pub fn new(transport: T, config: C) -> Self {
        Self { transport, config }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url().trim_end_matches('/'), path)
    }

    /// Gating upload of the raw dataset, performed before the pipeline run.
    pub async fn upload_initial_dataset(&self, upload: &CsvUpload) -> Result<UploadReceipt> {
        let outcome = self
            .transport
            .call_stage(
                StageId::InitialUpload,
                &self.endpoint("/upload/initial-dataset"),
                StageBody::csv_file(upload),
            )
            .await;

        match outcome {
            StageOutcome::Success { payload } => Ok(serde_json::from_value(payload)?),
            StageOutcome::Failure { stage, message } => {
                Err(PipelineError::Stage { stage, message })
            }
        }
    }

    /// Runs standardize → fetch side-input → correct misspellings →
    /// deduplicate. The first failure short-circuits every remaining step.
    /// Re-running after a failure re-executes from the beginning; no stage
    /// is idempotent from this layer's point of view.
    pub async fn run(&self, upload: Option<&CsvUpload>) -> PipelineRunResult {
        let started = Instant::now();

        // Precondition: without a file there is nothing to run and no stage
        // is attempted.
        let Some(upload) = upload else {
            return PipelineRunResult::Failed {
                stage: None,
                message: "no file uploaded".to_string(),
                elapsed_ms: started.elapsed().as_millis() as u64,
            };
        };

        let mut state = RunState::Idle;

        loop {
            let next = match state {
                RunState::Idle => {
                    tracing::info!("Starting pipeline run for '{}'", upload.name);
                    RunState::Standardizing
                }

                RunState::Standardizing => {
                    match self
                        .transport
                        .call_stage(
                            StageId::Standardize,
                            &self.endpoint("/process/standardize"),
                            StageBody::csv_file(upload),
                        )
                        .await
                    {
                        StageOutcome::Success { .. } => RunState::FetchingAuxInput,
                        StageOutcome::Failure { stage, message } => RunState::Failed {
                            stage: Some(stage),
                            message,
                        },
                    }
                }

                RunState::FetchingAuxInput => {
                    match self
                        .transport
                        .fetch_reference(&self.config.reference_url())
                        .await
                    {
                        Ok(representatives) => {
                            RunState::CorrectingMisspellings { representatives }
                        }
                        // Precondition failure, not a stage failure; attributed
                        // to the stage that cannot proceed without it.
                        Err(e) => RunState::Failed {
                            stage: Some(StageId::MisspellingCorrection),
                            message: e.to_string(),
                        },
                    }
                }

                RunState::CorrectingMisspellings { representatives } => {
                    match self
                        .transport
                        .call_stage(
                            StageId::MisspellingCorrection,
                            &self.endpoint("/process/misspelling"),
                            StageBody::reference_file(representatives),
                        )
                        .await
                    {
                        StageOutcome::Success { .. } => RunState::Deduplicating,
                        StageOutcome::Failure { stage, message } => RunState::Failed {
                            stage: Some(stage),
                            message,
                        },
                    }
                }

                RunState::Deduplicating => {
                    match self
                        .transport
                        .call_stage(
                            StageId::Deduplicate,
                            &self.endpoint("/process/complete-pipeline"),
                            StageBody::Empty,
                        )
                        .await
                    {
                        StageOutcome::Success { payload } => RunState::Succeeded { payload },
                        StageOutcome::Failure { stage, message } => RunState::Failed {
                            stage: Some(stage),
                            message,
                        },
                    }
                }

                RunState::Succeeded { payload } => {
                    let elapsed_ms = started.elapsed().as_millis() as u64;
                    tracing::info!("Pipeline run completed in {} ms", elapsed_ms);
                    return PipelineRunResult::Completed {
                        final_payload: payload,
                        elapsed_ms,
                    };
                }

                RunState::Failed { stage, message } => {
                    let elapsed_ms = started.elapsed().as_millis() as u64;
                    match stage {
                        Some(stage) => {
                            tracing::error!("Pipeline failed at {}: {}", stage, message)
                        }
                        None => tracing::error!("Pipeline refused to start: {}", message),
                    }
                    return PipelineRunResult::Failed {
                        stage,
                        message,
                        elapsed_ms,
                    };
                }
            };

            tracing::debug!("Pipeline state: {}", next.name());
            state = next;
        }
    }
}
