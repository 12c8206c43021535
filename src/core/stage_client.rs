use crate::domain::model::{
    GeneratedFileRecord, StageBody, StageId, StageOutcome, REFERENCE_DOCUMENT,
};
use crate::domain::ports::StageTransport;
use crate::utils::error::{PipelineError, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

/// The single reusable request primitive: submit one request, decode one
/// JSON response, classify success/failure. No retries; a failed attempt
/// ends the stage.
#[derive(Debug, Clone, Default)]
pub struct StageClient {
    client: Client,
}

#[derive(Debug, Deserialize)]
struct FileListResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    generated_files: Vec<GeneratedFileRecord>,
}

impl StageClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    fn build_request(&self, endpoint: &str, body: StageBody) -> Result<reqwest::RequestBuilder> {
        let request = self.client.post(endpoint);
        match body {
            StageBody::Empty => Ok(request),
            StageBody::File {
                field,
                filename,
                content_type,
                bytes,
            } => {
                let part = Part::bytes(bytes)
                    .file_name(filename)
                    .mime_str(content_type)?;
                Ok(request.multipart(Form::new().part(field, part)))
            }
        }
    }

    /// Fetch the generated-file catalog from `/files/list`.
    pub async fn list_generated_files(&self, base_url: &str) -> Result<Vec<GeneratedFileRecord>> {
        let endpoint = format!("{}/files/list", base_url.trim_end_matches('/'));
        tracing::debug!("Fetching generated file list from {}", endpoint);

        let response = self.client.get(&endpoint).send().await?;
        if !response.status().is_success() {
            return Err(PipelineError::ProcessingError {
                message: format!("file list request failed with HTTP {}", response.status().as_u16()),
            });
        }

        let listing: FileListResponse = response.json().await?;
        if let Some(status) = listing.status.as_deref() {
            if status != "success" {
                return Err(PipelineError::ProcessingError {
                    message: listing
                        .error
                        .unwrap_or_else(|| "file list request failed".to_string()),
                });
            }
        }

        Ok(listing.generated_files)
    }

    /// Download one generated artifact as raw bytes.
    pub async fn download_file(&self, base_url: &str, filename: &str) -> Result<Vec<u8>> {
        let endpoint = format!(
            "{}/files/download/{}",
            base_url.trim_end_matches('/'),
            filename
        );
        tracing::debug!("Downloading {}", endpoint);

        let response = self.client.get(&endpoint).send().await?;
        if !response.status().is_success() {
            return Err(PipelineError::ProcessingError {
                message: format!(
                    "download of '{}' failed with HTTP {}",
                    filename,
                    response.status().as_u16()
                ),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait::async_trait]
impl StageTransport for StageClient {
    async fn call_stage(&self, stage: StageId, endpoint: &str, body: StageBody) -> StageOutcome {
        tracing::debug!("Calling {} stage at {}", stage, endpoint);

        let request = match self.build_request(endpoint, body) {
            Ok(request) => request,
            Err(e) => {
                return StageOutcome::Failure {
                    stage,
                    message: e.to_string(),
                }
            }
        };

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                return StageOutcome::Failure {
                    stage,
                    message: format!("request failed: {}", e),
                }
            }
        };

        let status = response.status();
        tracing::debug!("{} stage responded with HTTP {}", stage, status);

        // Non-2xx ends the stage without inspecting the body.
        if !status.is_success() {
            return StageOutcome::Failure {
                stage,
                message: format!("HTTP error {}", status.as_u16()),
            };
        }

        let payload: serde_json::Value = match response.json().await {
            Ok(payload) => payload,
            Err(_) => {
                return StageOutcome::Failure {
                    stage,
                    message: "malformed response".to_string(),
                }
            }
        };

        match payload.get("status").and_then(serde_json::Value::as_str) {
            Some(status) if status != "success" => StageOutcome::Failure {
                stage,
                message: payload
                    .get("error")
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{} failed", stage.label())),
            },
            _ => StageOutcome::Success { payload },
        }
    }

    async fn fetch_reference(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("Fetching reference document from {}", url);

        let missing = || PipelineError::DependencyMissing {
            resource: REFERENCE_DOCUMENT.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(|_| missing())?;
        if !response.status().is_success() {
            return Err(missing());
        }

        Ok(response.bytes().await.map_err(|_| missing())?.to_vec())
    }
}
