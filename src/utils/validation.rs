use crate::domain::model::{UploadCandidate, MAX_UPLOAD_BYTES};
use crate::utils::error::{PipelineError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Pre-flight checks on a candidate upload. Rules are checked in order and
/// the first failing rule wins; no network or disk access happens here.
pub fn validate_upload(candidate: &UploadCandidate) -> Result<()> {
    if !candidate.name.to_lowercase().ends_with(".csv") {
        return Err(PipelineError::InvalidFileType {
            filename: candidate.name.clone(),
        });
    }

    if candidate.size_bytes > MAX_UPLOAD_BYTES {
        return Err(PipelineError::FileTooLarge {
            size_bytes: candidate.size_bytes,
            limit: MAX_UPLOAD_BYTES,
        });
    }

    Ok(())
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(PipelineError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(PipelineError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(PipelineError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(PipelineError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(PipelineError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}
