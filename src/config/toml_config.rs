use crate::utils::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional TOML configuration file, e.g.:
///
/// ```toml
/// [api]
/// base_url = "http://localhost:5000"
/// reference_url = "http://localhost:5000/uploads/representatives.json"
///
/// [output]
/// path = "./output"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub api: ApiSection,
    pub output: Option<OutputSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    pub base_url: String,
    pub reference_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    pub path: String,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| PipelineError::ConfigError {
            message: format!("failed to parse {}: {}", path.display(), e),
        })
    }
}
