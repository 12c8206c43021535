pub mod cli;
pub mod toml_config;

use crate::domain::model::REFERENCE_DOCUMENT;
use crate::domain::ports::ApiConfig;
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, validate_url, Validate};
use clap::Parser;
use std::path::PathBuf;
use toml_config::FileConfig;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone, Parser)]
#[command(name = "provider-pipeline")]
#[command(about = "Runs a CSV dataset through the remote data-quality pipeline")]
pub struct CliConfig {
    /// CSV dataset to push through the pipeline
    pub input: PathBuf,

    /// Base address of the remote pipeline service
    #[arg(long)]
    pub base_url: Option<String>,

    /// Location of the representatives reference document
    #[arg(long)]
    pub reference_url: Option<String>,

    /// Directory for downloaded artifacts
    #[arg(long)]
    pub output_path: Option<String>,

    /// Optional TOML configuration file; CLI flags take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Download every generated artifact after a successful run
    #[arg(long)]
    pub download: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

/// Effective settings after merging CLI flags over the optional config file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub reference_url: String,
    pub output_path: String,
}

impl Settings {
    pub fn resolve(cli: &CliConfig) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => Some(FileConfig::from_file(path)?),
            None => None,
        };

        let base_url = cli
            .base_url
            .clone()
            .or_else(|| file.as_ref().map(|f| f.api.base_url.clone()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let reference_url = cli
            .reference_url
            .clone()
            .or_else(|| file.as_ref().and_then(|f| f.api.reference_url.clone()))
            .unwrap_or_else(|| {
                format!(
                    "{}/uploads/{}",
                    base_url.trim_end_matches('/'),
                    REFERENCE_DOCUMENT
                )
            });

        let output_path = cli
            .output_path
            .clone()
            .or_else(|| {
                file.as_ref()
                    .and_then(|f| f.output.as_ref().map(|o| o.path.clone()))
            })
            .unwrap_or_else(|| "./output".to_string());

        Ok(Self {
            base_url,
            reference_url,
            output_path,
        })
    }
}

impl ApiConfig for Settings {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn reference_url(&self) -> String {
        self.reference_url.clone()
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_url("base_url", &self.base_url)?;
        validate_url("reference_url", &self.reference_url)?;
        validate_path("output_path", &self.output_path)?;
        Ok(())
    }
}
