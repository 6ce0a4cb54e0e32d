//! CLI Command Implementations
//!
//! This module contains the implementations for all CLI subcommands:
//!
//! - [`serve`]: HTTP prediction server
//! - [`predict`]: single-record prediction
//! - [`inspect`]: artifact summary

mod inspect;
mod predict;
mod serve;

pub use inspect::InspectCommand;
pub use predict::PredictCommand;
pub use serve::ServeCommand;

use anyhow::{Context, Result};
use clap::Args;
use oncorisk_serving::config::{ArtifactConfig, DEFAULT_MODEL_FILE, DEFAULT_SCALER_FILE};
use oncorisk_serving::ArtifactStore;
use std::path::PathBuf;
use tracing::info;

/// Location of the fitted scaler and classifier.
#[derive(Args, Debug, Clone)]
pub struct ArtifactArgs {
    /// Directory containing the artifact files
    #[arg(long, short = 'd', default_value = ".", env = "ONCORISK_ARTIFACT_DIR")]
    pub artifact_dir: PathBuf,

    /// Scaler artifact file name
    #[arg(long, default_value = DEFAULT_SCALER_FILE, env = "ONCORISK_SCALER_FILE")]
    pub scaler_file: String,

    /// Classifier artifact file name
    #[arg(long, default_value = DEFAULT_MODEL_FILE, env = "ONCORISK_MODEL_FILE")]
    pub model_file: String,
}

impl ArtifactArgs {
    /// Artifact configuration for these flags.
    pub fn config(&self) -> ArtifactConfig {
        ArtifactConfig {
            dir: self.artifact_dir.clone(),
            scaler_file: self.scaler_file.clone(),
            model_file: self.model_file.clone(),
        }
    }

    /// Validate and load both artifacts.
    pub fn load(&self) -> Result<ArtifactStore> {
        let config = self.config();
        config.validate().context("Invalid artifact configuration")?;
        info!("Loading artifacts from {:?}", config.dir);
        ArtifactStore::load(&config)
            .with_context(|| format!("Failed to load artifacts from {:?}", config.dir))
    }
}

impl Default for ArtifactArgs {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from("."),
            scaler_file: DEFAULT_SCALER_FILE.to_string(),
            model_file: DEFAULT_MODEL_FILE.to_string(),
        }
    }
}
