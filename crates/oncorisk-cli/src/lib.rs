//! Oncorisk CLI Library
//!
//! This crate provides the command-line interface for the cancer risk
//! predictor, including:
//!
//! - **Serve**: HTTP prediction server
//! - **Predict**: one-off prediction for a single patient record
//! - **Inspect**: summary of the fitted artifacts
//!
//! # Example
//!
//! ```bash
//! # Serve predictions on port 8000
//! oncorisk serve --artifact-dir /srv/oncorisk --port 8000
//!
//! # Predict for one record
//! echo '{"age":45,"gender":"Male",...}' | oncorisk predict --artifact-dir /srv/oncorisk
//!
//! # Describe the loaded artifacts
//! oncorisk inspect --artifact-dir /srv/oncorisk
//! ```

pub mod commands;

use clap::{Parser, Subcommand};

pub use commands::{ArtifactArgs, InspectCommand, PredictCommand, ServeCommand};

/// Oncorisk - cancer risk prediction service
///
/// Serves binary cancer risk predictions from a fitted scaler and classifier.
#[derive(Parser, Debug)]
#[command(name = "oncorisk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Runtime worker threads requested by the command, if any.
    pub fn worker_threads(&self) -> Option<usize> {
        match &self.command {
            Commands::Serve(cmd) => Some(cmd.server_config().num_workers),
            Commands::Predict(_) | Commands::Inspect(_) => None,
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve risk predictions over HTTP
    Serve(ServeCommand),

    /// Predict risk for a single patient record
    Predict(PredictCommand),

    /// Describe the fitted artifacts
    Inspect(InspectCommand),
}

/// Result type alias for CLI operations
pub type CliResult<T> = anyhow::Result<T>;
