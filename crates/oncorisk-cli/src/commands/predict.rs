//! Predict Command Implementation

use super::ArtifactArgs;
use anyhow::{Context, Result};
use clap::Args;
use oncorisk_serving::{PatientRecord, PredictOutcome, PredictionService};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Predict risk for a single patient record
///
/// Reads one JSON record from `--input` or stdin and prints the same body
/// `POST /predict` would return.
///
/// # Example
///
/// ```bash
/// oncorisk predict --artifact-dir /srv/oncorisk --input patient.json
/// ```
#[derive(Args, Debug, Clone)]
pub struct PredictCommand {
    /// JSON file with the patient record (reads stdin when omitted)
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// Pretty-print the output
    #[arg(long)]
    pub pretty: bool,

    /// Artifact location
    #[command(flatten)]
    pub artifacts: ArtifactArgs,
}

impl PredictCommand {
    /// Execute the predict command
    pub async fn run(&self) -> Result<()> {
        let raw = self.read_input()?;
        let outcome = self.predict(&raw)?;
        println!("{}", self.render(&outcome)?);
        Ok(())
    }

    /// Parse a record and run it through freshly loaded artifacts.
    pub fn predict(&self, raw: &str) -> Result<PredictOutcome> {
        let record: PatientRecord =
            serde_json::from_str(raw).context("Input is not a valid patient record")?;
        debug!("Parsed record: {:?}", record);

        let store = self.artifacts.load()?;
        let service = PredictionService::new(Arc::new(store));
        Ok(service.handle_predict(&record))
    }

    fn read_input(&self) -> Result<String> {
        match &self.input {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read input file: {:?}", path)),
            None => {
                let mut raw = String::new();
                std::io::stdin()
                    .read_to_string(&mut raw)
                    .context("Failed to read record from stdin")?;
                Ok(raw)
            }
        }
    }

    fn render(&self, outcome: &PredictOutcome) -> Result<String> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(outcome)?
        } else {
            serde_json::to_string(outcome)?
        };
        Ok(rendered)
    }
}
