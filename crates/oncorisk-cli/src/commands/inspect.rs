//! Inspect Command Implementation

use super::ArtifactArgs;
use anyhow::Result;
use clap::Args;
use oncorisk_serving::ArtifactSummary;

/// Describe the fitted artifacts
///
/// Loads both artifacts with the same checks as server startup and prints
/// their kinds, fitted widths, classes and estimator count as JSON.
#[derive(Args, Debug, Clone)]
pub struct InspectCommand {
    /// Artifact location
    #[command(flatten)]
    pub artifacts: ArtifactArgs,
}

impl InspectCommand {
    /// Execute the inspect command
    pub async fn run(&self) -> Result<()> {
        let summary = self.summary()?;
        println!("{}", serde_json::to_string_pretty(&summary)?);
        Ok(())
    }

    /// Load the artifacts and summarise them.
    pub fn summary(&self) -> Result<ArtifactSummary> {
        Ok(self.artifacts.load()?.summary())
    }
}
