//! Serve Command Implementation
//!
//! Starts the HTTP prediction server and blocks until Ctrl-C.

use super::ArtifactArgs;
use anyhow::{Context, Result};
use clap::Args;
use oncorisk_serving::{Server, ServerConfig};
use tracing::info;

/// Serve risk predictions over HTTP
///
/// Loads the scaler and classifier once, then answers `GET /` and
/// `POST /predict` until interrupted.
///
/// # Example
///
/// ```bash
/// oncorisk serve \
///     --artifact-dir /srv/oncorisk \
///     --port 8000 \
///     --workers 4
/// ```
#[derive(Args, Debug, Clone)]
pub struct ServeCommand {
    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0", env = "ONCORISK_HOST")]
    pub host: String,

    /// Port to listen on for HTTP requests
    #[arg(long, short = 'p', default_value = "8000", env = "ONCORISK_PORT")]
    pub port: u16,

    /// Number of runtime worker threads (defaults to available parallelism)
    #[arg(long, short = 'w', env = "ONCORISK_WORKERS")]
    pub workers: Option<usize>,

    /// Artifact location
    #[command(flatten)]
    pub artifacts: ArtifactArgs,
}

impl ServeCommand {
    /// Server configuration for these flags.
    pub fn server_config(&self) -> ServerConfig {
        let mut builder = ServerConfig::builder()
            .host(self.host.clone())
            .port(self.port)
            .artifact_dir(self.artifacts.artifact_dir.clone())
            .scaler_file(self.artifacts.scaler_file.clone())
            .model_file(self.artifacts.model_file.clone());
        if let Some(workers) = self.workers {
            builder = builder.num_workers(workers);
        }
        builder.build()
    }

    /// Execute the serve command
    pub async fn run(&self) -> Result<()> {
        let config = self.server_config();
        info!("Starting prediction server...");
        info!("Artifact directory: {:?}", config.artifacts.dir);
        info!("Listening on {}", config.socket_addr());
        info!("Worker threads: {}", config.num_workers);

        let server = Server::new(config);
        server
            .start()
            .await
            .context("Failed to start prediction server")?;

        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for shutdown signal")?;

        info!("Received shutdown signal, stopping server...");
        server.stop().await.context("Failed to stop server")?;
        Ok(())
    }
}
