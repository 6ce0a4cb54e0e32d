//! Oncorisk CLI - serve and query the cancer risk predictor.
//!
//! This binary wraps the serving crate: it runs the HTTP server, answers
//! one-off predictions, and describes the fitted artifacts.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use oncorisk_cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing subscriber with environment filter
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("oncorisk=info".parse()?))
        .init();

    // Parse command-line arguments
    let cli = Cli::parse();

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    if let Some(workers) = cli.worker_threads().filter(|w| *w > 0) {
        builder.worker_threads(workers);
    }
    let runtime = builder
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> Result<()> {
    info!("Oncorisk CLI starting...");

    // Dispatch to appropriate subcommand
    match cli.command {
        Commands::Serve(cmd) => cmd.run().await?,
        Commands::Predict(cmd) => cmd.run().await?,
        Commands::Inspect(cmd) => cmd.run().await?,
    }

    info!("Oncorisk CLI completed successfully");
    Ok(())
}
