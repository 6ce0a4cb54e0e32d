//! Server configuration for the oncorisk prediction service.
//!
//! This module provides configuration structures for binding the HTTP server
//! and locating the two fitted artifacts it loads at startup.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default scaler artifact file name.
pub const DEFAULT_SCALER_FILE: &str = "final_scaler.json";

/// Default classifier artifact file name.
pub const DEFAULT_MODEL_FILE: &str = "final_rf_model.json";

/// Configuration for the HTTP prediction server.
///
/// # Example
///
/// ```
/// use oncorisk_serving::config::ServerConfig;
///
/// let config = ServerConfig::builder()
///     .host("127.0.0.1")
///     .port(8000)
///     .artifact_dir("/srv/oncorisk")
///     .build();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to (default: "0.0.0.0")
    pub host: String,

    /// Port to listen on (default: 8000)
    pub port: u16,

    /// Number of runtime worker threads handling requests
    pub num_workers: usize,

    /// Location of the fitted artifacts
    pub artifacts: ArtifactConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            num_workers: num_cpus(),
            artifacts: ArtifactConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Get the socket address string for binding.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if self.num_workers == 0 {
            return Err(ConfigError::InvalidWorkerCount);
        }
        self.artifacts.validate()
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    num_workers: Option<usize>,
    artifact_dir: Option<PathBuf>,
    scaler_file: Option<String>,
    model_file: Option<String>,
}

impl ServerConfigBuilder {
    /// Set the host address.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the port number.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the number of worker threads.
    pub fn num_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = Some(num_workers);
        self
    }

    /// Set the directory holding both artifacts.
    pub fn artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = Some(dir.into());
        self
    }

    /// Set the scaler artifact file name.
    pub fn scaler_file(mut self, name: impl Into<String>) -> Self {
        self.scaler_file = Some(name.into());
        self
    }

    /// Set the classifier artifact file name.
    pub fn model_file(mut self, name: impl Into<String>) -> Self {
        self.model_file = Some(name.into());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ServerConfig {
        let default = ServerConfig::default();
        ServerConfig {
            host: self.host.unwrap_or(default.host),
            port: self.port.unwrap_or(default.port),
            num_workers: self.num_workers.unwrap_or(default.num_workers),
            artifacts: ArtifactConfig {
                dir: self.artifact_dir.unwrap_or(default.artifacts.dir),
                scaler_file: self.scaler_file.unwrap_or(default.artifacts.scaler_file),
                model_file: self.model_file.unwrap_or(default.artifacts.model_file),
            },
        }
    }
}

/// Where the scaler and classifier artifacts live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactConfig {
    /// Directory both files are resolved against (default: working directory)
    pub dir: PathBuf,

    /// Scaler file name
    pub scaler_file: String,

    /// Classifier file name
    pub model_file: String,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            scaler_file: DEFAULT_SCALER_FILE.to_string(),
            model_file: DEFAULT_MODEL_FILE.to_string(),
        }
    }
}

impl ArtifactConfig {
    /// Artifacts rooted at `dir` with the default file names.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Default::default()
        }
    }

    /// Full path of the scaler artifact.
    pub fn scaler_path(&self) -> PathBuf {
        self.dir.join(&self.scaler_file)
    }

    /// Full path of the classifier artifact.
    pub fn model_path(&self) -> PathBuf {
        self.dir.join(&self.model_file)
    }

    /// Validate the file names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scaler_file.trim().is_empty() {
            return Err(ConfigError::EmptyArtifactName("scaler"));
        }
        if self.model_file.trim().is_empty() {
            return Err(ConfigError::EmptyArtifactName("model"));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Invalid port number
    #[error("Invalid port number: port cannot be 0")]
    InvalidPort,

    /// Invalid worker count
    #[error("Invalid worker count: must be at least 1")]
    InvalidWorkerCount,

    /// Artifact file name left blank
    #[error("Artifact file name for {0} cannot be empty")]
    EmptyArtifactName(&'static str),
}

/// Get the number of CPUs available.
fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
