//! Error types for the oncorisk-serving crate.
//!
//! Startup failures (artifact loading, configuration) and per-request pipeline
//! failures share one enum. The prediction service flattens pipeline failures
//! into an error string; the variants stay distinguishable here.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for serving operations.
pub type ServingResult<T> = Result<T, ServingError>;

/// Errors that can occur while loading artifacts or serving predictions.
#[derive(Debug, Error)]
pub enum ServingError {
    /// An artifact file could not be read or parsed.
    #[error("Failed to load artifact {path:?}: {reason}")]
    ArtifactLoad {
        /// File that failed to load
        path: PathBuf,
        /// Underlying cause
        reason: String,
    },

    /// An artifact was written by an incompatible exporter.
    #[error("Artifact {path:?} has format version {found}, expected {expected}")]
    ArtifactVersion {
        /// File that carried the version
        path: PathBuf,
        /// Version found in the file
        found: u32,
        /// Version this build understands
        expected: u32,
    },

    /// A fitted artifact is internally inconsistent.
    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),

    /// Input column count does not match what the artifact was fitted on.
    #[error("X has {actual} features, but {estimator} is expecting {expected} features as input.")]
    ShapeMismatch {
        /// Estimator that rejected the input
        estimator: &'static str,
        /// Fitted feature count
        expected: usize,
        /// Feature count received
        actual: usize,
    },

    /// Prediction failed.
    #[error("Prediction failed: {0}")]
    Prediction(String),

    /// Server error.
    #[error("Server error: {0}")]
    Server(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServingError {
    /// Create an artifact load error.
    pub fn artifact_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ArtifactLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an invalid artifact error.
    pub fn invalid_artifact(msg: impl Into<String>) -> Self {
        Self::InvalidArtifact(msg.into())
    }

    /// Create a prediction error.
    pub fn prediction(msg: impl Into<String>) -> Self {
        Self::Prediction(msg.into())
    }

    /// Create a server error.
    pub fn server(msg: impl Into<String>) -> Self {
        Self::Server(msg.into())
    }

    /// Create a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if this error happens before the service can serve.
    pub fn is_startup_error(&self) -> bool {
        matches!(
            self,
            Self::ArtifactLoad { .. }
                | Self::ArtifactVersion { .. }
                | Self::InvalidArtifact(_)
                | Self::Config(_)
        )
    }

    /// Check if this error was most likely caused by the request payload.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ShapeMismatch { .. })
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }
}
