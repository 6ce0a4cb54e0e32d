//! Serving infrastructure for the cancer risk predictor.
//!
//! This crate loads a fitted scaler and classifier once at startup and serves
//! binary risk predictions for patient records over HTTP.
//!
//! # Overview
//!
//! - **PatientRecord**: the eight-field request payload
//! - **encoder**: deterministic mapping from a record to an 8-column feature vector
//! - **ArtifactStore**: the process-wide scaler/classifier pair
//! - **PredictionService**: encode → scale → predict → respond
//! - **Server**: axum HTTP server with lifecycle and health reporting
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Browser / HTTP clients                      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │  GET /   POST /predict
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 http::router (CORS, tracing)                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     PredictionService                        │
//! │   encoder::encode ──▶ Scaler::transform ──▶ Classifier      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │        ArtifactStore (final_scaler.json, final_rf_model.json) │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use oncorisk_serving::{Server, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::builder()
//!     .host("0.0.0.0")
//!     .port(8000)
//!     .artifact_dir("/srv/oncorisk")
//!     .build();
//!
//! let server = Server::new(config);
//! server.start().await?;
//!
//! // Server is now accepting requests...
//!
//! server.stop().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Making Predictions
//!
//! The [`PredictionService`] can be used without the HTTP layer:
//!
//! ```no_run
//! use oncorisk_serving::{ArtifactConfig, ArtifactStore, PatientRecord, PredictionService};
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = ArtifactStore::load(&ArtifactConfig::in_dir("/srv/oncorisk"))?;
//! let service = PredictionService::new(Arc::new(store));
//!
//! let record: PatientRecord = serde_json::from_str(
//!     r#"{"age":45,"gender":"Male","bmi":27.3,"smoking":"Yes","genetic_risk":"No",
//!         "activity":3,"alcohol_intake":2,"cancer_history":"No"}"#,
//! )?;
//! println!("{}", serde_json::to_string(&service.handle_predict(&record))?);
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`ServingResult<T>`] which wraps [`ServingError`]:
//!
//! ```
//! use oncorisk_serving::error::{ServingError, ServingResult};
//!
//! fn handle_error(result: ServingResult<()>) {
//!     match result {
//!         Ok(_) => println!("Success"),
//!         Err(ServingError::ShapeMismatch { expected, .. }) => {
//!             println!("Artifacts expect {} features", expected)
//!         }
//!         Err(e) if e.is_startup_error() => println!("Cannot start: {}", e),
//!         Err(e) => println!("Error: {}", e),
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod artifacts;
pub mod config;
pub mod encoder;
pub mod error;
pub mod http;
pub mod record;
pub mod server;
pub mod service;

// Re-export main types at crate root for convenience
pub use artifacts::{ArtifactStore, ArtifactSummary, Classifier, Scaler};
pub use config::{ArtifactConfig, ServerConfig};
pub use error::{ServingError, ServingResult};
pub use record::{PatientRecord, PredictOutcome, RiskLabel};
pub use server::{HealthStatus, Server, ServerState};
pub use service::PredictionService;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "oncorisk-serving");
    }

    #[test]
    fn test_re_exports() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.artifacts, ArtifactConfig::default());
    }
}
