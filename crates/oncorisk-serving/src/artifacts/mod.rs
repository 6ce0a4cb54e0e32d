//! Fitted preprocessing and classification artifacts.
//!
//! Artifacts are exported by the training toolchain as JSON envelopes:
//!
//! ```json
//! { "format_version": 1, "artifact": { "type": "standard", "n_features_in": 8, "...": "..." } }
//! ```
//!
//! Each envelope body deserialises into a spec ([`ScalerSpec`],
//! [`ClassifierSpec`]) which is validated and turned into a fitted runtime
//! object behind the [`Scaler`] / [`Classifier`] traits. The
//! [`ArtifactStore`] owns one of each for the lifetime of the process.

pub mod classifier;
pub mod scaler;
pub mod store;

pub use classifier::{Classifier, ClassifierSpec};
pub use scaler::{Scaler, ScalerSpec};
pub use store::{ArtifactStore, ArtifactSummary};

use crate::error::{ServingError, ServingResult};
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

/// Envelope version understood by this build.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// On-disk wrapper around a single artifact body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactFile<T> {
    /// Exporter format version
    pub format_version: u32,

    /// Artifact body
    pub artifact: T,
}

impl<T> ArtifactFile<T> {
    /// Wrap a body with the current format version.
    pub fn new(artifact: T) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            artifact,
        }
    }
}

/// Reject inputs whose column count differs from the fitted count.
pub(crate) fn check_columns(
    estimator: &'static str,
    expected: Option<usize>,
    input: &ArrayView2<'_, f64>,
) -> ServingResult<()> {
    match expected {
        Some(expected) if input.ncols() != expected => Err(ServingError::ShapeMismatch {
            estimator,
            expected,
            actual: input.ncols(),
        }),
        _ => Ok(()),
    }
}

/// Reject NaN and infinite inputs.
pub(crate) fn check_finite(input: &ArrayView2<'_, f64>) -> ServingResult<()> {
    if input.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ServingError::prediction("Input X contains NaN or infinity."))
    }
}
