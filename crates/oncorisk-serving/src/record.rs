//! Request and response types for the prediction endpoint.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Number of model input features.
pub const FEATURE_COUNT: usize = 8;

/// Feature names in the order the scaler and classifier were fitted on.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "age",
    "gender",
    "bmi",
    "smoking",
    "genetic_risk",
    "activity",
    "alcohol_intake",
    "cancer_history",
];

/// One patient record as submitted to `POST /predict`.
///
/// Every field is required. Categorical fields are free-form strings; see
/// [`crate::encoder`] for how they are reduced to 0/1. No range checks are
/// applied to any field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Age in years
    pub age: i64,

    /// "Male" or anything else
    pub gender: String,

    /// Body mass index
    pub bmi: f64,

    /// "Yes" or anything else
    pub smoking: String,

    /// "Yes" or anything else
    pub genetic_risk: String,

    /// Physical activity score (unit undefined)
    pub activity: i64,

    /// Alcohol intake score (unit undefined)
    pub alcohol_intake: i64,

    /// "Yes" or anything else
    pub cancer_history: String,
}

/// Encoded model input, ordered as [`FEATURE_NAMES`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Wrap raw values that are already in fitted order.
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    /// Borrow the values.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Value of a named feature.
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|idx| self.0[idx])
    }

    /// Single-row matrix fed to the scaler.
    pub fn to_row(&self) -> Array2<f64> {
        Array2::from_shape_fn((1, FEATURE_COUNT), |(_, col)| self.0[col])
    }
}

impl From<FeatureVector> for Vec<f64> {
    fn from(vector: FeatureVector) -> Self {
        vector.0.to_vec()
    }
}

/// Binary risk label returned to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLabel {
    /// Classifier returned the positive class
    High,
    /// Classifier returned anything else
    Low,
}

impl RiskLabel {
    /// Map a classifier output class. Only class `1` is high risk.
    pub fn from_class(class: i64) -> Self {
        if class == 1 {
            RiskLabel::High
        } else {
            RiskLabel::Low
        }
    }

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::High => "high",
            RiskLabel::Low => "low",
        }
    }
}

impl std::fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a `POST /predict` response.
///
/// Serialises as either `{"risk": "high"}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictOutcome {
    /// The pipeline produced a label.
    Success {
        /// Predicted label
        risk: RiskLabel,
    },
    /// Something in the pipeline failed.
    Failure {
        /// Error description
        error: String,
    },
}

impl PredictOutcome {
    /// Whether the pipeline succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, PredictOutcome::Success { .. })
    }

    /// Label, if any.
    pub fn risk(&self) -> Option<RiskLabel> {
        match self {
            PredictOutcome::Success { risk } => Some(*risk),
            PredictOutcome::Failure { .. } => None,
        }
    }
}

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthMessage {
    /// Fixed greeting
    pub message: String,
}
