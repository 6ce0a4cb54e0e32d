//! Patient record to feature vector encoding.
//!
//! The output order is fixed by [`FEATURE_NAMES`](crate::record::FEATURE_NAMES)
//! and must match the column order the artifacts were fitted on. Nothing at
//! runtime can verify that.
//!
//! Categorical fields use an exact-match policy: the one designated positive
//! string maps to `1.0`, every other string maps to `0.0`. Unrecognised,
//! misspelled or differently-cased values are absorbed into the negative class
//! rather than rejected.

use crate::record::{FeatureVector, PatientRecord};

/// Positive value for `gender`.
pub const POSITIVE_GENDER: &str = "Male";

/// Positive value for the yes/no fields.
pub const POSITIVE_ANSWER: &str = "Yes";

/// Map a categorical value to 0/1 against its positive string.
pub fn binary_flag(value: &str, positive: &str) -> f64 {
    match value {
        v if v == positive => 1.0,
        _ => 0.0,
    }
}

/// Encode a record into model input order.
pub fn encode(record: &PatientRecord) -> FeatureVector {
    FeatureVector::new([
        record.age as f64,
        binary_flag(&record.gender, POSITIVE_GENDER),
        record.bmi,
        binary_flag(&record.smoking, POSITIVE_ANSWER),
        binary_flag(&record.genetic_risk, POSITIVE_ANSWER),
        record.activity as f64,
        record.alcohol_intake as f64,
        binary_flag(&record.cancer_history, POSITIVE_ANSWER),
    ])
}
