//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::path::Path;

/// Standard scaler fitted on the eight encoded features.
pub fn scaler_artifact() -> Value {
    json!({
        "format_version": 1,
        "artifact": {
            "type": "standard",
            "n_features_in": 8,
            "mean": [40.0, 0.5, 25.0, 0.5, 0.5, 5.0, 2.5, 0.5],
            "scale": [10.0, 0.5, 5.0, 0.5, 0.5, 3.0, 1.5, 0.5]
        }
    })
}

/// Two-tree forest: one tree splits on scaled age, the other on smoking.
pub fn forest_artifact() -> Value {
    json!({
        "format_version": 1,
        "artifact": {
            "type": "random_forest",
            "classes": [0, 1],
            "n_features": 8,
            "trees": [
                {"nodes": [
                    {"feature": 0, "threshold": 0.0, "left": 1, "right": 2},
                    {"value": [0.9, 0.1]},
                    {"value": [0.2, 0.8]}
                ]},
                {"nodes": [
                    {"feature": 3, "threshold": 0.0, "left": 1, "right": 2},
                    {"value": [0.7, 0.3]},
                    {"value": [0.3, 0.7]}
                ]}
            ]
        }
    })
}

/// Scaler fitted on five columns, which the encoder never produces.
pub fn narrow_scaler_artifact() -> Value {
    json!({
        "format_version": 1,
        "artifact": {
            "type": "standard",
            "n_features_in": 5,
            "mean": [0.0, 0.0, 0.0, 0.0, 0.0],
            "scale": [1.0, 1.0, 1.0, 1.0, 1.0]
        }
    })
}

/// Write both artifacts under their default names.
pub fn write_artifacts(dir: &Path, scaler: &Value, model: &Value) {
    std::fs::write(dir.join("final_scaler.json"), scaler.to_string()).unwrap();
    std::fs::write(dir.join("final_rf_model.json"), model.to_string()).unwrap();
}

/// The 45-year-old male smoker used throughout.
pub fn reference_body() -> Value {
    json!({
        "age": 45,
        "gender": "Male",
        "bmi": 27.3,
        "smoking": "Yes",
        "genetic_risk": "No",
        "activity": 3,
        "alcohol_intake": 2,
        "cancer_history": "No"
    })
}

/// A young non-smoking female with no risk factors.
pub fn low_risk_body() -> Value {
    json!({
        "age": 25,
        "gender": "Female",
        "bmi": 21.0,
        "smoking": "No",
        "genetic_risk": "No",
        "activity": 8,
        "alcohol_intake": 0,
        "cancer_history": "No"
    })
}
