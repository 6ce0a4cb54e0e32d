//! Fitted feature scalers.

use super::{check_columns, check_finite};
use crate::error::{ServingError, ServingResult};
use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// A fitted numeric transform applied before classification.
pub trait Scaler: Send + Sync {
    /// Estimator name used in error messages.
    fn name(&self) -> &'static str;

    /// Number of columns the scaler was fitted on, if known.
    fn n_features(&self) -> Option<usize>;

    /// Transform a `(rows, features)` matrix.
    fn transform(&self, input: ArrayView2<'_, f64>) -> ServingResult<Array2<f64>>;
}

/// Serialized scaler body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScalerSpec {
    /// Standardisation: `(x - mean) / scale`.
    Standard(StandardScalerSpec),
    /// Range scaling: `x * scale + min`.
    MinMax(MinMaxScalerSpec),
    /// Pass-through.
    Identity(IdentityScalerSpec),
}

/// Serialized standardisation scaler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScalerSpec {
    /// Fitted feature count
    pub n_features_in: usize,
    /// Per-feature mean; absent when fitted with `with_mean=False`
    #[serde(default)]
    pub mean: Option<Vec<f64>>,
    /// Per-feature scale; absent when fitted with `with_std=False`
    #[serde(default)]
    pub scale: Option<Vec<f64>>,
}

/// Serialized min-max scaler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinMaxScalerSpec {
    /// Fitted feature count
    pub n_features_in: usize,
    /// Per-feature offset
    pub min: Vec<f64>,
    /// Per-feature multiplier
    pub scale: Vec<f64>,
}

/// Serialized pass-through scaler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityScalerSpec {
    /// Enforced column count, if any
    #[serde(default)]
    pub n_features: Option<usize>,
}

impl ScalerSpec {
    /// Identity spec, optionally pinned to a feature count.
    pub fn identity(n_features: Option<usize>) -> Self {
        ScalerSpec::Identity(IdentityScalerSpec { n_features })
    }

    /// Validate the spec and build the fitted scaler.
    pub fn build(self) -> ServingResult<Box<dyn Scaler>> {
        match self {
            ScalerSpec::Standard(s) => Ok(Box::new(StandardScaler::from_spec(s)?)),
            ScalerSpec::MinMax(s) => Ok(Box::new(MinMaxScaler::from_spec(s)?)),
            ScalerSpec::Identity(s) => Ok(Box::new(IdentityScaler::new(s.n_features))),
        }
    }
}

fn fitted_vector(
    estimator: &str,
    field: &str,
    values: Vec<f64>,
    n_features: usize,
) -> ServingResult<Array1<f64>> {
    if values.len() != n_features {
        return Err(ServingError::invalid_artifact(format!(
            "{estimator}.{field} has {} entries, expected {n_features}",
            values.len()
        )));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ServingError::invalid_artifact(format!(
            "{estimator}.{field} contains non-finite values"
        )));
    }
    Ok(Array1::from(values))
}

fn nonzero_scale(estimator: &str, scale: &Array1<f64>) -> ServingResult<()> {
    if scale.iter().any(|v| *v == 0.0) {
        return Err(ServingError::invalid_artifact(format!(
            "{estimator}.scale contains zero entries"
        )));
    }
    Ok(())
}

/// Fitted standardisation scaler.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    n_features: usize,
    mean: Option<Array1<f64>>,
    scale: Option<Array1<f64>>,
}

impl StandardScaler {
    const NAME: &'static str = "StandardScaler";

    /// Build from a serialized spec.
    pub fn from_spec(spec: StandardScalerSpec) -> ServingResult<Self> {
        let n = spec.n_features_in;
        if n == 0 {
            return Err(ServingError::invalid_artifact(
                "StandardScaler.n_features_in must be positive",
            ));
        }
        let mean = spec
            .mean
            .map(|m| fitted_vector(Self::NAME, "mean", m, n))
            .transpose()?;
        let scale = spec
            .scale
            .map(|s| fitted_vector(Self::NAME, "scale", s, n))
            .transpose()?;
        if let Some(scale) = &scale {
            nonzero_scale(Self::NAME, scale)?;
        }
        Ok(Self {
            n_features: n,
            mean,
            scale,
        })
    }
}

impl Scaler for StandardScaler {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.n_features)
    }

    fn transform(&self, input: ArrayView2<'_, f64>) -> ServingResult<Array2<f64>> {
        check_columns(Self::NAME, Some(self.n_features), &input)?;
        check_finite(&input)?;
        let mut out = input.to_owned();
        if let Some(mean) = &self.mean {
            out -= mean;
        }
        if let Some(scale) = &self.scale {
            out /= scale;
        }
        Ok(out)
    }
}

/// Fitted min-max scaler.
#[derive(Debug, Clone)]
pub struct MinMaxScaler {
    min: Array1<f64>,
    scale: Array1<f64>,
}

impl MinMaxScaler {
    const NAME: &'static str = "MinMaxScaler";

    /// Build from a serialized spec.
    pub fn from_spec(spec: MinMaxScalerSpec) -> ServingResult<Self> {
        let n = spec.n_features_in;
        if n == 0 {
            return Err(ServingError::invalid_artifact(
                "MinMaxScaler.n_features_in must be positive",
            ));
        }
        let min = fitted_vector(Self::NAME, "min", spec.min, n)?;
        let scale = fitted_vector(Self::NAME, "scale", spec.scale, n)?;
        nonzero_scale(Self::NAME, &scale)?;
        Ok(Self { min, scale })
    }
}

impl Scaler for MinMaxScaler {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.min.len())
    }

    fn transform(&self, input: ArrayView2<'_, f64>) -> ServingResult<Array2<f64>> {
        check_columns(Self::NAME, Some(self.min.len()), &input)?;
        check_finite(&input)?;
        let mut out = &input * &self.scale;
        out += &self.min;
        Ok(out)
    }
}

/// Scaler that returns its input unchanged.
#[derive(Debug, Clone, Default)]
pub struct IdentityScaler {
    n_features: Option<usize>,
}

impl IdentityScaler {
    /// Identity scaler, optionally enforcing a column count.
    pub fn new(n_features: Option<usize>) -> Self {
        Self { n_features }
    }
}

impl Scaler for IdentityScaler {
    fn name(&self) -> &'static str {
        "IdentityScaler"
    }

    fn n_features(&self) -> Option<usize> {
        self.n_features
    }

    fn transform(&self, input: ArrayView2<'_, f64>) -> ServingResult<Array2<f64>> {
        check_columns(self.name(), self.n_features, &input)?;
        check_finite(&input)?;
        Ok(input.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use serde_json::json;

    fn standard(mean: Vec<f64>, scale: Vec<f64>) -> Box<dyn Scaler> {
        ScalerSpec::Standard(StandardScalerSpec {
            n_features_in: mean.len(),
            mean: Some(mean),
            scale: Some(scale),
        })
        .build()
        .unwrap()
    }

    #[test]
    fn test_standard_scaler_transform() {
        let scaler = standard(vec![10.0, 0.5, 2.0], vec![2.0, 0.5, 4.0]);
        let out = scaler.transform(array![[14.0, 1.0, 2.0]].view()).unwrap();
        assert_eq!(out, array![[2.0, 1.0, 0.0]]);
    }

    #[test]
    fn test_standard_scaler_multiple_rows() {
        let scaler = standard(vec![1.0, 1.0], vec![1.0, 2.0]);
        let out = scaler
            .transform(array![[1.0, 1.0], [3.0, 5.0]].view())
            .unwrap();
        assert_eq!(out, array![[0.0, 0.0], [2.0, 2.0]]);
    }

    #[test]
    fn test_standard_scaler_without_mean() {
        let scaler = ScalerSpec::Standard(StandardScalerSpec {
            n_features_in: 2,
            mean: None,
            scale: Some(vec![2.0, 4.0]),
        })
        .build()
        .unwrap();
        let out = scaler.transform(array![[2.0, 2.0]].view()).unwrap();
        assert_eq!(out, array![[1.0, 0.5]]);
    }

    #[test]
    fn test_standard_scaler_rejects_wrong_width() {
        let scaler = standard(vec![0.0; 8], vec![1.0; 8]);
        let err = scaler
            .transform(array![[1.0, 2.0, 3.0, 4.0, 5.0]].view())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "X has 5 features, but StandardScaler is expecting 8 features as input."
        );
    }

    #[test]
    fn test_spec_validation() {
        let mismatched = ScalerSpec::Standard(StandardScalerSpec {
            n_features_in: 3,
            mean: Some(vec![0.0, 0.0]),
            scale: None,
        });
        assert!(matches!(
            mismatched.build(),
            Err(ServingError::InvalidArtifact(_))
        ));

        let zero_scale = ScalerSpec::Standard(StandardScalerSpec {
            n_features_in: 2,
            mean: None,
            scale: Some(vec![1.0, 0.0]),
        });
        assert!(zero_scale.build().is_err());

        let empty = ScalerSpec::MinMax(MinMaxScalerSpec {
            n_features_in: 0,
            min: vec![],
            scale: vec![],
        });
        assert!(empty.build().is_err());

        let zero_range = ScalerSpec::MinMax(MinMaxScalerSpec {
            n_features_in: 2,
            min: vec![0.0, 0.0],
            scale: vec![0.5, 0.0],
        });
        assert!(matches!(
            zero_range.build(),
            Err(ServingError::InvalidArtifact(_))
        ));
    }

    #[test]
    fn test_min_max_scaler() {
        let scaler = ScalerSpec::MinMax(MinMaxScalerSpec {
            n_features_in: 2,
            min: vec![-1.0, 0.0],
            scale: vec![0.5, 0.1],
        })
        .build()
        .unwrap();
        let out = scaler.transform(array![[4.0, 10.0]].view()).unwrap();
        assert_eq!(out, array![[1.0, 1.0]]);
        assert_eq!(scaler.n_features(), Some(2));
    }

    #[test]
    fn test_identity_scaler() {
        let scaler = ScalerSpec::identity(None).build().unwrap();
        let input = array![[45.0, 1.0, 27.3]];
        assert_eq!(scaler.transform(input.view()).unwrap(), input);

        let pinned = IdentityScaler::new(Some(8));
        assert!(pinned.transform(input.view()).is_err());
    }

    #[test]
    fn test_spec_from_json() {
        let spec: ScalerSpec = serde_json::from_value(json!({
            "type": "standard",
            "n_features_in": 2,
            "mean": [1.0, 2.0],
            "scale": [1.0, 1.0]
        }))
        .unwrap();
        assert!(matches!(spec, ScalerSpec::Standard(_)));

        let spec: ScalerSpec = serde_json::from_value(json!({"type": "identity"})).unwrap();
        assert!(matches!(
            spec,
            ScalerSpec::Identity(IdentityScalerSpec { n_features: None })
        ));

        assert!(serde_json::from_value::<ScalerSpec>(json!({"type": "robust"})).is_err());
    }
}
