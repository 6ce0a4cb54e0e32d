//! Prediction service: encode → scale → predict → respond.
//!
//! Every request is independent. The only shared state is the read-only
//! [`ArtifactStore`], injected at construction.

use crate::artifacts::ArtifactStore;
use crate::encoder;
use crate::error::{ServingError, ServingResult};
use crate::record::{HealthMessage, PatientRecord, PredictOutcome, RiskLabel};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Greeting returned by the health check.
pub const HEALTH_MESSAGE: &str = "Cancer Risk Predictor API is running";

/// Request handler logic behind the HTTP endpoints.
///
/// # Example
///
/// ```no_run
/// use oncorisk_serving::artifacts::ArtifactStore;
/// use oncorisk_serving::config::ArtifactConfig;
/// use oncorisk_serving::record::PatientRecord;
/// use oncorisk_serving::service::PredictionService;
/// use std::sync::Arc;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(ArtifactStore::load(&ArtifactConfig::default())?);
/// let service = PredictionService::new(store);
///
/// let record = PatientRecord {
///     age: 45,
///     gender: "Male".to_string(),
///     bmi: 27.3,
///     smoking: "Yes".to_string(),
///     genetic_risk: "No".to_string(),
///     activity: 3,
///     alcohol_intake: 2,
///     cancer_history: "No".to_string(),
/// };
/// println!("{:?}", service.handle_predict(&record));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PredictionService {
    store: Arc<ArtifactStore>,
}

impl PredictionService {
    /// Create a service over loaded artifacts.
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self { store }
    }

    /// The artifacts this service predicts with.
    pub fn store(&self) -> &Arc<ArtifactStore> {
        &self.store
    }

    /// Run the pipeline and return the label or the first error.
    pub fn predict(&self, record: &PatientRecord) -> ServingResult<RiskLabel> {
        let features = encoder::encode(record);
        debug!("Encoded features: {:?}", features.as_slice());

        let row = features.to_row();
        let scaled = self.store.transform(row.view())?;
        let classes = self.store.predict(scaled.view())?;
        let class = classes
            .first()
            .copied()
            .ok_or_else(|| ServingError::prediction("classifier returned no output"))?;

        Ok(RiskLabel::from_class(class))
    }

    /// Handle a prediction request.
    ///
    /// Never fails: any pipeline error is reported as
    /// [`PredictOutcome::Failure`] carrying the error message.
    pub fn handle_predict(&self, record: &PatientRecord) -> PredictOutcome {
        let start = Instant::now();
        let outcome = match self.predict(record) {
            Ok(risk) => PredictOutcome::Success { risk },
            Err(e) => {
                warn!("Prediction pipeline failed: {}", e);
                PredictOutcome::Failure {
                    error: e.to_string(),
                }
            }
        };
        debug!(
            "Prediction handled in {:.3}ms: {:?}",
            start.elapsed().as_secs_f64() * 1000.0,
            outcome
        );
        outcome
    }

    /// Liveness check. Has no dependencies and always succeeds.
    pub fn health_check(&self) -> HealthMessage {
        HealthMessage {
            message: HEALTH_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::{Classifier, Scaler};
    use ndarray::{Array2, ArrayView2};

    /// Identity scaler that accepts any width.
    struct PassThrough;

    impl Scaler for PassThrough {
        fn name(&self) -> &'static str {
            "PassThrough"
        }
        fn n_features(&self) -> Option<usize> {
            None
        }
        fn transform(&self, input: ArrayView2<'_, f64>) -> ServingResult<Array2<f64>> {
            Ok(input.to_owned())
        }
    }

    /// Returns 1 when the first column exceeds 40.
    struct AgeThreshold;

    impl Classifier for AgeThreshold {
        fn name(&self) -> &'static str {
            "AgeThreshold"
        }
        fn n_features(&self) -> Option<usize> {
            None
        }
        fn classes(&self) -> &[i64] {
            &[0, 1]
        }
        fn predict(&self, input: ArrayView2<'_, f64>) -> ServingResult<Vec<i64>> {
            Ok(input
                .rows()
                .into_iter()
                .map(|row| i64::from(row[0] > 40.0))
                .collect())
        }
    }

    /// Always returns the configured class.
    struct Constant(i64);

    impl Classifier for Constant {
        fn name(&self) -> &'static str {
            "Constant"
        }
        fn n_features(&self) -> Option<usize> {
            None
        }
        fn classes(&self) -> &[i64] {
            std::slice::from_ref(&self.0)
        }
        fn predict(&self, input: ArrayView2<'_, f64>) -> ServingResult<Vec<i64>> {
            Ok(vec![self.0; input.nrows()])
        }
    }

    /// Produces no output at all.
    struct Silent;

    impl Classifier for Silent {
        fn name(&self) -> &'static str {
            "Silent"
        }
        fn n_features(&self) -> Option<usize> {
            None
        }
        fn classes(&self) -> &[i64] {
            &[]
        }
        fn predict(&self, _input: ArrayView2<'_, f64>) -> ServingResult<Vec<i64>> {
            Ok(Vec::new())
        }
    }

    fn service_with(classifier: Arc<dyn Classifier>) -> PredictionService {
        let store = ArtifactStore::from_parts(Arc::new(PassThrough), classifier);
        PredictionService::new(Arc::new(store))
    }

    fn reference_record() -> PatientRecord {
        PatientRecord {
            age: 45,
            gender: "Male".to_string(),
            bmi: 27.3,
            smoking: "Yes".to_string(),
            genetic_risk: "No".to_string(),
            activity: 3,
            alcohol_intake: 2,
            cancer_history: "No".to_string(),
        }
    }

    #[test]
    fn test_reference_record_is_high_risk() {
        let service = service_with(Arc::new(AgeThreshold));
        assert_eq!(
            service.handle_predict(&reference_record()),
            PredictOutcome::Success {
                risk: RiskLabel::High
            }
        );
    }

    #[test]
    fn test_young_negative_record_is_low_risk() {
        let service = service_with(Arc::new(AgeThreshold));
        let record = PatientRecord {
            age: 25,
            gender: "Female".to_string(),
            smoking: "No".to_string(),
            genetic_risk: "No".to_string(),
            cancer_history: "No".to_string(),
            ..reference_record()
        };
        assert_eq!(service.predict(&record).unwrap(), RiskLabel::Low);
    }

    #[test]
    fn test_only_class_one_is_high() {
        assert_eq!(
            service_with(Arc::new(Constant(1)))
                .predict(&reference_record())
                .unwrap(),
            RiskLabel::High
        );
        for class in [0, 2, -1] {
            assert_eq!(
                service_with(Arc::new(Constant(class)))
                    .predict(&reference_record())
                    .unwrap(),
                RiskLabel::Low
            );
        }
    }

    #[test]
    fn test_shape_rejection_becomes_error_outcome() {
        let scaler = crate::artifacts::ScalerSpec::Standard(
            crate::artifacts::scaler::StandardScalerSpec {
                n_features_in: 5,
                mean: Some(vec![0.0; 5]),
                scale: Some(vec![1.0; 5]),
            },
        )
        .build()
        .unwrap();
        let store = ArtifactStore::from_parts(Arc::from(scaler), Arc::new(AgeThreshold));
        let service = PredictionService::new(Arc::new(store));

        let outcome = service.handle_predict(&reference_record());
        assert_eq!(
            outcome,
            PredictOutcome::Failure {
                error: "X has 8 features, but StandardScaler is expecting 5 features as input."
                    .to_string()
            }
        );
    }

    #[test]
    fn test_empty_classifier_output_becomes_error_outcome() {
        let service = service_with(Arc::new(Silent));
        let outcome = service.handle_predict(&reference_record());
        assert!(!outcome.is_success());
        assert!(matches!(
            service.predict(&reference_record()),
            Err(ServingError::Prediction(_))
        ));
    }

    #[test]
    fn test_health_check() {
        let service = service_with(Arc::new(Constant(0)));
        assert_eq!(
            service.health_check().message,
            "Cancer Risk Predictor API is running"
        );
    }
}
