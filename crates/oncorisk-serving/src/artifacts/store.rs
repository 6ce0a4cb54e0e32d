//! Process-wide holder for the fitted scaler and classifier.
//!
//! The [`ArtifactStore`] is built once during startup and then shared through
//! an `Arc`. It has no reload or unload path; both artifacts are immutable
//! for the lifetime of the process, so concurrent requests read them without
//! locking.

use super::{
    ArtifactFile, Classifier, ClassifierSpec, Scaler, ScalerSpec, ARTIFACT_FORMAT_VERSION,
};
use crate::config::ArtifactConfig;
use crate::error::{ServingError, ServingResult};
use crate::record::FEATURE_COUNT;
use ndarray::{Array2, ArrayView2};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Where a store's artifacts came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactSource {
    /// Loaded from files.
    Files {
        /// Scaler file
        scaler: PathBuf,
        /// Classifier file
        model: PathBuf,
    },
    /// Injected directly, e.g. in tests.
    InMemory,
}

/// Human-readable description of the loaded artifacts.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactSummary {
    /// Origin of the artifacts
    pub source: ArtifactSource,
    /// Scaler estimator name
    pub scaler: &'static str,
    /// Scaler fitted width
    pub scaler_features: Option<usize>,
    /// Classifier estimator name
    pub classifier: &'static str,
    /// Classifier fitted width
    pub classifier_features: Option<usize>,
    /// Classifier output classes
    pub classes: Vec<i64>,
    /// Number of sub-estimators (trees for a forest)
    pub estimators: usize,
}

/// The loaded scaler/classifier pair.
///
/// # Example
///
/// ```no_run
/// use oncorisk_serving::artifacts::ArtifactStore;
/// use oncorisk_serving::config::ArtifactConfig;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = ArtifactStore::load(&ArtifactConfig::default())?;
/// println!("{:?}", store.summary());
/// # Ok(())
/// # }
/// ```
pub struct ArtifactStore {
    scaler: Arc<dyn Scaler>,
    classifier: Arc<dyn Classifier>,
    source: ArtifactSource,
    loaded_at: Instant,
}

#[derive(Deserialize)]
struct VersionProbe {
    format_version: u32,
}

impl ArtifactStore {
    /// Load both artifacts from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if either file is missing, is not valid JSON, carries
    /// an unsupported format version, or describes an inconsistent estimator.
    /// Callers treat this as fatal.
    pub fn load(config: &ArtifactConfig) -> ServingResult<Self> {
        let scaler_path = config.scaler_path();
        let model_path = config.model_path();
        info!("Loading scaler from: {:?}", scaler_path);
        let scaler: ScalerSpec = read_artifact(&scaler_path)?;
        let scaler = scaler
            .build()
            .map_err(|e| ServingError::artifact_load(&scaler_path, e))?;

        info!("Loading classifier from: {:?}", model_path);
        let classifier: ClassifierSpec = read_artifact(&model_path)?;
        let classifier = classifier
            .build()
            .map_err(|e| ServingError::artifact_load(&model_path, e))?;

        let store = Self {
            scaler: Arc::from(scaler),
            classifier: Arc::from(classifier),
            source: ArtifactSource::Files {
                scaler: scaler_path,
                model: model_path,
            },
            loaded_at: Instant::now(),
        };
        store.warn_on_width_mismatch();
        info!(
            "Artifacts loaded: {} + {} ({} estimators)",
            store.scaler.name(),
            store.classifier.name(),
            store.classifier.estimator_count()
        );
        Ok(store)
    }

    /// Build a store from already-fitted parts.
    pub fn from_parts(scaler: Arc<dyn Scaler>, classifier: Arc<dyn Classifier>) -> Self {
        let store = Self {
            scaler,
            classifier,
            source: ArtifactSource::InMemory,
            loaded_at: Instant::now(),
        };
        store.warn_on_width_mismatch();
        store
    }

    /// Apply the scaler.
    pub fn transform(&self, input: ArrayView2<'_, f64>) -> ServingResult<Array2<f64>> {
        self.scaler.transform(input)
    }

    /// Apply the classifier.
    pub fn predict(&self, input: ArrayView2<'_, f64>) -> ServingResult<Vec<i64>> {
        self.classifier.predict(input)
    }

    /// The fitted scaler.
    pub fn scaler(&self) -> &Arc<dyn Scaler> {
        &self.scaler
    }

    /// The fitted classifier.
    pub fn classifier(&self) -> &Arc<dyn Classifier> {
        &self.classifier
    }

    /// Time since the artifacts were loaded.
    pub fn age(&self) -> std::time::Duration {
        self.loaded_at.elapsed()
    }

    /// Describe the loaded artifacts.
    pub fn summary(&self) -> ArtifactSummary {
        ArtifactSummary {
            source: self.source.clone(),
            scaler: self.scaler.name(),
            scaler_features: self.scaler.n_features(),
            classifier: self.classifier.name(),
            classifier_features: self.classifier.n_features(),
            classes: self.classifier.classes().to_vec(),
            estimators: self.classifier.estimator_count(),
        }
    }

    // Width disagreements are surfaced per request as shape errors, not here.
    fn warn_on_width_mismatch(&self) {
        for (what, width) in [
            (self.scaler.name(), self.scaler.n_features()),
            (self.classifier.name(), self.classifier.n_features()),
        ] {
            if let Some(width) = width {
                if width != FEATURE_COUNT {
                    warn!(
                        "{} was fitted on {} features, encoder produces {}",
                        what, width, FEATURE_COUNT
                    );
                }
            }
        }
    }
}

impl std::fmt::Debug for ArtifactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactStore")
            .field("scaler", &self.scaler.name())
            .field("classifier", &self.classifier.name())
            .field("source", &self.source)
            .field("loaded_at", &self.loaded_at)
            .finish()
    }
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> ServingResult<T> {
    let raw = std::fs::read_to_string(path).map_err(|e| ServingError::artifact_load(path, e))?;
    debug!("Read {} bytes from {:?}", raw.len(), path);

    let probe: VersionProbe =
        serde_json::from_str(&raw).map_err(|e| ServingError::artifact_load(path, e))?;
    if probe.format_version != ARTIFACT_FORMAT_VERSION {
        return Err(ServingError::ArtifactVersion {
            path: path.to_path_buf(),
            found: probe.format_version,
            expected: ARTIFACT_FORMAT_VERSION,
        });
    }

    let file: ArtifactFile<T> =
        serde_json::from_str(&raw).map_err(|e| ServingError::artifact_load(path, e))?;
    Ok(file.artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::classifier::{DecisionTreeSpec, TreeNode};
    use crate::artifacts::scaler::IdentityScaler;
    use ndarray::array;
    use serde_json::json;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, value: serde_json::Value) {
        std::fs::write(dir.join(name), serde_json::to_vec(&value).unwrap()).unwrap();
    }

    fn scaler_json() -> serde_json::Value {
        json!({
            "format_version": 1,
            "artifact": {
                "type": "standard",
                "n_features_in": 8,
                "mean": [50.0, 0.5, 25.0, 0.3, 0.2, 5.0, 2.5, 0.1],
                "scale": [15.0, 0.5, 4.0, 0.46, 0.4, 2.9, 1.4, 0.3]
            }
        })
    }

    fn model_json() -> serde_json::Value {
        json!({
            "format_version": 1,
            "artifact": {
                "type": "random_forest",
                "classes": [0, 1],
                "n_features": 8,
                "trees": [
                    {"nodes": [
                        {"feature": 0, "threshold": 0.0, "left": 1, "right": 2},
                        {"value": [30.0, 5.0]},
                        {"value": [4.0, 20.0]}
                    ]},
                    {"nodes": [
                        {"feature": 3, "threshold": 0.5, "left": 1, "right": 2},
                        {"value": [25.0, 10.0]},
                        {"value": [6.0, 18.0]}
                    ]}
                ]
            }
        })
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempdir().unwrap();
        write(dir.path(), "final_scaler.json", scaler_json());
        write(dir.path(), "final_rf_model.json", model_json());

        let store = ArtifactStore::load(&ArtifactConfig::in_dir(dir.path())).unwrap();
        let summary = store.summary();
        assert_eq!(summary.scaler, "StandardScaler");
        assert_eq!(summary.classifier, "RandomForestClassifier");
        assert_eq!(summary.estimators, 2);
        assert_eq!(summary.classes, vec![0, 1]);
        assert!(matches!(summary.source, ArtifactSource::Files { .. }));

        let scaled = store
            .transform(array![[65.0, 1.0, 29.0, 1.0, 0.0, 3.0, 2.0, 0.0]].view())
            .unwrap();
        assert_eq!(scaled[[0, 0]], 1.0);
        assert_eq!(store.predict(scaled.view()).unwrap(), vec![1]);
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let dir = tempdir().unwrap();
        write(dir.path(), "final_scaler.json", scaler_json());

        let err = ArtifactStore::load(&ArtifactConfig::in_dir(dir.path())).unwrap_err();
        match err {
            ServingError::ArtifactLoad { path, .. } => {
                assert!(path.ends_with("final_rf_model.json"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_corrupt_file_is_load_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("final_scaler.json"), b"\x80\x04\x95pickle").unwrap();
        write(dir.path(), "final_rf_model.json", model_json());

        let err = ArtifactStore::load(&ArtifactConfig::in_dir(dir.path())).unwrap_err();
        assert!(matches!(err, ServingError::ArtifactLoad { .. }));
        assert!(err.is_startup_error());
    }

    #[test]
    fn test_unsupported_version() {
        let dir = tempdir().unwrap();
        let mut scaler = scaler_json();
        scaler["format_version"] = json!(7);
        write(dir.path(), "final_scaler.json", scaler);
        write(dir.path(), "final_rf_model.json", model_json());

        let err = ArtifactStore::load(&ArtifactConfig::in_dir(dir.path())).unwrap_err();
        assert!(matches!(
            err,
            ServingError::ArtifactVersion {
                found: 7,
                expected: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_inconsistent_artifact_is_load_error() {
        let dir = tempdir().unwrap();
        write(dir.path(), "final_scaler.json", scaler_json());
        let mut model = model_json();
        model["artifact"]["classes"] = json!([]);
        write(dir.path(), "final_rf_model.json", model);

        let err = ArtifactStore::load(&ArtifactConfig::in_dir(dir.path())).unwrap_err();
        assert!(err.to_string().contains("no classes"));
    }

    #[test]
    fn test_custom_file_names() {
        let dir = tempdir().unwrap();
        write(dir.path(), "scaler-v2.json", scaler_json());
        write(dir.path(), "forest-v2.json", model_json());

        let config = ArtifactConfig {
            dir: dir.path().to_path_buf(),
            scaler_file: "scaler-v2.json".to_string(),
            model_file: "forest-v2.json".to_string(),
        };
        assert!(ArtifactStore::load(&config).is_ok());
    }

    #[test]
    fn test_from_parts_is_in_memory() {
        let tree = ClassifierSpec::DecisionTree(DecisionTreeSpec {
            classes: vec![0, 1],
            n_features: 8,
            nodes: vec![TreeNode::Leaf {
                value: vec![1.0, 0.0],
            }],
        })
        .build()
        .unwrap();
        let store =
            ArtifactStore::from_parts(Arc::new(IdentityScaler::new(None)), Arc::from(tree));
        assert_eq!(store.summary().source, ArtifactSource::InMemory);
        assert_eq!(store.summary().scaler_features, None);
        assert!(format!("{store:?}").contains("IdentityScaler"));
    }
}
