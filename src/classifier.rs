//! Crop Classifier Adapter
//!
//! Wraps the trained crop-suitability model behind a small prediction
//! interface. The trained artifact (class labels, standardization
//! parameters, per-class centroids, declared feature order, recorded
//! version/accuracy) is loaded eagerly at construction and cached for
//! the life of the adapter; a process-wide shared instance is guarded
//! by a single-init lock so concurrent startup never double-loads.

use crate::features::{FeatureVector, FEATURE_ORDER};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

/// Errors from artifact loading and prediction
#[derive(Debug, Clone, Error)]
pub enum ClassifierError {
    #[error("model artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("model artifact corrupt: {0}")]
    ArtifactCorrupt(String),

    #[error("prediction failed: {0}")]
    Prediction(String),
}

/// One scored prediction from the classifier
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub crop: String,
    /// Maximum class probability from the scored output, in [0, 1].
    pub confidence: f64,
    pub model_version: String,
    /// Hold-out accuracy recorded by the trainer, if available.
    pub accuracy: Option<f64>,
}

/// Trained artifact as written by the trainer.
///
/// The model is a nearest-centroid classifier over standardized
/// features; class scores are a softmax over negative distances, so the
/// top class probability doubles as a calibrated confidence.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelArtifact {
    pub version: String,
    pub accuracy: Option<f64>,
    pub feature_order: Vec<String>,
    pub feature_means: Vec<f64>,
    pub feature_stds: Vec<f64>,
    pub classes: Vec<String>,
    pub centroids: Vec<Vec<f64>>,
}

impl ModelArtifact {
    /// Structural validation run once at load time.
    fn validate(&self) -> Result<(), ClassifierError> {
        let n = self.feature_order.len();

        if self.classes.is_empty() {
            return Err(ClassifierError::ArtifactCorrupt(
                "artifact declares no classes".to_string(),
            ));
        }
        if self.centroids.len() != self.classes.len() {
            return Err(ClassifierError::ArtifactCorrupt(format!(
                "{} centroids for {} classes",
                self.centroids.len(),
                self.classes.len()
            )));
        }
        if self.feature_means.len() != n || self.feature_stds.len() != n {
            return Err(ClassifierError::ArtifactCorrupt(
                "standardization parameters do not match feature order".to_string(),
            ));
        }
        if let Some(row) = self.centroids.iter().find(|row| row.len() != n) {
            return Err(ClassifierError::ArtifactCorrupt(format!(
                "centroid has {} values for {} features",
                row.len(),
                n
            )));
        }
        if self.feature_stds.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(ClassifierError::ArtifactCorrupt(
                "feature stds must be finite and positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Source of trained artifacts (filesystem in production, fixtures in
/// tests)
pub trait ArtifactLoader {
    fn load(&self) -> Result<ModelArtifact, ClassifierError>;
}

/// Loads a JSON artifact file from disk
#[derive(Debug, Clone)]
pub struct JsonArtifactLoader {
    path: PathBuf,
}

impl JsonArtifactLoader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ArtifactLoader for JsonArtifactLoader {
    fn load(&self) -> Result<ModelArtifact, ClassifierError> {
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            ClassifierError::ArtifactNotFound(format!("{}: {}", self.path.display(), e))
        })?;

        serde_json::from_str(&contents)
            .map_err(|e| ClassifierError::ArtifactCorrupt(format!("{}: {}", self.path.display(), e)))
    }
}

/// Prediction seam consumed by the decision arbiter
pub trait CropPredictor: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<Prediction, ClassifierError>;

    fn model_version(&self) -> &str;
}

/// Classifier adapter holding the cached artifact
#[derive(Debug)]
pub struct CropClassifier {
    artifact: ModelArtifact,
}

impl CropClassifier {
    /// Load and validate the artifact eagerly. Missing or corrupt
    /// artifacts fail here, never later inside `predict`.
    pub fn new(loader: &dyn ArtifactLoader) -> Result<Self, ClassifierError> {
        let artifact = loader.load()?;
        artifact.validate()?;

        tracing::info!(
            version = %artifact.version,
            classes = artifact.classes.len(),
            "crop classifier artifact loaded"
        );

        Ok(Self { artifact })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        Self::new(&JsonArtifactLoader::new(path))
    }

    /// Process-wide shared adapter. The first caller's path wins; the
    /// load happens exactly once even under concurrent construction.
    pub fn shared(path: impl AsRef<Path>) -> Result<&'static Self, ClassifierError> {
        static SHARED: OnceLock<Result<CropClassifier, ClassifierError>> = OnceLock::new();

        SHARED
            .get_or_init(|| CropClassifier::from_path(path))
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn accuracy(&self) -> Option<f64> {
        self.artifact.accuracy
    }
}

impl CropPredictor for CropClassifier {
    /// Score the feature vector and return the top class with its
    /// probability.
    ///
    /// The vector's schema order must equal the order recorded in the
    /// artifact. Mismatched order would silently score the wrong
    /// columns, so equality is enforced, not just key presence.
    fn predict(&self, features: &FeatureVector) -> Result<Prediction, ClassifierError> {
        if self.artifact.feature_order != FEATURE_ORDER {
            return Err(ClassifierError::Prediction(format!(
                "artifact feature order {:?} does not match schema {:?}",
                self.artifact.feature_order, FEATURE_ORDER
            )));
        }

        let raw = features.as_slice();
        if raw.len() != self.artifact.feature_order.len() {
            return Err(ClassifierError::Prediction(format!(
                "expected {} features, got {}",
                self.artifact.feature_order.len(),
                raw.len()
            )));
        }
        if raw.iter().any(|v| !v.is_finite()) {
            return Err(ClassifierError::Prediction(
                "non-finite feature value".to_string(),
            ));
        }

        // Standardize, then Euclidean distance to each class centroid
        let standardized: Vec<f64> = raw
            .iter()
            .zip(&self.artifact.feature_means)
            .zip(&self.artifact.feature_stds)
            .map(|((v, mean), std)| (v - mean) / std)
            .collect();

        let distances: Vec<f64> = self
            .artifact
            .centroids
            .iter()
            .map(|c| {
                standardized
                    .iter()
                    .zip(c)
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum::<f64>()
                    .sqrt()
            })
            .collect();

        // Softmax over negative distances; shift by the minimum
        // distance for numerical stability
        let min_dist = distances.iter().copied().fold(f64::INFINITY, f64::min);
        let weights: Vec<f64> = distances.iter().map(|d| (-(d - min_dist)).exp()).collect();
        let total: f64 = weights.iter().sum();

        if !total.is_finite() || total <= 0.0 {
            return Err(ClassifierError::Prediction(
                "degenerate class scores".to_string(),
            ));
        }

        let (best_idx, best_weight) = weights
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .ok_or_else(|| ClassifierError::Prediction("no classes scored".to_string()))?;

        Ok(Prediction {
            crop: self.artifact.classes[best_idx].clone(),
            confidence: best_weight / total,
            model_version: self.artifact.version.clone(),
            accuracy: self.artifact.accuracy,
        })
    }

    fn model_version(&self) -> &str {
        &self.artifact.version
    }
}

impl CropPredictor for &'static CropClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<Prediction, ClassifierError> {
        <CropClassifier as CropPredictor>::predict(self, features)
    }

    fn model_version(&self) -> &str {
        <CropClassifier as CropPredictor>::model_version(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{ClimateSample, SoilSample};
    use approx::assert_relative_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn test_artifact_json(feature_order: &[&str]) -> String {
        serde_json::json!({
            "version": "crop-suitability-test.1",
            "accuracy": 0.93,
            "feature_order": feature_order,
            "feature_means": [50.0, 50.0, 50.0, 25.0, 70.0, 6.5, 150.0],
            "feature_stds": [20.0, 20.0, 20.0, 8.0, 15.0, 1.0, 80.0],
            "classes": ["Rice", "Wheat", "Millet"],
            "centroids": [
                [1.5, 0.5, 0.5, 0.8, 1.0, 0.2, 1.5],
                [-0.2, 0.1, 0.0, -0.5, -0.4, 0.4, -0.5],
                [-1.0, -0.6, -0.5, 0.5, -1.0, -1.2, -1.2]
            ]
        })
        .to_string()
    }

    fn write_artifact(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    fn features(ph: f64) -> FeatureVector {
        let soil = SoilSample {
            n: Some(80.0),
            p: Some(60.0),
            k: Some(60.0),
            ph: Some(ph),
        };
        let climate = ClimateSample {
            temperature: Some(30.0),
            humidity: Some(85.0),
            rainfall: Some(260.0),
        };
        FeatureVector::build(&soil, &climate).unwrap()
    }

    #[test]
    fn test_load_and_predict() {
        let file = write_artifact(&test_artifact_json(&FEATURE_ORDER));
        let classifier = CropClassifier::from_path(file.path()).unwrap();

        assert_eq!(classifier.model_version(), "crop-suitability-test.1");
        assert_relative_eq!(classifier.accuracy().unwrap(), 0.93);

        let prediction = classifier.predict(&features(6.8)).unwrap();
        // High-N, high-rainfall, humid input sits closest to the Rice
        // centroid
        assert_eq!(prediction.crop, "Rice");
        assert!(prediction.confidence > 0.0 && prediction.confidence <= 1.0);
    }

    #[test]
    fn test_confidence_is_max_class_probability() {
        let file = write_artifact(&test_artifact_json(&FEATURE_ORDER));
        let classifier = CropClassifier::from_path(file.path()).unwrap();

        let prediction = classifier.predict(&features(6.8)).unwrap();
        // Softmax over 3 classes: the winner holds at least 1/3 of the
        // probability mass
        assert!(prediction.confidence >= 1.0 / 3.0);
    }

    #[test]
    fn test_missing_artifact() {
        let err = CropClassifier::from_path("/nonexistent/model.json").unwrap_err();
        assert!(matches!(err, ClassifierError::ArtifactNotFound(_)));
    }

    #[test]
    fn test_corrupt_artifact() {
        let file = write_artifact("{ not json");
        let err = CropClassifier::from_path(file.path()).unwrap_err();
        assert!(matches!(err, ClassifierError::ArtifactCorrupt(_)));
    }

    #[test]
    fn test_centroid_shape_mismatch_is_corrupt() {
        let json = serde_json::json!({
            "version": "bad",
            "accuracy": null,
            "feature_order": FEATURE_ORDER,
            "feature_means": [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            "feature_stds": [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
            "classes": ["Rice", "Wheat"],
            "centroids": [[0.0, 0.0, 0.0]]
        })
        .to_string();

        let file = write_artifact(&json);
        let err = CropClassifier::from_path(file.path()).unwrap_err();
        assert!(matches!(err, ClassifierError::ArtifactCorrupt(_)));
    }

    #[test]
    fn test_feature_order_mismatch_fails_predict() {
        let shuffled = ["ph", "P", "K", "temperature", "humidity", "N", "rainfall"];
        let file = write_artifact(&test_artifact_json(&shuffled));
        let classifier = CropClassifier::from_path(file.path()).unwrap();

        let err = classifier.predict(&features(6.8)).unwrap_err();
        assert!(matches!(err, ClassifierError::Prediction(_)));
    }
}
