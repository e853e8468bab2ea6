//! Decision Arbiter
//!
//! ML-first crop selection with deterministic rule fallback. The
//! classifier runs inside a failure boundary that yields an explicit
//! outcome; the arbiter consumes it by exhaustive match and always
//! produces a Decision, never an error.

use crate::classifier::{CropPredictor, Prediction};
use crate::features::{ClimateSample, FeatureVector, SoilSample};
use serde::Serialize;
use std::sync::Arc;

/// Cutoff below which the classifier's crop is discarded for the rule.
pub const CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Provenance label for external consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    MlPrediction,
    RuleFallbackLowConfidence,
    RuleFallbackError,
}

/// Which code path produced the decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    MlPrediction,
    LowConfidenceFallback,
    MlErrorFallback,
}

/// One arbitrated crop decision. Immutable once built; the diagnostic
/// field carries the swallowed failure for logging only and is never
/// serialized to callers.
#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    pub crop: String,
    pub confidence: f64,
    pub source: DecisionSource,
    pub reason: DecisionReason,
    pub model_version: String,
    #[serde(skip)]
    pub diagnostic: Option<String>,
}

/// Outcome of the classifier boundary: either a scored prediction or
/// the failure text, no recoverable error escapes past this point.
#[derive(Debug)]
pub enum ClassifierOutcome {
    Scored(Prediction),
    Failed(String),
}

/// Deterministic pH rule used whenever the classifier cannot be
/// trusted. Boundary is inclusive: pH exactly 6.0 selects Wheat.
/// A missing pH reading selects Millet.
pub fn rule_fallback_crop(soil_ph: Option<f64>) -> &'static str {
    match soil_ph {
        Some(ph) if ph >= 6.0 => "Wheat",
        _ => "Millet",
    }
}

/// Arbitrates between classifier output and the deterministic rule
pub struct DecisionArbiter {
    classifier: Option<Arc<dyn CropPredictor>>,
    threshold: f64,
}

impl DecisionArbiter {
    pub fn new(classifier: Option<Arc<dyn CropPredictor>>) -> Self {
        Self {
            classifier,
            threshold: CONFIDENCE_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Decide a crop for one request.
    ///
    /// `last_crop` is accepted as a rotation-aware extension point; the
    /// current rule does not consult it.
    pub fn decide(
        &self,
        soil: &SoilSample,
        climate: &ClimateSample,
        last_crop: Option<&str>,
    ) -> Decision {
        let _ = last_crop;

        let outcome = self.run_classifier(soil, climate);

        match outcome {
            ClassifierOutcome::Scored(prediction) if prediction.confidence >= self.threshold => {
                Decision {
                    crop: prediction.crop,
                    confidence: prediction.confidence,
                    source: DecisionSource::MlPrediction,
                    reason: DecisionReason::MlPrediction,
                    model_version: prediction.model_version,
                    diagnostic: None,
                }
            }
            ClassifierOutcome::Scored(prediction) => {
                tracing::debug!(
                    confidence = prediction.confidence,
                    threshold = self.threshold,
                    discarded = %prediction.crop,
                    "classifier confidence below threshold, applying pH rule"
                );
                Decision {
                    crop: rule_fallback_crop(soil.ph).to_string(),
                    // Low classifier confidence is reported as-is, not
                    // reset
                    confidence: prediction.confidence,
                    source: DecisionSource::RuleFallbackLowConfidence,
                    reason: DecisionReason::LowConfidenceFallback,
                    model_version: prediction.model_version,
                    diagnostic: None,
                }
            }
            ClassifierOutcome::Failed(error) => {
                tracing::warn!(%error, "classifier unavailable, applying pH rule");
                Decision {
                    crop: rule_fallback_crop(soil.ph).to_string(),
                    confidence: 0.0,
                    source: DecisionSource::RuleFallbackError,
                    reason: DecisionReason::MlErrorFallback,
                    model_version: "unknown".to_string(),
                    diagnostic: Some(error),
                }
            }
        }
    }

    /// Failure boundary around feature building and prediction. Single
    /// attempt, no retry: this sits on a synchronous request path.
    fn run_classifier(&self, soil: &SoilSample, climate: &ClimateSample) -> ClassifierOutcome {
        let classifier = match &self.classifier {
            Some(c) => c,
            None => return ClassifierOutcome::Failed("classifier not loaded".to_string()),
        };

        let features = match FeatureVector::build(soil, climate) {
            Ok(fv) => fv,
            Err(e) => return ClassifierOutcome::Failed(e.to_string()),
        };

        match classifier.predict(&features) {
            Ok(prediction) => ClassifierOutcome::Scored(prediction),
            Err(e) => ClassifierOutcome::Failed(e.to_string()),
        }
    }
}
