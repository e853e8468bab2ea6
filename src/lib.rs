//! Crop Advisor Rust Implementation
//!
//! Decision pipeline for crop recommendations: soil/climate
//! measurements in, recommended crop with localized explanation and
//! per-session history out.
//!
//! - `features`: ordered feature vector construction
//! - `classifier`: trained-artifact adapter with cached load
//! - `decision`: ML-first arbitration with deterministic pH fallback
//! - `explanation`: localized templates plus best-effort LLM polish
//! - `history`: bounded per-session recommendation ledger
//! - `llm`: multilingual text-generation wrapper
//! - `service`: pipeline orchestration and response assembly
//!
//! Transport, validation, and model training live outside this crate.

pub mod classifier;
pub mod decision;
pub mod explanation;
pub mod features;
pub mod history;
pub mod llm;
pub mod service;

// Re-export commonly used types
pub use classifier::{
    ArtifactLoader, ClassifierError, CropClassifier, CropPredictor, JsonArtifactLoader,
    ModelArtifact, Prediction,
};
pub use decision::{
    rule_fallback_crop, ClassifierOutcome, Decision, DecisionArbiter, DecisionReason,
    DecisionSource, CONFIDENCE_THRESHOLD,
};
pub use explanation::{compose_explanation, ComposedExplanation, PolishOutcome};
pub use features::{ClimateSample, FeatureError, FeatureVector, SoilSample, FEATURE_ORDER};
pub use history::{HistoryEntry, SessionHistoryLedger, DEFAULT_HISTORY_CAP};
pub use llm::{
    Language, LlmError, OfflineBackend, TextGeneration, TextService, DEFAULT_COMPLETION_TIMEOUT,
};
pub use service::{
    Recommendation, RecommendationResponse, RecommendationService, RecommendRequest, SystemStatus,
};
