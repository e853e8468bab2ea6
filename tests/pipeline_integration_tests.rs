// Pipeline Integration Tests
//
// Purpose: Exercise the full recommendation pipeline end to end with a
// real artifact file on disk.
// Run with: cargo test --test pipeline_integration_tests

use crop_advisor_rust::{
    ClimateSample, CropClassifier, CropPredictor, DecisionReason, DecisionSource, Language,
    LlmError, OfflineBackend, RecommendRequest, RecommendationService, SessionHistoryLedger,
    SoilSample, TextGeneration, TextService, FEATURE_ORDER,
};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;

// =========================================================================
// Fixtures
// =========================================================================

/// Artifact whose Rice centroid sits exactly on the standardized sample
/// input, so the top-1 prediction is Rice with high confidence.
fn trained_artifact(feature_order: &[&str]) -> NamedTempFile {
    let json = serde_json::json!({
        "version": "crop-suitability-2024.2",
        "accuracy": 0.93,
        "feature_order": feature_order,
        "feature_means": [50.0, 50.0, 50.0, 25.0, 70.0, 6.5, 150.0],
        "feature_stds": [20.0, 20.0, 20.0, 8.0, 15.0, 1.0, 80.0],
        "classes": ["Rice", "Wheat", "Millet"],
        "centroids": [
            [-0.5, 0.0, -0.25, 0.0, -0.6666666666666666, 0.7, -0.375],
            [2.5, 3.0, -0.25, 0.0, -0.6666666666666666, 0.7, -0.375],
            [-3.5, -3.0, -0.25, 0.0, -0.6666666666666666, 0.7, -0.375]
        ]
    });

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.to_string().as_bytes()).unwrap();
    file
}

fn sample_request(lang: &str) -> RecommendRequest {
    RecommendRequest {
        soil: SoilSample {
            n: Some(40.0),
            p: Some(50.0),
            k: Some(45.0),
            ph: Some(7.2),
        },
        climate: ClimateSample {
            temperature: Some(25.0),
            humidity: Some(60.0),
            rainfall: Some(120.0),
        },
        last_crop: None,
        lang: Language::from_code(lang),
        session_id: Some("it-session".to_string()),
    }
}

fn service_from_artifact(file: &NamedTempFile) -> RecommendationService {
    let classifier = CropClassifier::from_path(file.path()).unwrap();
    RecommendationService::new(
        Some(Arc::new(classifier) as Arc<dyn CropPredictor>),
        TextService::new(Arc::new(OfflineBackend)),
        Arc::new(SessionHistoryLedger::default()),
    )
}

fn rule_only_service() -> RecommendationService {
    RecommendationService::new(
        None,
        TextService::new(Arc::new(OfflineBackend)),
        Arc::new(SessionHistoryLedger::default()),
    )
}

// =========================================================================
// Section 1: ML prediction path
// =========================================================================

#[test]
fn test_hindi_recommendation_with_trained_artifact() {
    let artifact = trained_artifact(&FEATURE_ORDER);
    let service = service_from_artifact(&artifact);

    let response = service.recommend(&sample_request("hi"));

    assert_eq!(response.recommendation.crop, "Rice");
    assert!(response.recommendation.confidence > 0.8);
    assert_eq!(response.reason, DecisionReason::MlPrediction);
    assert_eq!(response.source, DecisionSource::MlPrediction);
    assert_eq!(response.model_version, "crop-suitability-2024.2");

    // Hindi template sentences carrying the crop name
    assert!(response.explanation.contains("Rice"));
    assert!(response.explanation.contains("मिट्टी का pH 7.2"));
}

#[test]
fn test_unrecognized_language_falls_back_to_english() {
    let artifact = trained_artifact(&FEATURE_ORDER);
    let service = service_from_artifact(&artifact);

    let response = service.recommend(&sample_request("xx"));
    assert!(response.explanation.contains("Soil pH 7.2 is suitable for Rice."));
}

// =========================================================================
// Section 2: Rule fallback paths
// =========================================================================

#[test]
fn test_missing_classifier_falls_back_to_wheat() {
    let service = rule_only_service();
    let response = service.recommend(&sample_request("en"));

    // pH 7.2 >= 6.0
    assert_eq!(response.recommendation.crop, "Wheat");
    assert_eq!(response.recommendation.confidence, 0.0);
    assert_eq!(response.source, DecisionSource::RuleFallbackError);
    assert_eq!(response.reason, DecisionReason::MlErrorFallback);
    assert_eq!(response.model_version, "unknown");
}

#[test]
fn test_acidic_soil_rule_picks_millet() {
    let service = rule_only_service();
    let mut request = sample_request("en");
    request.soil.ph = Some(5.0);

    let response = service.recommend(&request);
    assert_eq!(response.recommendation.crop, "Millet");
}

#[test]
fn test_low_confidence_routes_to_rule_crop() {
    let artifact = trained_artifact(&FEATURE_ORDER);
    let classifier = CropClassifier::from_path(artifact.path()).unwrap();

    // Raise the threshold above anything the model can produce
    let service = RecommendationService::new(
        Some(Arc::new(classifier) as Arc<dyn CropPredictor>),
        TextService::new(Arc::new(OfflineBackend)),
        Arc::new(SessionHistoryLedger::default()),
    )
    .with_threshold(0.999);

    let response = service.recommend(&sample_request("en"));

    assert_eq!(response.recommendation.crop, "Wheat");
    assert!(response.recommendation.confidence > 0.0);
    assert_eq!(response.source, DecisionSource::RuleFallbackLowConfidence);
    assert_eq!(response.reason, DecisionReason::LowConfidenceFallback);
}

#[test]
fn test_mismatched_artifact_order_degrades_to_rule() {
    let shuffled = ["ph", "P", "K", "temperature", "humidity", "N", "rainfall"];
    let artifact = trained_artifact(&shuffled);
    let service = service_from_artifact(&artifact);

    let response = service.recommend(&sample_request("en"));

    assert_eq!(response.recommendation.crop, "Wheat");
    assert_eq!(response.reason, DecisionReason::MlErrorFallback);
}

// =========================================================================
// Section 3: History and explanation behavior across requests
// =========================================================================

#[test]
fn test_history_is_capped_across_requests() {
    let artifact = trained_artifact(&FEATURE_ORDER);
    let service = service_from_artifact(&artifact);
    let request = sample_request("en");

    let mut last = None;
    for _ in 0..6 {
        last = Some(service.recommend(&request));
    }

    let history = last.unwrap().history;
    assert_eq!(history.len(), 5);
    assert!(history.iter().all(|e| e.crop == "Rice"));
}

#[test]
fn test_polish_rewrite_replaces_base_text() {
    struct RewriteBackend;

    impl TextGeneration for RewriteBackend {
        fn complete(&self, _prompt: &str, _timeout: Duration) -> Result<String, LlmError> {
            Ok("1. Rice thrives at a soil pH of 7.2. 2. Records from similar soils \
                support Rice."
                .to_string())
        }
    }

    let artifact = trained_artifact(&FEATURE_ORDER);
    let classifier = CropClassifier::from_path(artifact.path()).unwrap();
    let service = RecommendationService::new(
        Some(Arc::new(classifier) as Arc<dyn CropPredictor>),
        TextService::new(Arc::new(RewriteBackend)),
        Arc::new(SessionHistoryLedger::default()),
    );

    let response = service.recommend(&sample_request("en"));
    assert!(response.explanation.starts_with("1. Rice thrives"));
}
