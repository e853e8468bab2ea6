// Demo entry point for the recommendation pipeline
//
// Runs one end-to-end recommendation against a trained artifact and
// prints the assembled response as JSON.
// Usage: cargo run --bin recommend_demo

use crop_advisor_rust::{
    ClimateSample, CropClassifier, CropPredictor, Language, OfflineBackend, RecommendRequest,
    RecommendationService, SessionHistoryLedger, SoilSample, TextService,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crop_advisor_rust=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Configuration from environment variables
    let artifact_path = std::env::var("ARTIFACT_PATH")
        .unwrap_or_else(|_| "artifacts/crop_suitability.json".to_string());

    let threshold: f64 = std::env::var("CONFIDENCE_THRESHOLD")
        .ok()
        .and_then(|t| t.parse().ok())
        .unwrap_or(crop_advisor_rust::CONFIDENCE_THRESHOLD);

    let history_cap: usize = std::env::var("HISTORY_CAP")
        .ok()
        .and_then(|c| c.parse().ok())
        .unwrap_or(crop_advisor_rust::DEFAULT_HISTORY_CAP);

    let lang = Language::from_code(
        &std::env::var("LANG_CODE").unwrap_or_else(|_| "en".to_string()),
    );

    tracing::info!("Configuration:");
    tracing::info!("  ARTIFACT_PATH: {}", artifact_path);
    tracing::info!("  CONFIDENCE_THRESHOLD: {}", threshold);
    tracing::info!("  HISTORY_CAP: {}", history_cap);
    tracing::info!("  LANG_CODE: {}", lang.code());

    // A missing artifact is not fatal: the service degrades to the
    // deterministic rule path
    let classifier: Option<Arc<dyn CropPredictor>> =
        match CropClassifier::shared(&artifact_path) {
            Ok(c) => Some(Arc::new(c)),
            Err(e) => {
                tracing::warn!(error = %e, "running without classifier");
                None
            }
        };

    let service = RecommendationService::new(
        classifier,
        TextService::new(Arc::new(OfflineBackend)),
        Arc::new(SessionHistoryLedger::new(history_cap)),
    )
    .with_threshold(threshold);

    let request = RecommendRequest {
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
        last_crop: Some("Rice".to_string()),
        lang,
        session_id: Some("demo-session".to_string()),
    };

    let response = service.recommend(&request);
    println!("{}", serde_json::to_string_pretty(&response)?);

    let status = service.system_check();
    println!("{}", serde_json::to_string_pretty(&status)?);

    Ok(())
}
