//! Recommendation Service
//!
//! Wires the pipeline together for one validated request: arbitrate a
//! decision, compose the localized explanation, append session history,
//! assemble the response. The recommendation path degrades gracefully
//! and never fails outright; only the advisory chat path can surface a
//! service-unavailable error.

use crate::classifier::CropPredictor;
use crate::decision::{Decision, DecisionArbiter, DecisionReason, DecisionSource};
use crate::explanation::compose_explanation;
use crate::features::{ClimateSample, SoilSample};
use crate::history::{HistoryEntry, SessionHistoryLedger};
use crate::llm::{Language, LlmError, TextService};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One validated recommendation request. Schema/bounds validation
/// happens upstream in the transport layer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendRequest {
    pub soil: SoilSample,
    pub climate: ClimateSample,
    pub last_crop: Option<String>,
    #[serde(default)]
    pub lang: Language,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub crop: String,
    pub confidence: f64,
}

/// Response shape handed back to the transport layer
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationResponse {
    pub recommendation: Recommendation,
    pub explanation: String,
    pub source: DecisionSource,
    pub model_version: String,
    pub reason: DecisionReason,
    pub history: Vec<HistoryEntry>,
}

/// Health snapshot of the collaborators
#[derive(Debug, Clone, Serialize)]
pub struct SystemStatus {
    pub status: String,
    pub timestamp: String,
    pub services: BTreeMap<String, String>,
}

/// The assembled decision pipeline
pub struct RecommendationService {
    classifier_loaded: bool,
    arbiter: DecisionArbiter,
    text: TextService,
    ledger: Arc<SessionHistoryLedger>,
}

impl RecommendationService {
    /// A missing classifier is accepted: every request then takes the
    /// rule-fallback path instead of failing at startup.
    pub fn new(
        classifier: Option<Arc<dyn CropPredictor>>,
        text: TextService,
        ledger: Arc<SessionHistoryLedger>,
    ) -> Self {
        Self {
            classifier_loaded: classifier.is_some(),
            arbiter: DecisionArbiter::new(classifier),
            text,
            ledger,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.arbiter = self.arbiter.with_threshold(threshold);
        self
    }

    /// Produce a recommendation for one request. Never fails: model and
    /// polish problems degrade to rule-based or unpolished output.
    pub fn recommend(&self, request: &RecommendRequest) -> RecommendationResponse {
        let decision = self
            .arbiter
            .decide(&request.soil, &request.climate, request.last_crop.as_deref());

        let composed = compose_explanation(
            &decision.crop,
            request.soil.ph,
            decision.confidence,
            decision.reason,
            request.last_crop.as_deref(),
            request.lang,
            &self.text,
        );

        let session_id = request.session_id.as_deref().unwrap_or("");
        self.ledger.add(session_id, &decision.crop, decision.confidence);
        let history = self.ledger.get(session_id);

        tracing::info!(
            crop = %decision.crop,
            confidence = decision.confidence,
            reason = ?decision.reason,
            lang = request.lang.code(),
            "recommendation produced"
        );

        Self::assemble(decision, composed.text, history)
    }

    /// Advisory chat answer in the caller's language. No deterministic
    /// fallback exists here, so collaborator failure propagates.
    pub fn advise(&self, message: &str, lang: Language) -> Result<String, LlmError> {
        self.text.advise(message, lang)
    }

    /// Collaborator health: "ok"/"error" per service, overall status
    /// "degraded" when anything is down.
    pub fn system_check(&self) -> SystemStatus {
        let mut services = BTreeMap::new();

        services.insert(
            "model".to_string(),
            if self.classifier_loaded { "ok" } else { "error" }.to_string(),
        );
        services.insert(
            "text_generation".to_string(),
            match self.text.complete("Reply with OK.") {
                Ok(_) => "ok".to_string(),
                Err(_) => "error".to_string(),
            },
        );

        let status = if services.values().any(|s| s == "error") {
            "degraded"
        } else {
            "ok"
        };

        SystemStatus {
            status: status.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            services,
        }
    }

    pub fn ledger(&self) -> &SessionHistoryLedger {
        &self.ledger
    }

    fn assemble(
        decision: Decision,
        explanation: String,
        history: Vec<HistoryEntry>,
    ) -> RecommendationResponse {
        RecommendationResponse {
            recommendation: Recommendation {
                crop: decision.crop,
                confidence: decision.confidence,
            },
            explanation,
            source: decision.source,
            model_version: decision.model_version,
            reason: decision.reason,
            history,
        }
    }
}
