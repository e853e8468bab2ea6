//! Composes the final explanation text for a decision
//!
//! Step 1 renders the deterministic base sentences, step 2 appends the
//! reason addendum, step 3 sends the result through a strict
//! rewrite-only polish prompt. The collaborator can emit commentary or
//! boilerplate instead of the requested format, so the reply is
//! verified before it replaces the base text.

use crate::decision::DecisionReason;
use crate::explanation::templates::{lookup_templates, render};
use crate::llm::{Language, TextService};

/// Whether the polish step replaced the base text. The fallback reason
/// is kept for observability and never surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolishOutcome {
    Polished,
    Fallback { reason: String },
}

/// Final explanation plus polish provenance
#[derive(Debug, Clone)]
pub struct ComposedExplanation {
    pub text: String,
    pub polish: PolishOutcome,
}

/// Strict rewrite-only prompt. Anything beyond fluency is forbidden.
fn build_polish_prompt(text: &str, lang: Language) -> String {
    format!(
        "Rewrite the numbered sentences below for fluency.\n\
         \n\
         STRICT RULES:\n\
         - Keep the same number of sentences and the same numbering.\n\
         - Keep every number and measurement unchanged.\n\
         - Do NOT add information or commentary.\n\
         - Answer in {lang_name} only.\n\
         \n\
         TEXT:\n\
         {text}\n\
         \n\
         OUTPUT ONLY THE REWRITTEN SENTENCES.",
        lang_name = lang.english_name(),
    )
}

/// Render the deterministic base text (steps 1 and 2).
fn base_text(
    crop: &str,
    soil_ph: Option<f64>,
    confidence: f64,
    reason: DecisionReason,
    lang: Language,
) -> String {
    let templates = lookup_templates(lang);

    let sentence1 = render(templates.soil, crop, soil_ph);
    let sentence2 = render(templates.basis, crop, soil_ph);

    let addendum = match reason {
        DecisionReason::MlPrediction if confidence > 0.8 => Some(templates.high_confidence),
        DecisionReason::MlPrediction if confidence >= 0.5 => Some(templates.moderate_confidence),
        DecisionReason::MlPrediction => None,
        DecisionReason::LowConfidenceFallback => Some(templates.low_confidence_fallback),
        DecisionReason::MlErrorFallback => Some(templates.error_fallback),
    };

    match addendum {
        Some(extra) => format!("1. {sentence1} 2. {sentence2} 3. {extra}"),
        None => format!("1. {sentence1} 2. {sentence2}"),
    }
}

/// A clean rewrite keeps the numbered frame; anything else is treated
/// as collaborator boilerplate.
fn looks_like_rewrite(reply: &str) -> bool {
    reply.starts_with("1.") && reply.contains("2.")
}

/// Compose the localized explanation for one decision.
///
/// Polishing is best-effort: on collaborator failure or a malformed
/// reply the unpolished base text is returned and the cause recorded.
/// `last_crop` is accepted as a rotation-aware extension point and does
/// not yet shape the text.
pub fn compose_explanation(
    crop: &str,
    soil_ph: Option<f64>,
    confidence: f64,
    reason: DecisionReason,
    last_crop: Option<&str>,
    lang: Language,
    text_service: &TextService,
) -> ComposedExplanation {
    let _ = last_crop;

    let base = base_text(crop, soil_ph, confidence, reason, lang);
    let prompt = build_polish_prompt(&base, lang);

    match text_service.complete(&prompt) {
        Ok(reply) => {
            let reply = reply.trim().to_string();
            if looks_like_rewrite(&reply) {
                ComposedExplanation {
                    text: reply,
                    polish: PolishOutcome::Polished,
                }
            } else {
                tracing::debug!("polish reply not in numbered format, keeping base text");
                ComposedExplanation {
                    text: base,
                    polish: PolishOutcome::Fallback {
                        reason: "reply not in numbered rewrite format".to_string(),
                    },
                }
            }
        }
        Err(e) => {
            tracing::debug!(error = %e, "polish unavailable, keeping base text");
            ComposedExplanation {
                text: base,
                polish: PolishOutcome::Fallback {
                    reason: e.to_string(),
                },
            }
        }
    }
}
