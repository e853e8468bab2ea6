//! Explanation Composer
//!
//! Builds a deterministic localized explanation for each decision from
//! sentence templates, then asks the text-generation collaborator for a
//! best-effort fluency polish. The polish step is treated as unreliable
//! and can never fail the request.

pub mod composer;
pub mod templates;

pub use composer::{compose_explanation, ComposedExplanation, PolishOutcome};
pub use templates::{lookup_templates, SentenceTemplates};
