//! Multilingual Text Service
//!
//! Thin wrapper over a pluggable text-completion collaborator (a local
//! LLM in production). Supplies the strict prompts used for polishing,
//! translation, and advisory chat; translation to English is a pure
//! rule and never touches the collaborator.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Default timeout for one completion call. Generation is the dominant
/// latency source on the request path and must never run under a lock.
pub const DEFAULT_COMPLETION_TIMEOUT: Duration = Duration::from_secs(120);

/// Supported response languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
    Mr,
    Gu,
}

impl Language {
    /// Parse a language code; anything unrecognized maps to English.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "hi" => Self::Hi,
            "mr" => Self::Mr,
            "gu" => Self::Gu,
            _ => Self::En,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Hi => "hi",
            Self::Mr => "mr",
            Self::Gu => "gu",
        }
    }

    /// English name of the language, used inside prompts.
    pub fn english_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Hi => "Hindi",
            Self::Mr => "Marathi",
            Self::Gu => "Gujarati",
        }
    }
}

/// Errors from the text-generation collaborator
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("text-generation service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Text-completion collaborator (Ollama-style backend in production,
/// stubs in tests)
pub trait TextGeneration: Send + Sync {
    fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, LlmError>;
}

/// Backend stand-in for deployments without a generation service.
/// Every call fails, so callers exercise their deterministic
/// fallbacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineBackend;

impl TextGeneration for OfflineBackend {
    fn complete(&self, _prompt: &str, _timeout: Duration) -> Result<String, LlmError> {
        Err(LlmError::ServiceUnavailable(
            "no text-generation backend configured".to_string(),
        ))
    }
}

/// Builds the strict translation prompt for a non-English target.
pub fn build_translation_prompt(text: &str, lang: Language) -> String {
    format!(
        "You are a professional translator.\n\
         \n\
         Translate the text into {lang_name}.\n\
         \n\
         STRICT RULES:\n\
         - Translate ONLY.\n\
         - Do NOT explain.\n\
         - Do NOT add information.\n\
         - Keep same number of sentences.\n\
         - Preserve meaning exactly.\n\
         - Simple farmer-friendly language.\n\
         \n\
         TEXT:\n\
         {text}\n\
         \n\
         OUTPUT ONLY TRANSLATED TEXT.",
        lang_name = lang.english_name(),
    )
}

/// Builds the advisory chat prompt.
pub fn build_advisory_prompt(message: &str, lang: Language) -> String {
    format!(
        "You are an AI Crop Advisor for Indian farmers. \
         Answer clearly and practically. Keep it short unless the user asks for detail. \
         If you need missing info (location, season, soil pH, N/P/K, rainfall), ask 1-2 questions. \
         Reply in {lang_name}.\n\
         \n\
         User: {message}\n\
         Assistant:",
        lang_name = lang.english_name(),
    )
}

/// Shared handle pairing a collaborator with its call timeout
#[derive(Clone)]
pub struct TextService {
    backend: Arc<dyn TextGeneration>,
    timeout: Duration,
}

impl TextService {
    pub fn new(backend: Arc<dyn TextGeneration>) -> Self {
        Self {
            backend,
            timeout: DEFAULT_COMPLETION_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Raw completion with this service's timeout.
    pub fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.backend.complete(prompt, self.timeout)
    }

    /// Translate `text` into `lang`. English is the identity rule and
    /// skips the collaborator entirely.
    pub fn translate(&self, text: &str, lang: Language) -> Result<String, LlmError> {
        if lang == Language::En {
            return Ok(text.to_string());
        }

        let prompt = build_translation_prompt(text, lang);
        Ok(self.complete(&prompt)?.trim().to_string())
    }

    /// Advisory chat answer. There is no deterministic fallback text
    /// here, so collaborator failure propagates to the caller.
    pub fn advise(&self, message: &str, lang: Language) -> Result<String, LlmError> {
        let prompt = build_advisory_prompt(message, lang);
        Ok(self.complete(&prompt)?.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend that records calls and echoes a canned reply
    struct CountingBackend {
        calls: AtomicUsize,
        reply: Result<String, LlmError>,
    }

    impl CountingBackend {
        fn replying(reply: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reply: Ok(reply.to_string()),
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reply: Err(LlmError::ServiceUnavailable("offline".to_string())),
            }
        }
    }

    impl TextGeneration for CountingBackend {
        fn complete(&self, _prompt: &str, _timeout: Duration) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::from_code("hi"), Language::Hi);
        assert_eq!(Language::from_code(" MR "), Language::Mr);
        assert_eq!(Language::from_code("gu"), Language::Gu);
        assert_eq!(Language::from_code("fr"), Language::En);
        assert_eq!(Language::from_code(""), Language::En);
        assert_eq!(Language::Hi.code(), "hi");
    }

    #[test]
    fn test_translate_english_is_identity_without_backend_call() {
        let backend = Arc::new(CountingBackend::replying("ignored"));
        let service = TextService::new(backend.clone());

        let out = service
            .translate("Soil pH 6.5 is suitable for Wheat.", Language::En)
            .unwrap();

        assert_eq!(out, "Soil pH 6.5 is suitable for Wheat.");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_translate_non_english_calls_backend() {
        let backend = Arc::new(CountingBackend::replying("अनुवादित पाठ"));
        let service = TextService::new(backend.clone());

        let out = service.translate("text", Language::Hi).unwrap();

        assert_eq!(out, "अनुवादित पाठ");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_advise_propagates_unavailability() {
        let service = TextService::new(Arc::new(CountingBackend::failing()));

        let err = service
            .advise("What should I plant after rice?", Language::En)
            .unwrap_err();

        assert!(matches!(err, LlmError::ServiceUnavailable(_)));
    }

    #[test]
    fn test_translation_prompt_names_target_language() {
        let prompt = build_translation_prompt("hello", Language::Gu);
        assert!(prompt.contains("Gujarati"));
        assert!(prompt.contains("OUTPUT ONLY TRANSLATED TEXT."));
    }

    #[test]
    fn test_advisory_prompt_embeds_message_and_language() {
        let prompt = build_advisory_prompt("When to sow wheat?", Language::Hi);
        assert!(prompt.contains("When to sow wheat?"));
        assert!(prompt.contains("Reply in Hindi."));
    }
}
