//! Translation for the language pair of the loaded model.
//!
//! Only one translation model is loaded, so exactly one pair is served. Other
//! pairs get an explicit [`TranslationOutcome::UnsupportedPair`] without
//! touching the model.

use std::fmt;

use serde::Serialize;

use crate::llm::core::config::TranslationConfig;
use crate::llm::core::errors::LlmResult;
use crate::llm::registry::model_registry::SharedTranslator;

/// Message returned for language pairs the loaded model does not cover.
pub const UNSUPPORTED_PAIR_MESSAGE: &str =
    "Translation for this language pair is not supported yet.";

/// Source and target language codes, normalised to lowercase.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct LanguagePair {
    /// Source language code.
    pub source: String,
    /// Target language code.
    pub target: String,
}

impl LanguagePair {
    /// Build a normalised pair.
    #[must_use]
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source: source.trim().to_ascii_lowercase(),
            target: target.trim().to_ascii_lowercase(),
        }
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.source, self.target)
    }
}

/// Result of a translation request.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TranslationOutcome {
    /// Model output for the supported pair.
    Translated {
        /// Translated text.
        text: String,
    },
    /// The pair is not served; no model call was made.
    UnsupportedPair {
        /// Requested pair.
        pair: LanguagePair,
    },
}

impl TranslationOutcome {
    /// Text to show the user.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Translated { text } => text,
            Self::UnsupportedPair { .. } => UNSUPPORTED_PAIR_MESSAGE,
        }
    }

    /// Whether the pair was served.
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        matches!(self, Self::Translated { .. })
    }
}

/// Translates text for the loaded model's language pair.
#[derive(Clone)]
pub struct TranslationService {
    pipeline: SharedTranslator,
    supported: LanguagePair,
}

impl TranslationService {
    /// Create a translation service over `pipeline`.
    #[must_use]
    pub fn new(pipeline: SharedTranslator, settings: &TranslationConfig) -> Self {
        Self {
            pipeline,
            supported: LanguagePair::new(&settings.source_lang, &settings.target_lang),
        }
    }

    /// The one pair this service translates.
    #[must_use]
    pub const fn supported_pair(&self) -> &LanguagePair {
        &self.supported
    }

    /// Translate `text` from `source_lang` to `target_lang`.
    ///
    /// # Errors
    /// Returns the pipeline's error if inference fails.
    pub async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> LlmResult<TranslationOutcome> {
        let pair = LanguagePair::new(source_lang, target_lang);
        if pair != self.supported {
            return Ok(TranslationOutcome::UnsupportedPair { pair });
        }

        if text.trim().is_empty() {
            return Ok(TranslationOutcome::Translated {
                text: String::new(),
            });
        }

        let text = self.pipeline.translate(text).await?;
        Ok(TranslationOutcome::Translated { text })
    }
}
