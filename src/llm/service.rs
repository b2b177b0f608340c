//! Language-model facade used by the HTTP handlers.
//!
//! One instance is built at startup from the registry and shared by reference;
//! every call is independent and only reads the loaded pipelines.

use serde::Serialize;

use crate::llm::core::config::LlmConfig;
use crate::llm::core::device::ComputeDevice;
use crate::llm::core::errors::LlmResult;
use crate::llm::core::task::Task;
use crate::llm::qa::answer::{AnswerOutcome, AnswerService};
use crate::llm::registry::model_registry::{Availability, ModelRegistry};
use crate::llm::registry::pipeline::SummaryParams;
use crate::llm::summarization::chunked::ChunkedSummarizer;
use crate::llm::translation::translate::{TranslationOutcome, TranslationService};

/// Default source language for translation requests.
pub const DEFAULT_SOURCE_LANG: &str = "en";
/// Default target language for translation requests.
pub const DEFAULT_TARGET_LANG: &str = "fr";

/// Which features are being served.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Capabilities {
    /// Summarization is available.
    pub summarization: bool,
    /// Question answering is available.
    pub question_answering: bool,
    /// Translation is available.
    pub translation: bool,
}

/// Summarization, question answering, and translation behind one interface.
pub struct LlmService {
    device: ComputeDevice,
    summarizer: Availability<ChunkedSummarizer>,
    answerer: Availability<AnswerService>,
    translator: Availability<TranslationService>,
}

impl LlmService {
    /// Build the facade over an already-loaded registry.
    #[must_use]
    pub fn new(registry: &ModelRegistry, config: &LlmConfig) -> Self {
        Self {
            device: registry.device(),
            summarizer: registry
                .summarization()
                .clone()
                .map(|pipeline| ChunkedSummarizer::new(pipeline, config.summarizer.clone())),
            answerer: registry
                .question_answering()
                .clone()
                .map(|pipeline| AnswerService::new(pipeline, config.answer.clone())),
            translator: registry
                .translation()
                .clone()
                .map(|pipeline| TranslationService::new(pipeline, &config.translation)),
        }
    }

    /// Load every model and build the facade.
    ///
    /// # Errors
    /// Returns an error if loading fails under strict startup.
    pub async fn load(config: &LlmConfig) -> LlmResult<Self> {
        let registry = ModelRegistry::load_all(config).await?;
        Ok(Self::new(&registry, config))
    }

    /// Device the models run on.
    #[must_use]
    pub const fn device(&self) -> ComputeDevice {
        self.device
    }

    /// Features currently served.
    #[must_use]
    pub const fn capabilities(&self) -> Capabilities {
        Capabilities {
            summarization: self.summarizer.is_available(),
            question_answering: self.answerer.is_available(),
            translation: self.translator.is_available(),
        }
    }

    /// Tasks that failed to load, with the recorded reason.
    #[must_use]
    pub fn unavailable(&self) -> Vec<(Task, &str)> {
        [
            (Task::Summarization, self.summarizer.reason()),
            (Task::QuestionAnswering, self.answerer.reason()),
            (Task::Translation, self.translator.reason()),
        ]
        .into_iter()
        .filter_map(|(task, reason)| reason.map(|reason| (task, reason)))
        .collect()
    }

    /// Summarize `text`; missing bounds fall back to the configured defaults
    /// (150/50).
    ///
    /// # Errors
    /// Returns [`crate::llm::LlmError::Unavailable`] if summarization was not
    /// loaded, or the summarizer's error.
    pub async fn summarize(
        &self,
        text: Option<&str>,
        max_length: Option<usize>,
        min_length: Option<usize>,
    ) -> LlmResult<String> {
        let summarizer = self.summarizer.require(Task::Summarization)?;
        let defaults = summarizer.default_params();
        let params = SummaryParams::new(
            max_length.unwrap_or(defaults.max_length),
            min_length.unwrap_or(defaults.min_length),
        );
        summarizer.summarize(text, params).await
    }

    /// Answer `question` against `context` or the built-in medical context.
    ///
    /// # Errors
    /// Returns [`crate::llm::LlmError::Unavailable`] if question answering was
    /// not loaded, or the answer service's error.
    pub async fn answer(&self, question: &str, context: Option<&str>) -> LlmResult<AnswerOutcome> {
        self.answerer
            .require(Task::QuestionAnswering)?
            .answer(question, context)
            .await
    }

    /// Translate `text`; languages default to en→fr.
    ///
    /// # Errors
    /// Returns [`crate::llm::LlmError::Unavailable`] if translation was not
    /// loaded, or the translation service's error.
    pub async fn translate(
        &self,
        text: &str,
        source_lang: Option<&str>,
        target_lang: Option<&str>,
    ) -> LlmResult<TranslationOutcome> {
        self.translator
            .require(Task::Translation)?
            .translate(
                text,
                source_lang.unwrap_or(DEFAULT_SOURCE_LANG),
                target_lang.unwrap_or(DEFAULT_TARGET_LANG),
            )
            .await
    }
}
