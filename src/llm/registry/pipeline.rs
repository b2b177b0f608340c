//! Pipeline abstractions consumed by the services.
//!
//! Services only see these traits, so tests can swap in lightweight fakes for
//! the registry's model handles.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::llm::core::errors::LlmResult;

/// Boxed future type for pipeline operations.
pub type InferenceFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Generation bounds for one summarization call.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SummaryParams {
    /// Maximum generated length, in tokens.
    pub max_length: usize,
    /// Minimum generated length, in tokens.
    pub min_length: usize,
}

impl SummaryParams {
    /// Create summary parameters.
    #[must_use]
    pub const fn new(max_length: usize, min_length: usize) -> Self {
        Self {
            max_length,
            min_length,
        }
    }
}

/// Answer span and confidence returned by a question answering model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QaResult {
    /// Extracted answer span.
    pub answer: String,
    /// Model confidence in `[0, 1]`.
    pub score: f32,
}

/// Summarization pipeline with access to its tokenizer.
pub trait SummarizationPipeline: Send + Sync {
    /// Count tokens as the summarization tokenizer encodes `text`.
    ///
    /// # Errors
    /// Returns an error if tokenization fails.
    fn count_tokens(&self, text: &str) -> LlmResult<usize>;

    /// Maximum input length accepted by the model, in tokens.
    fn model_max_tokens(&self) -> usize;

    /// Summarize `text` with deterministic decoding.
    ///
    /// # Errors
    /// Returns an error if inference fails.
    fn summarize(
        &self,
        text: &str,
        params: SummaryParams,
    ) -> InferenceFuture<'_, LlmResult<String>>;
}

/// Extractive question answering pipeline.
pub trait QuestionAnsweringPipeline: Send + Sync {
    /// Find the answer to `question` inside `context`.
    ///
    /// # Errors
    /// Returns an error if inference fails.
    fn answer(&self, question: &str, context: &str) -> InferenceFuture<'_, LlmResult<QaResult>>;
}

/// Translation pipeline bound to one language pair.
pub trait TranslationPipeline: Send + Sync {
    /// Translate `text` with the loaded model.
    ///
    /// # Errors
    /// Returns an error if inference fails.
    fn translate(&self, text: &str) -> InferenceFuture<'_, LlmResult<String>>;
}
