//! Model handles produced by the registry.

use tracing::debug;

use crate::llm::core::device::ComputeDevice;
use crate::llm::core::errors::LlmResult;
use crate::llm::core::task::Task;
use crate::llm::registry::client::InferenceClient;
use crate::llm::registry::pipeline::{
    InferenceFuture, QaResult, QuestionAnsweringPipeline, SummarizationPipeline, SummaryParams,
    TranslationPipeline,
};
use crate::llm::registry::tokenizer::TokenizerHandle;

/// A loaded model: tokenizer plus an inference client on the chosen device.
///
/// Immutable once built; the registry shares it behind `Arc`.
#[derive(Clone)]
pub struct ModelHandle {
    task: Task,
    model_id: String,
    device: ComputeDevice,
    tokenizer: TokenizerHandle,
    client: InferenceClient,
}

impl ModelHandle {
    /// Assemble a handle from its loaded parts.
    #[must_use]
    pub fn new(
        task: Task,
        model_id: String,
        device: ComputeDevice,
        tokenizer: TokenizerHandle,
        client: InferenceClient,
    ) -> Self {
        Self {
            task,
            model_id,
            device,
            tokenizer,
            client,
        }
    }

    /// Task this model serves.
    #[must_use]
    pub const fn task(&self) -> Task {
        self.task
    }

    /// Hub id of the model.
    #[must_use]
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Device the model runs on.
    #[must_use]
    pub const fn device(&self) -> ComputeDevice {
        self.device
    }

    /// Token count of `text` under this model's tokenizer.
    ///
    /// # Errors
    /// Returns an error if tokenization fails.
    pub fn count_tokens(&self, text: &str) -> LlmResult<usize> {
        self.tokenizer.count_tokens(text)
    }

    /// Model input limit in tokens.
    #[must_use]
    pub const fn model_max_tokens(&self) -> usize {
        self.tokenizer.model_max_tokens()
    }

    /// Inference client bound to this model.
    #[must_use]
    pub const fn client(&self) -> &InferenceClient {
        &self.client
    }
}

/// Summarization view of a [`ModelHandle`].
pub struct SummarizationHandle(pub ModelHandle);

impl SummarizationPipeline for SummarizationHandle {
    fn count_tokens(&self, text: &str) -> LlmResult<usize> {
        self.0.count_tokens(text)
    }

    fn model_max_tokens(&self) -> usize {
        self.0.model_max_tokens()
    }

    fn summarize(
        &self,
        text: &str,
        params: SummaryParams,
    ) -> InferenceFuture<'_, LlmResult<String>> {
        let text = text.to_string();
        Box::pin(async move {
            debug!(
                "{}: {} chars to {} (max_length={}, min_length={})",
                self.0.task(),
                text.chars().count(),
                self.0.model_id(),
                params.max_length,
                params.min_length
            );
            self.0.client().summarize(&text, params).await
        })
    }
}

/// Question answering view of a [`ModelHandle`].
pub struct QuestionAnsweringHandle(pub ModelHandle);

impl QuestionAnsweringPipeline for QuestionAnsweringHandle {
    fn answer(&self, question: &str, context: &str) -> InferenceFuture<'_, LlmResult<QaResult>> {
        let question = question.to_string();
        let context = context.to_string();
        Box::pin(async move {
            debug!("{}: question to {}", self.0.task(), self.0.model_id());
            self.0.client().answer(&question, &context).await
        })
    }
}

/// Translation view of a [`ModelHandle`].
pub struct TranslationHandle(pub ModelHandle);

impl TranslationPipeline for TranslationHandle {
    fn translate(&self, text: &str) -> InferenceFuture<'_, LlmResult<String>> {
        let text = text.to_string();
        Box::pin(async move {
            debug!(
                "{}: {} chars to {}",
                self.0.task(),
                text.chars().count(),
                self.0.model_id()
            );
            self.0.client().translate(&text).await
        })
    }
}
