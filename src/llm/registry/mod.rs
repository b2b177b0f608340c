//! Model registry: tokenizers, inference clients, and the pipeline traits.

pub mod client;
pub mod handle;
pub mod model_registry;
pub mod pipeline;
pub mod tokenizer;

pub use client::InferenceClient;
pub use handle::{ModelHandle, QuestionAnsweringHandle, SummarizationHandle, TranslationHandle};
pub use model_registry::{
    Availability, ModelLoader, ModelRegistry, SharedQuestionAnswerer, SharedSummarizer,
    SharedTranslator, settle,
};
pub use pipeline::{
    InferenceFuture, QaResult, QuestionAnsweringPipeline, SummarizationPipeline, SummaryParams,
    TranslationPipeline,
};
pub use tokenizer::TokenizerHandle;
