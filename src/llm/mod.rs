//! Language-model subsystem for the clinical application.
//!
//! This module is organized into:
//! - `core`: Configuration, errors, tasks, and compute devices
//! - `registry`: Model loading, tokenizers, inference clients, and pipeline traits
//! - `summarization`: Word-bounded chunking and recursive summarization
//! - `qa`: Question answering with a confidence floor
//! - `translation`: Single-pair translation with an unsupported-pair outcome
//! - `service`: The facade used by request handlers

pub mod core;
pub mod qa;
pub mod registry;
pub mod service;
pub mod summarization;
pub mod translation;

#[cfg(test)]
pub(crate) mod testing;

pub use self::core::{
    AnswerConfig, ComputeDevice, DevicePreference, InferenceConfig, LlmConfig, LlmError,
    LlmResult, ModelsConfig, SummarizerConfig, Task, TranslationConfig,
};
pub use qa::{AnswerOutcome, AnswerService};
pub use registry::{Availability, ModelRegistry, QaResult, SummaryParams};
pub use service::{Capabilities, LlmService};
pub use summarization::{ChunkedSummarizer, TextChunk, split_text};
pub use translation::{LanguagePair, TranslationOutcome, TranslationService};
