//! Error types for the language-model subsystem.

use thiserror::Error;

use crate::llm::core::task::Task;

/// Language-model subsystem error type.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Caller-supplied input was rejected before inference.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A pretrained model or its tokenizer could not be obtained or initialized.
    #[error("failed to load {model} for {task}: {reason}")]
    ModelLoad {
        /// Task the model was loaded for.
        task: Task,
        /// Model identifier on the hub.
        model: String,
        /// Underlying cause.
        reason: String,
    },
    /// The task was not loaded at startup.
    #[error("{task} is unavailable: {reason}")]
    Unavailable {
        /// Task that was requested.
        task: Task,
        /// Why the task was not loaded.
        reason: String,
    },
    /// The inference runtime answered but the call failed.
    #[error("inference failed: {0}")]
    Inference(String),
    /// The inference runtime returned a non-success status.
    #[error("inference server returned status {status}: {body}")]
    InferenceStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },
    /// Tokenizer construction or encoding failed.
    #[error("tokenizer error: {0}")]
    Tokenizer(String),
    /// HTTP client error.
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
    /// Hugging Face Hub download error.
    #[error("hub error: {0}")]
    Hub(#[from] hf_hub::api::tokio::ApiError),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// URL parse error.
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl LlmError {
    /// Wrap any load-time failure into a [`LlmError::ModelLoad`] for `task`.
    #[must_use]
    pub fn model_load(task: Task, model: &str, cause: &Self) -> Self {
        Self::ModelLoad {
            task,
            model: model.to_string(),
            reason: cause.to_string(),
        }
    }

    /// Whether the error is a per-call inference failure rather than a caller
    /// or availability problem.
    #[must_use]
    pub const fn is_inference_failure(&self) -> bool {
        matches!(
            self,
            Self::Inference(_)
                | Self::InferenceStatus { .. }
                | Self::Http(_)
                | Self::Serialization(_)
                | Self::Tokenizer(_)
        )
    }
}

/// Convenience result alias for language-model operations.
pub type LlmResult<T> = Result<T, LlmError>;
