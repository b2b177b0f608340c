//! Core language-model types: configuration, errors, tasks, and devices.

pub mod config;
pub mod device;
pub mod errors;
pub mod task;

pub use config::{
    AnswerConfig, DEFAULT_MEDICAL_CONTEXT, InferenceConfig, LlmConfig, ModelsConfig,
    SummarizerConfig, TranslationConfig,
};
pub use device::{ComputeDevice, DevicePreference};
pub use errors::{LlmError, LlmResult};
pub use task::Task;
