//! Configuration for the language-model subsystem.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::llm::core::device::DevicePreference;
use crate::llm::core::errors::{LlmError, LlmResult};
use crate::llm::core::task::Task;

/// Environment variable pointing at an optional JSON config file.
pub const CONFIG_PATH_ENV: &str = "CLINICAL_LLM_CONFIG";
/// Environment variable overriding the inference server URL.
pub const INFERENCE_URL_ENV: &str = "CLINICAL_LLM_INFERENCE_URL";
/// Environment variable holding the inference API token.
pub const API_TOKEN_ENV: &str = "CLINICAL_LLM_API_TOKEN";
/// Hugging Face Hub token used for tokenizer downloads.
pub const HF_TOKEN_ENV: &str = "HF_TOKEN";
/// Environment variable overriding the device preference.
pub const DEVICE_ENV: &str = "CLINICAL_LLM_DEVICE";
/// Environment variable enabling strict startup.
pub const STRICT_ENV: &str = "CLINICAL_LLM_STRICT";

/// Built-in passage used when a question arrives without context.
pub const DEFAULT_MEDICAL_CONTEXT: &str = "Medical knowledge encompasses diagnosis, treatment, \
and prevention of disease, illness, injury, and other physical and mental impairments in humans. \
Medicine encompasses a variety of health care practices evolved to maintain and restore health by \
the prevention and treatment of illness. Contemporary medicine applies biomedical sciences, \
biomedical research, genetics, and medical technology to diagnose, treat, and prevent injury and \
disease, typically through pharmaceuticals or surgery, but also through therapies as diverse as \
psychotherapy, external splints and traction, medical devices, biologics, and ionizing radiation, \
amongst others. Medicine has been practiced since prehistoric times, during most of which it was \
an art (an area of skill and knowledge) frequently having connections to the religious and \
philosophical beliefs of local culture.";

/// Top-level configuration for the language-model service.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Pretrained model ids per task.
    pub models: ModelsConfig,
    /// Pipeline server settings.
    pub inference: InferenceConfig,
    /// Compute device preference.
    pub device: DevicePreference,
    /// Chunked summarization settings.
    pub summarizer: SummarizerConfig,
    /// Question answering settings.
    pub answer: AnswerConfig,
    /// Translation settings.
    pub translation: TranslationConfig,
    /// Abort startup when any model fails to load.
    pub strict_startup: bool,
}

impl LlmConfig {
    /// Build the configuration from the optional JSON file and environment overrides.
    ///
    /// # Errors
    /// Returns an error if the config file cannot be read or parsed, or if an
    /// override has an invalid value.
    pub fn from_env() -> LlmResult<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };

        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides read through `lookup`, keyed by environment variable name.
    ///
    /// # Errors
    /// Returns an error if an override has an invalid value.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> LlmResult<()> {
        if let Some(url) = lookup(INFERENCE_URL_ENV) {
            self.inference.base_url = url;
        }
        if let Some(token) = lookup(API_TOKEN_ENV) {
            self.inference.api_token = Some(token);
        }
        if let Some(token) = lookup(HF_TOKEN_ENV) {
            self.models.hub_token = Some(token);
        }
        if let Some(device) = lookup(DEVICE_ENV) {
            self.device = device.parse()?;
        }
        if let Some(strict) = lookup(STRICT_ENV) {
            self.strict_startup = matches!(strict.trim(), "1" | "true" | "yes");
        }
        Ok(())
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> LlmResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> LlmResult<()> {
        for task in Task::ALL {
            if self.models.model_for(task).trim().is_empty() {
                return Err(LlmError::InvalidConfig(format!(
                    "models.{task} must not be empty"
                )));
            }
        }

        Url::parse(&self.inference.base_url)?;

        if self.inference.request_timeout_secs == 0 {
            return Err(LlmError::InvalidConfig(
                "inference.request_timeout_secs must be > 0".to_string(),
            ));
        }

        let summarizer = &self.summarizer;
        if summarizer.chunk_size_chars == 0 {
            return Err(LlmError::InvalidConfig(
                "summarizer.chunk_size_chars must be > 0".to_string(),
            ));
        }
        if summarizer.max_passes == 0 {
            return Err(LlmError::InvalidConfig(
                "summarizer.max_passes must be > 0".to_string(),
            ));
        }
        if summarizer.fallback_model_max_tokens <= summarizer.reserved_generation_tokens {
            return Err(LlmError::InvalidConfig(
                "summarizer.fallback_model_max_tokens must exceed reserved_generation_tokens"
                    .to_string(),
            ));
        }
        validate_lengths(
            "summarizer.chunk",
            summarizer.chunk_max_length,
            summarizer.chunk_min_length,
        )?;
        validate_lengths(
            "summarizer.default",
            summarizer.default_max_length,
            summarizer.default_min_length,
        )?;

        if !(0.0..=1.0).contains(&self.answer.min_confidence) {
            return Err(LlmError::InvalidConfig(
                "answer.min_confidence must be within [0, 1]".to_string(),
            ));
        }
        if self.answer.default_context.trim().is_empty() {
            return Err(LlmError::InvalidConfig(
                "answer.default_context must not be empty".to_string(),
            ));
        }

        if self.translation.source_lang.trim().is_empty()
            || self.translation.target_lang.trim().is_empty()
        {
            return Err(LlmError::InvalidConfig(
                "translation languages must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_lengths(name: &str, max_length: usize, min_length: usize) -> LlmResult<()> {
    if min_length == 0 || max_length < min_length {
        return Err(LlmError::InvalidConfig(format!(
            "{name} lengths must satisfy max_length >= min_length > 0"
        )));
    }
    Ok(())
}

/// Pretrained model ids per task.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Summarization model.
    pub summarization: String,
    /// Question answering model.
    pub question_answering: String,
    /// Translation model.
    pub translation: String,
    /// Hub token for gated or private model repositories.
    pub hub_token: Option<String>,
}

impl ModelsConfig {
    /// Model id configured for `task`.
    #[must_use]
    pub fn model_for(&self, task: Task) -> &str {
        match task {
            Task::Summarization => &self.summarization,
            Task::QuestionAnswering => &self.question_answering,
            Task::Translation => &self.translation,
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            summarization: "facebook/bart-large-cnn".to_string(),
            question_answering: "deepset/roberta-base-squad2".to_string(),
            translation: "t5-small".to_string(),
            hub_token: None,
        }
    }
}

/// Pipeline server settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Base URL; models are served under `{base_url}/models/{model_id}`.
    pub base_url: String,
    /// Optional bearer token for the inference server only.
    pub api_token: Option<String>,
    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Send one warm-up request per model while loading.
    pub warmup: bool,
}

impl InferenceConfig {
    /// Connection timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            api_token: None,
            connect_timeout_secs: 5,
            request_timeout_secs: 300,
            warmup: true,
        }
    }
}

/// Chunked summarization settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    /// Tokens held back from the model limit for generated output.
    pub reserved_generation_tokens: usize,
    /// Maximum characters per chunk, separators included.
    pub chunk_size_chars: usize,
    /// `max_length` used for each chunk summary.
    pub chunk_max_length: usize,
    /// `min_length` used for each chunk summary.
    pub chunk_min_length: usize,
    /// Default `max_length` for callers that do not pass one.
    pub default_max_length: usize,
    /// Default `min_length` for callers that do not pass one.
    pub default_min_length: usize,
    /// Maximum number of chunked passes before hard truncation.
    pub max_passes: usize,
    /// Model input limit used when the tokenizer config does not declare one.
    pub fallback_model_max_tokens: usize,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            reserved_generation_tokens: 100,
            chunk_size_chars: 1000,
            chunk_max_length: 100,
            chunk_min_length: 30,
            default_max_length: 150,
            default_min_length: 50,
            max_passes: 4,
            fallback_model_max_tokens: 1024,
        }
    }
}

/// Question answering settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerConfig {
    /// Answers scored below this are replaced by the disclaimer.
    pub min_confidence: f32,
    /// Context used when the caller supplies none.
    pub default_context: String,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.1,
            default_context: DEFAULT_MEDICAL_CONTEXT.to_string(),
        }
    }
}

/// Translation settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Source language of the loaded model.
    pub source_lang: String,
    /// Target language of the loaded model.
    pub target_lang: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            source_lang: "en".to_string(),
            target_lang: "fr".to_string(),
        }
    }
}
