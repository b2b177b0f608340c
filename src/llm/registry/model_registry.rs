//! Model registry: loads one pretrained model per task at startup.
//!
//! Loading is one-time and fail-fast. A task whose model cannot be loaded is
//! recorded as [`Availability::Unavailable`] so consumers can refuse the
//! feature up front instead of failing on every call.

use std::sync::Arc;
use std::time::Instant;

use hf_hub::api::tokio::{Api, ApiBuilder};
use tracing::{info, warn};

use crate::llm::core::config::LlmConfig;
use crate::llm::core::device::ComputeDevice;
use crate::llm::core::errors::{LlmError, LlmResult};
use crate::llm::core::task::Task;
use crate::llm::registry::client::InferenceClient;
use crate::llm::registry::handle::{
    ModelHandle, QuestionAnsweringHandle, SummarizationHandle, TranslationHandle,
};
use crate::llm::registry::pipeline::{
    QuestionAnsweringPipeline, SummarizationPipeline, SummaryParams, TranslationPipeline,
};
use crate::llm::registry::tokenizer::TokenizerHandle;

/// Whether a task's model was loaded.
#[derive(Clone, Debug)]
pub enum Availability<T> {
    /// The model is loaded and ready.
    Available(T),
    /// The model failed to load; holds the reason.
    Unavailable(String),
}

impl<T> Availability<T> {
    /// Whether the task can be served.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// Reason the task is unavailable, if it is.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Available(_) => None,
            Self::Unavailable(reason) => Some(reason),
        }
    }

    /// Borrow the loaded value, or fail with [`LlmError::Unavailable`] for `task`.
    ///
    /// # Errors
    /// Returns an error if the task was not loaded.
    pub fn require(&self, task: Task) -> LlmResult<&T> {
        match self {
            Self::Available(value) => Ok(value),
            Self::Unavailable(reason) => Err(LlmError::Unavailable {
                task,
                reason: reason.clone(),
            }),
        }
    }

    /// Map the loaded value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Availability<U> {
        match self {
            Self::Available(value) => Availability::Available(f(value)),
            Self::Unavailable(reason) => Availability::Unavailable(reason),
        }
    }
}

/// Decide what a load result means for startup.
///
/// A failure aborts under `strict`, otherwise the task is disabled with the
/// error text as its reason.
///
/// # Errors
/// Returns the load error unchanged when `strict` is set.
pub fn settle<T>(result: LlmResult<T>, task: Task, strict: bool) -> LlmResult<Availability<T>> {
    match result {
        Ok(value) => Ok(Availability::Available(value)),
        Err(err) if strict => Err(err),
        Err(err) => {
            warn!("{task} disabled: {err}");
            Ok(Availability::Unavailable(err.to_string()))
        }
    }
}

/// Shared summarization pipeline.
pub type SharedSummarizer = Arc<dyn SummarizationPipeline>;
/// Shared question answering pipeline.
pub type SharedQuestionAnswerer = Arc<dyn QuestionAnsweringPipeline>;
/// Shared translation pipeline.
pub type SharedTranslator = Arc<dyn TranslationPipeline>;

/// Loaded pipelines, one per task, all on the same device.
pub struct ModelRegistry {
    device: ComputeDevice,
    summarization: Availability<SharedSummarizer>,
    question_answering: Availability<SharedQuestionAnswerer>,
    translation: Availability<SharedTranslator>,
}

impl ModelRegistry {
    /// Assemble a registry from already-built pipelines.
    #[must_use]
    pub const fn from_parts(
        device: ComputeDevice,
        summarization: Availability<SharedSummarizer>,
        question_answering: Availability<SharedQuestionAnswerer>,
        translation: Availability<SharedTranslator>,
    ) -> Self {
        Self {
            device,
            summarization,
            question_answering,
            translation,
        }
    }

    /// Resolve the device and load every task's model.
    ///
    /// A failed task is marked unavailable unless `strict_startup` is set.
    ///
    /// # Errors
    /// Returns the first load error when `strict_startup` is set, or an error
    /// if the hub client cannot be built.
    pub async fn load_all(config: &LlmConfig) -> LlmResult<Self> {
        let device = ComputeDevice::resolve(config.device);
        info!("Using compute device: {device}");

        let loader = ModelLoader::new(config, device)?;

        let summarization = loader
            .load_checked(Task::Summarization)
            .await?
            .map(|handle| Arc::new(SummarizationHandle(handle)) as SharedSummarizer);
        let question_answering = loader
            .load_checked(Task::QuestionAnswering)
            .await?
            .map(|handle| Arc::new(QuestionAnsweringHandle(handle)) as SharedQuestionAnswerer);
        let translation = loader
            .load_checked(Task::Translation)
            .await?
            .map(|handle| Arc::new(TranslationHandle(handle)) as SharedTranslator);

        Ok(Self::from_parts(
            device,
            summarization,
            question_answering,
            translation,
        ))
    }

    /// Device all models were loaded on.
    #[must_use]
    pub const fn device(&self) -> ComputeDevice {
        self.device
    }

    /// Summarization pipeline.
    #[must_use]
    pub const fn summarization(&self) -> &Availability<SharedSummarizer> {
        &self.summarization
    }

    /// Question answering pipeline.
    #[must_use]
    pub const fn question_answering(&self) -> &Availability<SharedQuestionAnswerer> {
        &self.question_answering
    }

    /// Translation pipeline.
    #[must_use]
    pub const fn translation(&self) -> &Availability<SharedTranslator> {
        &self.translation
    }
}

/// Loads model handles for the configured tasks.
pub struct ModelLoader<'a> {
    config: &'a LlmConfig,
    api: Api,
    device: ComputeDevice,
}

impl<'a> ModelLoader<'a> {
    /// Create a loader using the configured hub token.
    ///
    /// The inference server's token is never sent to the hub.
    ///
    /// # Errors
    /// Returns an error if the hub client cannot be built.
    pub fn new(config: &'a LlmConfig, device: ComputeDevice) -> LlmResult<Self> {
        let mut builder = ApiBuilder::new();
        if let Some(token) = &config.models.hub_token {
            builder = builder.with_token(Some(token.clone()));
        }
        Ok(Self {
            config,
            api: builder.build()?,
            device,
        })
    }

    /// Load the model for `task`: tokenizer, inference client, and warm-up call.
    ///
    /// # Errors
    /// Returns [`LlmError::ModelLoad`] if any step fails. No retries are made.
    pub async fn load(&self, task: Task) -> LlmResult<ModelHandle> {
        let model_id = self.config.models.model_for(task);
        let started = Instant::now();

        let handle = self
            .build(task, model_id)
            .await
            .map_err(|err| LlmError::model_load(task, model_id, &err))?;

        info!(
            "Loaded {task} model {model_id} on {} ({} max tokens, endpoint {}) in {}ms",
            handle.device(),
            handle.model_max_tokens(),
            handle.client().endpoint(),
            started.elapsed().as_millis()
        );
        Ok(handle)
    }

    async fn load_checked(&self, task: Task) -> LlmResult<Availability<ModelHandle>> {
        settle(self.load(task).await, task, self.config.strict_startup)
    }

    async fn build(&self, task: Task, model_id: &str) -> LlmResult<ModelHandle> {
        let tokenizer = TokenizerHandle::from_hub(
            &self.api,
            model_id,
            self.config.summarizer.fallback_model_max_tokens,
        )
        .await?;
        let client = InferenceClient::new(&self.config.inference, model_id, self.device)?;

        if self.config.inference.warmup {
            warm_up(&client, task).await?;
        }

        Ok(ModelHandle::new(
            task,
            model_id.to_string(),
            self.device,
            tokenizer,
            client,
        ))
    }
}

/// Issue one minimal request so the server loads the weights before traffic.
async fn warm_up(client: &InferenceClient, task: Task) -> LlmResult<()> {
    match task {
        Task::Summarization => {
            client
                .summarize("The patient is stable.", SummaryParams::new(8, 1))
                .await?;
        }
        Task::QuestionAnswering => {
            client
                .answer("Who is stable?", "The patient is stable.")
                .await?;
        }
        Task::Translation => {
            client.translate("The patient is stable.").await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::{FakeQa, FakeSummarizer, FakeTranslator};

    #[test]
    fn test_availability_require() {
        let available: Availability<u8> = Availability::Available(7);
        assert_eq!(*available.require(Task::Summarization).unwrap(), 7);
        assert!(available.reason().is_none());

        let missing: Availability<u8> = Availability::Unavailable("no weights".to_string());
        let err = missing.require(Task::Translation).unwrap_err();
        assert!(matches!(err, LlmError::Unavailable { task: Task::Translation, .. }));
        assert_eq!(missing.reason(), Some("no weights"));
    }

    fn load_failure() -> LlmError {
        LlmError::model_load(
            Task::Summarization,
            "facebook/bart-large-cnn",
            &LlmError::Inference("server down".to_string()),
        )
    }

    #[test]
    fn test_settle_loaded_model() {
        let settled = settle(Ok(3_u8), Task::Translation, true).unwrap();
        assert!(settled.is_available());
        assert_eq!(*settled.require(Task::Translation).unwrap(), 3);
    }

    #[test]
    fn test_settle_degrades_failed_task() {
        let settled: Availability<u8> =
            settle(Err(load_failure()), Task::Summarization, false).unwrap();
        assert!(!settled.is_available());

        let reason = settled.reason().unwrap();
        assert_eq!(reason, load_failure().to_string());
        assert!(reason.contains("failed to load facebook/bart-large-cnn for summarization"));
        assert!(reason.contains("server down"));

        let err = settled.require(Task::Summarization).unwrap_err();
        assert!(matches!(err, LlmError::Unavailable { task: Task::Summarization, .. }));
    }

    #[test]
    fn test_settle_strict_aborts() {
        let err = settle::<u8>(Err(load_failure()), Task::Summarization, true).unwrap_err();
        assert!(matches!(
            err,
            LlmError::ModelLoad { task: Task::Summarization, ref model, .. }
                if model == "facebook/bart-large-cnn"
        ));
    }

    #[test]
    fn test_registry_from_parts() {
        let registry = ModelRegistry::from_parts(
            ComputeDevice::Cpu,
            Availability::Available(Arc::new(FakeSummarizer::echo(1024)) as SharedSummarizer),
            Availability::Available(
                Arc::new(FakeQa::new("answer", 0.9)) as SharedQuestionAnswerer,
            ),
            Availability::Unavailable("translation model missing".to_string()),
        );
        assert_eq!(registry.device(), ComputeDevice::Cpu);
        assert!(registry.summarization().is_available());
        assert!(registry.question_answering().is_available());
        assert!(!registry.translation().is_available());

        let translator: Availability<SharedTranslator> =
            Availability::Available(Arc::new(FakeTranslator::new("bonjour")));
        assert!(translator.is_available());
    }
}
