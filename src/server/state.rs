//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::llm::LlmService;
use crate::llm::core::config::LlmConfig;
use crate::llm::core::errors::LlmResult;

/// Shared application state.
pub struct AppState {
    /// Language-model facade.
    pub llm: LlmService,
}

impl AppState {
    /// Wrap an already-built facade.
    #[must_use]
    pub fn from_service(llm: LlmService) -> Arc<Self> {
        Arc::new(Self { llm })
    }

    /// Load all models and create the application state.
    ///
    /// # Errors
    /// Returns an error if model loading fails under strict startup.
    pub async fn new(config: &LlmConfig) -> LlmResult<Arc<Self>> {
        let llm = LlmService::load(config).await?;
        Ok(Self::from_service(llm))
    }
}
