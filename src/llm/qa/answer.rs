//! Medical question answering with a confidence floor.

use serde::Serialize;

use crate::llm::core::config::AnswerConfig;
use crate::llm::core::errors::{LlmError, LlmResult};
use crate::llm::registry::model_registry::SharedQuestionAnswerer;

/// Returned instead of answers the model is not confident about.
pub const LOW_CONFIDENCE_DISCLAIMER: &str = "I don't have enough information to answer that \
question accurately. Please consult with a medical professional for specific medical advice.";

/// Result of answering a question.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnswerOutcome {
    /// The model's answer span, verbatim.
    Answered {
        /// Answer text.
        answer: String,
        /// Model confidence.
        score: f32,
    },
    /// Confidence fell below the floor; the disclaimer replaces the answer.
    LowConfidence {
        /// Model confidence.
        score: f32,
    },
}

impl AnswerOutcome {
    /// Text to show the user.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Answered { answer, .. } => answer,
            Self::LowConfidence { .. } => LOW_CONFIDENCE_DISCLAIMER,
        }
    }

    /// Model confidence behind this outcome.
    #[must_use]
    pub const fn score(&self) -> f32 {
        match self {
            Self::Answered { score, .. } | Self::LowConfidence { score } => *score,
        }
    }

    /// Whether the disclaimer was substituted.
    #[must_use]
    pub const fn is_low_confidence(&self) -> bool {
        matches!(self, Self::LowConfidence { .. })
    }
}

/// Answers questions against a supplied or built-in context.
#[derive(Clone)]
pub struct AnswerService {
    pipeline: SharedQuestionAnswerer,
    settings: AnswerConfig,
}

impl AnswerService {
    /// Create an answer service over `pipeline`.
    #[must_use]
    pub const fn new(pipeline: SharedQuestionAnswerer, settings: AnswerConfig) -> Self {
        Self { pipeline, settings }
    }

    /// Answer `question`, using the default context when none (or a blank one) is given.
    ///
    /// # Errors
    /// Returns [`LlmError::InvalidInput`] for a blank question, or the
    /// pipeline's error if inference fails.
    pub async fn answer(&self, question: &str, context: Option<&str>) -> LlmResult<AnswerOutcome> {
        if question.trim().is_empty() {
            return Err(LlmError::InvalidInput("question must not be empty".to_string()));
        }

        let context = context
            .filter(|context| !context.trim().is_empty())
            .unwrap_or(self.settings.default_context.as_str());

        let result = self.pipeline.answer(question, context).await?;
        if result.score < self.settings.min_confidence {
            return Ok(AnswerOutcome::LowConfidence {
                score: result.score,
            });
        }

        Ok(AnswerOutcome::Answered {
            answer: result.answer,
            score: result.score,
        })
    }
}
