//! Pipeline tasks served by the model registry.
//!
//! Each task maps to exactly one pretrained model. The identifiers are stable
//! `kebab-case` strings matching the inference server's task names.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A recognized pipeline task.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Task {
    /// Abstractive summarization.
    Summarization,
    /// Extractive question answering over a context passage.
    QuestionAnswering,
    /// Machine translation for the supported language pair.
    Translation,
}

impl Task {
    /// All tasks, in load order.
    pub const ALL: [Self; 3] = [Self::Summarization, Self::QuestionAnswering, Self::Translation];

    /// Stable string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Summarization => "summarization",
            Self::QuestionAnswering => "question-answering",
            Self::Translation => "translation",
        }
    }

    /// Human-facing feature name used in API error messages.
    #[must_use]
    pub const fn feature_name(self) -> &'static str {
        match self {
            Self::Summarization => "Summarization",
            Self::QuestionAnswering => "Chat",
            Self::Translation => "Translation",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_names() {
        assert_eq!(Task::QuestionAnswering.to_string(), "question-answering");
        assert_eq!(Task::QuestionAnswering.feature_name(), "Chat");
        assert_eq!(Task::ALL[0], Task::Summarization);
    }

    #[test]
    fn test_task_serde_names() {
        let json = serde_json::to_string(&Task::QuestionAnswering).unwrap();
        assert_eq!(json, "\"question-answering\"");
    }
}
