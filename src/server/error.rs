//! Mapping of language-model errors onto HTTP responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{debug, error};

use crate::llm::core::errors::LlmError;
use crate::llm::core::task::Task;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Message for request bodies that are not valid JSON for the endpoint.
pub const INVALID_BODY_MESSAGE: &str = "Request body must be a JSON object";

/// Error returned by API handlers, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// A 400 response with `message`.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Map an error from `task` onto a status and a user-facing message.
    ///
    /// Inference failures are logged and reported generically.
    #[must_use]
    pub fn from_llm(task: Task, err: &LlmError) -> Self {
        let feature = task.feature_name();
        match err {
            LlmError::InvalidInput(message) => Self::bad_request(message.clone()),
            LlmError::Unavailable { .. } => Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                message: format!("{feature} functionality is not available"),
            },
            other => {
                error!("{task} request failed: {other}");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: format!("{feature} error"),
                }
            }
        }
    }

    /// HTTP status of this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!("Rejected request body: {rejection}");
        Self::bad_request(INVALID_BODY_MESSAGE)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let unavailable = LlmError::Unavailable {
            task: Task::Summarization,
            reason: "not loaded".to_string(),
        };
        let err = ApiError::from_llm(Task::Summarization, &unavailable);
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.message, "Summarization functionality is not available");

        let err = ApiError::from_llm(
            Task::QuestionAnswering,
            &LlmError::Inference("CUDA out of memory".to_string()),
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Chat error");

        let err = ApiError::from_llm(
            Task::Translation,
            &LlmError::InvalidInput("bad".to_string()),
        );
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
