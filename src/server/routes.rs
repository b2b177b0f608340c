//! HTTP route handlers for the clinical language-model API.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::llm::core::task::Task;

use super::error::ApiError;
use super::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/summarize", post(summarize_report))
        .route("/api/chat", post(chat))
        .route("/api/translate", post(translate_text))
        .with_state(state)
}

/// Health check endpoint, including which models are loaded and why any are not.
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let unavailable: serde_json::Map<String, serde_json::Value> = state
        .llm
        .unavailable()
        .into_iter()
        .map(|(task, reason)| (task.as_str().to_string(), reason.into()))
        .collect();

    Json(serde_json::json!({
        "status": "ok",
        "service": "clinical-llm",
        "version": env!("CARGO_PKG_VERSION"),
        "device": state.llm.device(),
        "capabilities": state.llm.capabilities(),
        "unavailable": unavailable,
    }))
}

/// Report summarization request.
#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    /// Report text to summarize.
    pub text: Option<String>,
    /// Maximum summary length in tokens.
    pub max_length: Option<usize>,
    /// Minimum summary length in tokens.
    pub min_length: Option<usize>,
}

/// Report summarization response.
#[derive(Debug, Serialize)]
pub struct SummarizeResponse {
    /// Generated summary.
    pub summary: String,
}

/// Summarize a medical report.
async fn summarize_report(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let Json(request) = payload?;
    let text = non_blank(request.text.as_deref())
        .ok_or_else(|| ApiError::bad_request("No text provided"))?;

    let summary = state
        .llm
        .summarize(Some(text), request.max_length, request.min_length)
        .await
        .map_err(|e| ApiError::from_llm(Task::Summarization, &e))?;

    Ok(Json(SummarizeResponse { summary }))
}

/// Chat (question answering) request.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's question.
    pub query: Option<String>,
    /// Optional passage to answer from.
    pub context: Option<String>,
}

/// Chat response.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// Answer or disclaimer.
    pub response: String,
    /// Whether the disclaimer replaced a low-confidence answer.
    pub low_confidence: bool,
    /// Model confidence.
    pub score: f32,
}

/// Answer a medical question.
async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload?;
    let query = non_blank(request.query.as_deref())
        .ok_or_else(|| ApiError::bad_request("No query provided"))?;

    let outcome = state
        .llm
        .answer(query, request.context.as_deref())
        .await
        .map_err(|e| ApiError::from_llm(Task::QuestionAnswering, &e))?;

    Ok(Json(ChatResponse {
        response: outcome.text().to_string(),
        low_confidence: outcome.is_low_confidence(),
        score: outcome.score(),
    }))
}

/// Translation request.
#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    /// Text to translate.
    pub text: Option<String>,
    /// Source language code (default `en`).
    pub source_lang: Option<String>,
    /// Target language code (default `fr`).
    pub target_lang: Option<String>,
}

/// Translation response.
#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    /// Translation or the unsupported-pair message.
    pub translated_text: String,
    /// Whether the language pair is served.
    pub supported: bool,
}

/// Translate text.
async fn translate_text(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TranslateRequest>, JsonRejection>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let Json(request) = payload?;
    let text = non_blank(request.text.as_deref())
        .ok_or_else(|| ApiError::bad_request("No text provided"))?;

    let outcome = state
        .llm
        .translate(
            text,
            request.source_lang.as_deref(),
            request.target_lang.as_deref(),
        )
        .await
        .map_err(|e| ApiError::from_llm(Task::Translation, &e))?;

    Ok(Json(TranslateResponse {
        translated_text: outcome.text().to_string(),
        supported: outcome.is_supported(),
    }))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}
