//! HTTP client for the pipeline server.
//!
//! The server follows the Hugging Face task API: each model is served under
//! `{base_url}/models/{model_id}` and takes `{"inputs", "parameters", "options"}`.
//! Responses per task:
//! - summarization: `[{"summary_text": "..."}]`
//! - question answering: `{"answer": "...", "score": 0.9, "start": 0, "end": 4}`
//! - translation: `[{"translation_text": "..."}]`

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::llm::core::config::InferenceConfig;
use crate::llm::core::device::ComputeDevice;
use crate::llm::core::errors::{LlmError, LlmResult};
use crate::llm::registry::pipeline::{QaResult, SummaryParams};

#[derive(Serialize)]
struct InferenceOptions {
    use_gpu: bool,
    wait_for_model: bool,
}

#[derive(Serialize)]
struct InferenceRequest<I: Serialize, P: Serialize> {
    inputs: I,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<P>,
    options: InferenceOptions,
}

#[derive(Serialize)]
struct SummarizationParameters {
    max_length: usize,
    min_length: usize,
    do_sample: bool,
}

#[derive(Serialize)]
struct QaInputs<'a> {
    question: &'a str,
    context: &'a str,
}

#[derive(Deserialize)]
struct SummaryOutput {
    summary_text: String,
}

#[derive(Deserialize)]
struct TranslationOutput {
    translation_text: String,
}

#[derive(Deserialize)]
struct QaOutput {
    answer: String,
    score: f32,
}

/// Client bound to one model on the pipeline server.
#[derive(Clone)]
pub struct InferenceClient {
    http: Client,
    endpoint: Url,
    api_token: Option<String>,
    device: ComputeDevice,
}

impl InferenceClient {
    /// Create a client for `model_id`.
    ///
    /// # Errors
    /// Returns an error if the endpoint URL is invalid or the HTTP client cannot be built.
    pub fn new(config: &InferenceConfig, model_id: &str, device: ComputeDevice) -> LlmResult<Self> {
        let http = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            http,
            endpoint: model_endpoint(&config.base_url, model_id)?,
            api_token: config.api_token.clone(),
            device,
        })
    }

    /// Endpoint this client posts to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Run a summarization request with deterministic decoding.
    ///
    /// # Errors
    /// Returns an error if the request fails or the response is malformed.
    pub async fn summarize(&self, text: &str, params: SummaryParams) -> LlmResult<String> {
        let parameters = SummarizationParameters {
            max_length: params.max_length,
            min_length: params.min_length,
            do_sample: false,
        };
        let outputs: Vec<SummaryOutput> = self.post(text, Some(parameters)).await?;
        first(outputs).map(|output| output.summary_text)
    }

    /// Run a question answering request.
    ///
    /// # Errors
    /// Returns an error if the request fails or the response is malformed.
    pub async fn answer(&self, question: &str, context: &str) -> LlmResult<QaResult> {
        let inputs = QaInputs { question, context };
        let output: QaOutput = self.post(inputs, None::<()>).await?;
        Ok(QaResult {
            answer: output.answer,
            score: output.score,
        })
    }

    /// Run a translation request.
    ///
    /// # Errors
    /// Returns an error if the request fails or the response is malformed.
    pub async fn translate(&self, text: &str) -> LlmResult<String> {
        let outputs: Vec<TranslationOutput> = self.post(text, None::<()>).await?;
        first(outputs).map(|output| output.translation_text)
    }

    async fn post<I, P, R>(&self, inputs: I, parameters: Option<P>) -> LlmResult<R>
    where
        I: Serialize + Send,
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        let body = InferenceRequest {
            inputs,
            parameters,
            options: InferenceOptions {
                use_gpu: self.device.is_accelerator(),
                wait_for_model: true,
            },
        };

        let mut request = self.http.post(self.endpoint.clone()).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(LlmError::InferenceStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn first<T>(outputs: Vec<T>) -> LlmResult<T> {
    outputs
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::Inference("pipeline server returned no outputs".to_string()))
}

/// Build `{base_url}/models/{model_id}`, keeping any path prefix on the base.
fn model_endpoint(base_url: &str, model_id: &str) -> LlmResult<Url> {
    let base = if base_url.ends_with('/') {
        Url::parse(base_url)?
    } else {
        Url::parse(&format!("{base_url}/"))?
    };
    Ok(base.join(&format!("models/{model_id}"))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_endpoint() {
        let url = model_endpoint("http://127.0.0.1:8080", "facebook/bart-large-cnn").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/models/facebook/bart-large-cnn");

        let url = model_endpoint("https://host/pipelines/", "t5-small").unwrap();
        assert_eq!(url.as_str(), "https://host/pipelines/models/t5-small");
    }

    #[test]
    fn test_summarization_request_body() {
        let body = InferenceRequest {
            inputs: "long report",
            parameters: Some(SummarizationParameters {
                max_length: 150,
                min_length: 50,
                do_sample: false,
            }),
            options: InferenceOptions {
                use_gpu: false,
                wait_for_model: true,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["inputs"], "long report");
        assert_eq!(json["parameters"]["max_length"], 150);
        assert_eq!(json["parameters"]["do_sample"], false);
        assert_eq!(json["options"]["use_gpu"], false);
    }

    #[test]
    fn test_qa_request_omits_parameters() {
        let body = InferenceRequest {
            inputs: QaInputs {
                question: "What is medicine?",
                context: "Medicine is...",
            },
            parameters: None::<()>,
            options: InferenceOptions {
                use_gpu: true,
                wait_for_model: true,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["inputs"]["question"], "What is medicine?");
        assert!(json.get("parameters").is_none());
        assert_eq!(json["options"]["use_gpu"], true);
    }

    #[test]
    fn test_response_shapes() {
        let summaries: Vec<SummaryOutput> =
            serde_json::from_str(r#"[{"summary_text": "Stable patient."}]"#).unwrap();
        assert_eq!(first(summaries).unwrap().summary_text, "Stable patient.");

        let qa: QaOutput = serde_json::from_str(
            r#"{"answer": "surgery", "score": 0.42, "start": 10, "end": 17}"#,
        )
        .unwrap();
        assert_eq!(qa.answer, "surgery");

        let empty: Vec<TranslationOutput> = serde_json::from_str("[]").unwrap();
        assert!(matches!(first(empty), Err(LlmError::Inference(_))));
    }
}
