//! Tokenizer loading for registry handles.
//!
//! Tokenizers are fetched from the Hugging Face Hub alongside their
//! `tokenizer_config.json`, which declares the model's input limit.

use hf_hub::api::tokio::Api;
use serde::Deserialize;
use tokenizers::Tokenizer;
use tracing::debug;

use crate::llm::core::errors::{LlmError, LlmResult};

/// Tokenizer file in a model repository.
const TOKENIZER_FILE: &str = "tokenizer.json";
/// Tokenizer settings file in a model repository.
const TOKENIZER_CONFIG_FILE: &str = "tokenizer_config.json";
/// Values above this are "unbounded" sentinels rather than real limits.
const MAX_LENGTH_SENTINEL: usize = 1_000_000;

#[derive(Deserialize)]
struct TokenizerSettings {
    model_max_length: Option<f64>,
}

/// Tokenizer plus the model input limit it was published with.
#[derive(Clone)]
pub struct TokenizerHandle {
    tokenizer: Tokenizer,
    model_max_tokens: usize,
}

impl TokenizerHandle {
    /// Download and build the tokenizer for `model_id`.
    ///
    /// # Errors
    /// Returns an error if the files cannot be downloaded or parsed.
    pub async fn from_hub(
        api: &Api,
        model_id: &str,
        fallback_max_tokens: usize,
    ) -> LlmResult<Self> {
        let repo = api.model(model_id.to_string());
        let tokenizer_path = repo.get(TOKENIZER_FILE).await?;
        let tokenizer_bytes = tokio::fs::read(&tokenizer_path).await?;

        let declared = match repo.get(TOKENIZER_CONFIG_FILE).await {
            Ok(path) => parse_model_max_length(&tokio::fs::read_to_string(path).await?)?,
            Err(err) => {
                debug!("No {TOKENIZER_CONFIG_FILE} for {model_id}: {err}");
                None
            }
        };

        Self::from_bytes(&tokenizer_bytes, declared.unwrap_or(fallback_max_tokens))
    }

    /// Build a tokenizer from serialized `tokenizer.json` bytes.
    ///
    /// Truncation and padding are disabled so token counts reflect the whole input.
    ///
    /// # Errors
    /// Returns an error if the bytes are not a valid tokenizer.
    pub fn from_bytes(bytes: &[u8], model_max_tokens: usize) -> LlmResult<Self> {
        let mut tokenizer =
            Tokenizer::from_bytes(bytes).map_err(|e| LlmError::Tokenizer(e.to_string()))?;
        tokenizer
            .with_truncation(None)
            .map_err(|e| LlmError::Tokenizer(e.to_string()))?;
        tokenizer.with_padding(None);

        Ok(Self {
            tokenizer,
            model_max_tokens,
        })
    }

    /// Number of tokens in `text`, special tokens included.
    ///
    /// # Errors
    /// Returns an error if encoding fails.
    pub fn count_tokens(&self, text: &str) -> LlmResult<usize> {
        self.tokenizer
            .encode(text, true)
            .map(|encoding| encoding.len())
            .map_err(|e| LlmError::Tokenizer(e.to_string()))
    }

    /// Model input limit in tokens.
    #[must_use]
    pub const fn model_max_tokens(&self) -> usize {
        self.model_max_tokens
    }
}

/// Read `model_max_length` from a `tokenizer_config.json` document.
fn parse_model_max_length(raw: &str) -> LlmResult<Option<usize>> {
    let settings: TokenizerSettings = serde_json::from_str(raw)?;
    Ok(settings
        .model_max_length
        .filter(|value| value.is_finite() && *value >= 1.0)
        .and_then(|value| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let limit = value as usize;
            (limit <= MAX_LENGTH_SENTINEL).then_some(limit)
        }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORD_LEVEL_TOKENIZER: &str = r#"{
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": null,
        "pre_tokenizer": {"type": "Whitespace"},
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": {"[UNK]": 0, "the": 1, "patient": 2, "is": 3, "stable": 4},
            "unk_token": "[UNK]"
        }
    }"#;

    #[test]
    fn test_parse_model_max_length() {
        assert_eq!(
            parse_model_max_length(r#"{"model_max_length": 1024}"#).unwrap(),
            Some(1024)
        );
        assert_eq!(
            parse_model_max_length(r#"{"model_max_length": 1e30}"#).unwrap(),
            None
        );
        assert_eq!(parse_model_max_length(r#"{"do_lower_case": false}"#).unwrap(), None);
        assert!(parse_model_max_length("not json").is_err());
    }

    #[test]
    fn test_count_tokens_without_truncation() {
        let handle = TokenizerHandle::from_bytes(WORD_LEVEL_TOKENIZER.as_bytes(), 4).unwrap();
        assert_eq!(handle.model_max_tokens(), 4);
        assert_eq!(handle.count_tokens("the patient is stable").unwrap(), 4);
        assert_eq!(
            handle
                .count_tokens("the patient is stable the patient is stable")
                .unwrap(),
            8
        );
    }

    #[test]
    fn test_invalid_tokenizer_bytes() {
        assert!(matches!(
            TokenizerHandle::from_bytes(b"{}", 512),
            Err(LlmError::Tokenizer(_))
        ));
    }
}
