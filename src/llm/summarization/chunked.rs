//! Chunked summarization for inputs longer than the model accepts.
//!
//! Short inputs go to the model in one call. Long inputs are split into
//! word-bounded chunks, each chunk is summarized, and the summaries are joined;
//! the joined text goes through further chunked passes while it exceeds the
//! token budget. Passes are capped and a pass that fails to shrink the text
//! ends in a word-bounded truncation to the budget.
//!
//! Token counting runs on the blocking pool since encoding a long report is
//! CPU-bound.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::llm::core::config::SummarizerConfig;
use crate::llm::core::errors::{LlmError, LlmResult};
use crate::llm::registry::model_registry::SharedSummarizer;
use crate::llm::registry::pipeline::{SummarizationPipeline, SummaryParams};
use crate::llm::summarization::splitter::split_text;

/// Summarizer that handles text of any length.
#[derive(Clone)]
pub struct ChunkedSummarizer {
    pipeline: SharedSummarizer,
    settings: SummarizerConfig,
}

impl ChunkedSummarizer {
    /// Create a chunked summarizer over `pipeline`.
    #[must_use]
    pub const fn new(pipeline: SharedSummarizer, settings: SummarizerConfig) -> Self {
        Self { pipeline, settings }
    }

    /// Default generation bounds for callers that do not pass their own.
    #[must_use]
    pub const fn default_params(&self) -> SummaryParams {
        SummaryParams::new(
            self.settings.default_max_length,
            self.settings.default_min_length,
        )
    }

    /// Input token budget: model limit minus the generation reserve.
    #[must_use]
    pub fn budget(&self) -> usize {
        self.pipeline
            .model_max_tokens()
            .saturating_sub(self.settings.reserved_generation_tokens)
            .max(1)
    }

    /// Summarize `text`. Missing or blank input yields an empty string without
    /// calling the model.
    ///
    /// # Errors
    /// Returns [`LlmError::InvalidInput`] for inconsistent bounds, or the
    /// pipeline's error if tokenization or inference fails.
    pub async fn summarize(
        &self,
        text: Option<&str>,
        params: SummaryParams,
    ) -> LlmResult<String> {
        let Some(text) = text.filter(|text| !text.trim().is_empty()) else {
            return Ok(String::new());
        };
        validate_params(params)?;

        let budget = self.budget();
        let tokens = self.count_tokens(text.to_string()).await?;
        if tokens <= budget {
            return self.pipeline.summarize(text, params).await;
        }

        debug!("Input has {tokens} tokens, over budget {budget}; summarizing in chunks");

        let mut current = text.to_string();
        let mut current_tokens = tokens;
        for pass in 1..=self.settings.max_passes {
            let combined = self.summarize_chunks(&current).await?;
            let combined_tokens = self.count_tokens(combined.clone()).await?;
            debug!("Pass {pass}: {current_tokens} -> {combined_tokens} tokens");

            if combined_tokens <= budget {
                return Ok(combined);
            }
            if combined_tokens >= current_tokens {
                warn!(
                    "Chunk summaries did not shrink the text \
                     ({current_tokens} -> {combined_tokens} tokens); truncating to {budget}"
                );
                return self.truncate(combined, budget).await;
            }

            current = combined;
            current_tokens = combined_tokens;
        }

        warn!(
            "Summary still has {current_tokens} tokens after {} passes; truncating to {budget}",
            self.settings.max_passes
        );
        self.truncate(current, budget).await
    }

    async fn count_tokens(&self, text: String) -> LlmResult<usize> {
        let pipeline = Arc::clone(&self.pipeline);
        run_blocking(move || pipeline.count_tokens(&text)).await
    }

    async fn truncate(&self, text: String, budget: usize) -> LlmResult<String> {
        let pipeline = Arc::clone(&self.pipeline);
        run_blocking(move || truncate_to_budget(pipeline.as_ref(), &text, budget)).await
    }

    /// One chunked pass: summarize each chunk in order and join with spaces.
    async fn summarize_chunks(&self, text: &str) -> LlmResult<String> {
        let chunks = split_text(text, self.settings.chunk_size_chars);
        let params = SummaryParams::new(
            self.settings.chunk_max_length,
            self.settings.chunk_min_length,
        );
        debug!("Summarizing {} chunks", chunks.len());

        let mut summaries = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            debug!("Chunk {} has {} chars", chunk.position, chunk.char_len());
            summaries.push(self.pipeline.summarize(&chunk.text, params).await?);
        }
        Ok(summaries.join(" "))
    }
}

async fn run_blocking<T, F>(work: F) -> LlmResult<T>
where
    F: FnOnce() -> LlmResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| LlmError::Tokenizer(format!("tokenizer task failed: {e}")))?
}

fn validate_params(params: SummaryParams) -> LlmResult<()> {
    if params.min_length == 0 || params.max_length < params.min_length {
        return Err(LlmError::InvalidInput(format!(
            "max_length ({}) must be >= min_length ({}) and both > 0",
            params.max_length, params.min_length
        )));
    }
    Ok(())
}

/// Longest word prefix of `text` whose token count fits in `budget`.
fn truncate_to_budget(
    pipeline: &dyn SummarizationPipeline,
    text: &str,
    budget: usize,
) -> LlmResult<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let (mut low, mut high) = (0, words.len());
    while low < high {
        let mid = (low + high).div_ceil(2);
        if pipeline.count_tokens(&words[..mid].join(" "))? <= budget {
            low = mid;
        } else {
            high = mid - 1;
        }
    }
    Ok(words[..low].join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::FakeSummarizer;

    fn report(words: usize) -> String {
        (0..words)
            .map(|i| format!("obs{i:05}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn summarizer(fake: &Arc<FakeSummarizer>) -> ChunkedSummarizer {
        ChunkedSummarizer::new(fake.clone(), SummarizerConfig::default())
    }

    #[tokio::test]
    async fn test_empty_input_skips_model() {
        let fake = Arc::new(FakeSummarizer::echo(1024));
        let service = summarizer(&fake);
        let params = service.default_params();

        assert_eq!(service.summarize(None, params).await.unwrap(), "");
        assert_eq!(service.summarize(Some(""), params).await.unwrap(), "");
        assert_eq!(service.summarize(Some("  \n "), params).await.unwrap(), "");
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn test_short_input_single_call_raw_output() {
        let fake = Arc::new(FakeSummarizer::fixed(1024, "  Raw model output.  "));
        let service = summarizer(&fake);

        let summary = service
            .summarize(Some("The patient presented with fever."), SummaryParams::new(150, 50))
            .await
            .unwrap();

        assert_eq!(summary, "  Raw model output.  ");
        let calls = fake.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "The patient presented with fever.");
        assert_eq!(calls[0].1, SummaryParams::new(150, 50));
    }

    #[tokio::test]
    async fn test_budget_boundary_is_inclusive() {
        let fake = Arc::new(FakeSummarizer::fixed(110, "short"));
        let service = summarizer(&fake);
        assert_eq!(service.budget(), 10);

        let summary = service
            .summarize(Some(&report(10)), SummaryParams::new(150, 50))
            .await
            .unwrap();
        assert_eq!(summary, "short");
        assert_eq!(fake.call_count(), 1);
    }

    #[tokio::test]
    async fn test_long_input_joins_chunk_summaries() {
        let fake = Arc::new(FakeSummarizer::new(1024, |text, _| {
            Ok(format!("S{}", text.split_whitespace().count()))
        }));
        let service = summarizer(&fake);
        let text = report(1500);

        let summary = service
            .summarize(Some(&text), SummaryParams::new(150, 50))
            .await
            .unwrap();

        let chunks = split_text(&text, 1000);
        let expected: Vec<String> = chunks
            .iter()
            .map(|chunk| format!("S{}", chunk.text.split_whitespace().count()))
            .collect();
        assert_eq!(summary, expected.join(" "));

        let calls = fake.calls();
        assert_eq!(calls.len(), chunks.len());
        for ((input, params), chunk) in calls.iter().zip(&chunks) {
            assert_eq!(input, &chunk.text);
            assert_eq!(*params, SummaryParams::new(100, 30));
        }
    }

    #[tokio::test]
    async fn test_long_input_recurses_exactly_once() {
        let fake = Arc::new(FakeSummarizer::first_words(1024, 30));
        let service = summarizer(&fake);
        let text = report(5000);
        let budget = service.budget();

        let first_chunks = split_text(&text, 1000);
        let first_pass: Vec<String> = first_chunks
            .iter()
            .map(|chunk| chunk.text.split_whitespace().take(30).collect::<Vec<_>>().join(" "))
            .collect();
        let first_combined = first_pass.join(" ");
        assert!(first_combined.split_whitespace().count() > budget);
        let second_chunks = split_text(&first_combined, 1000);

        let summary = service
            .summarize(Some(&text), SummaryParams::new(150, 50))
            .await
            .unwrap();

        assert_eq!(fake.call_count(), first_chunks.len() + second_chunks.len());
        let final_tokens = summary.split_whitespace().count();
        assert!(!summary.is_empty());
        assert!(final_tokens <= budget);
        assert!(final_tokens < 5000);
    }

    #[tokio::test]
    async fn test_non_shrinking_model_is_truncated() {
        let fake = Arc::new(FakeSummarizer::echo(1024));
        let service = summarizer(&fake);
        let text = report(3000);

        let summary = service
            .summarize(Some(&text), SummaryParams::new(150, 50))
            .await
            .unwrap();

        let words: Vec<&str> = summary.split_whitespace().collect();
        assert_eq!(words.len(), service.budget());
        assert_eq!(words[0], "obs00000");
        assert_eq!(fake.call_count(), split_text(&text, 1000).len());
    }

    #[tokio::test]
    async fn test_pass_cap_truncates() {
        let fake = Arc::new(FakeSummarizer::new(1024, |text, _| {
            let words: Vec<&str> = text.split_whitespace().collect();
            Ok(words[..words.len() - 1].join(" "))
        }));
        let settings = SummarizerConfig {
            max_passes: 2,
            ..SummarizerConfig::default()
        };
        let service = ChunkedSummarizer::new(fake.clone(), settings);

        let summary = service
            .summarize(Some(&report(4000)), SummaryParams::new(150, 50))
            .await
            .unwrap();

        assert_eq!(summary.split_whitespace().count(), service.budget());
    }

    #[tokio::test]
    async fn test_deterministic_and_stable_under_budget() {
        let fake = Arc::new(FakeSummarizer::echo(1024));
        let service = summarizer(&fake);
        let params = SummaryParams::new(150, 50);
        let text = "Blood pressure normal. Continue current medication.";

        let first = service.summarize(Some(text), params).await.unwrap();
        let second = service.summarize(Some(&first), params).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_invalid_params_rejected() {
        let fake = Arc::new(FakeSummarizer::echo(1024));
        let service = summarizer(&fake);

        let err = service
            .summarize(Some("text"), SummaryParams::new(10, 50))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::InvalidInput(_)));
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn test_inference_error_propagates() {
        let fake = Arc::new(FakeSummarizer::failing(1024));
        let service = summarizer(&fake);

        let err = service
            .summarize(Some(&report(2000)), SummaryParams::new(150, 50))
            .await
            .unwrap_err();
        assert!(err.is_inference_failure());
        assert_eq!(fake.call_count(), 1);
    }

    #[tokio::test]
    async fn test_token_counting_leaves_runtime_thread() {
        let fake = Arc::new(FakeSummarizer::echo(1024));
        let service = summarizer(&fake);

        service
            .summarize(Some(&report(3000)), SummaryParams::new(150, 50))
            .await
            .unwrap();

        let runtime_thread = std::thread::current().id();
        let threads = fake.count_threads();
        assert!(!threads.is_empty());
        assert!(threads.iter().all(|id| *id != runtime_thread));
    }

    #[test]
    fn test_truncate_to_budget() {
        let fake = FakeSummarizer::echo(1024);
        assert_eq!(truncate_to_budget(&fake, "a b c d e", 3).unwrap(), "a b c");
        assert_eq!(truncate_to_budget(&fake, "a b", 5).unwrap(), "a b");
        assert_eq!(truncate_to_budget(&fake, "a b", 0).unwrap(), "");
    }
}
