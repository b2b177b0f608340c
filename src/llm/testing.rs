//! In-memory pipeline fakes for unit tests.
//!
//! Token counts are whitespace word counts so budgets are easy to reason about.

use std::sync::Mutex;
use std::thread::{self, ThreadId};

use crate::llm::core::errors::{LlmError, LlmResult};
use crate::llm::registry::pipeline::{
    InferenceFuture, QaResult, QuestionAnsweringPipeline, SummarizationPipeline, SummaryParams,
    TranslationPipeline,
};

type SummaryFn = Box<dyn Fn(&str, SummaryParams) -> LlmResult<String> + Send + Sync>;

/// Summarizer fake that records every call.
pub struct FakeSummarizer {
    max_tokens: usize,
    output: SummaryFn,
    calls: Mutex<Vec<(String, SummaryParams)>>,
    count_threads: Mutex<Vec<ThreadId>>,
}

impl FakeSummarizer {
    pub fn new(
        max_tokens: usize,
        output: impl Fn(&str, SummaryParams) -> LlmResult<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            max_tokens,
            output: Box::new(output),
            calls: Mutex::new(Vec::new()),
            count_threads: Mutex::new(Vec::new()),
        }
    }

    /// Returns its input unchanged.
    pub fn echo(max_tokens: usize) -> Self {
        Self::new(max_tokens, |text, _| Ok(text.to_string()))
    }

    /// Returns the first `words` words of its input.
    pub fn first_words(max_tokens: usize, words: usize) -> Self {
        Self::new(max_tokens, move |text, _| {
            Ok(text.split_whitespace().take(words).collect::<Vec<_>>().join(" "))
        })
    }

    /// Always returns `output`.
    pub fn fixed(max_tokens: usize, output: &str) -> Self {
        let output = output.to_string();
        Self::new(max_tokens, move |_, _| Ok(output.clone()))
    }

    /// Always fails with an inference error.
    pub fn failing(max_tokens: usize) -> Self {
        Self::new(max_tokens, |_, _| {
            Err(LlmError::Inference("CUDA out of memory".to_string()))
        })
    }

    pub fn calls(&self) -> Vec<(String, SummaryParams)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Threads that ran `count_tokens`, in call order.
    pub fn count_threads(&self) -> Vec<ThreadId> {
        self.count_threads.lock().unwrap().clone()
    }
}

impl SummarizationPipeline for FakeSummarizer {
    fn count_tokens(&self, text: &str) -> LlmResult<usize> {
        self.count_threads.lock().unwrap().push(thread::current().id());
        Ok(text.split_whitespace().count())
    }

    fn model_max_tokens(&self) -> usize {
        self.max_tokens
    }

    fn summarize(
        &self,
        text: &str,
        params: SummaryParams,
    ) -> InferenceFuture<'_, LlmResult<String>> {
        self.calls.lock().unwrap().push((text.to_string(), params));
        let result = (self.output)(text, params);
        Box::pin(async move { result })
    }
}

/// Question answering fake with a fixed answer and score.
pub struct FakeQa {
    answer: String,
    score: f32,
    contexts: Mutex<Vec<String>>,
}

impl FakeQa {
    pub fn new(answer: &str, score: f32) -> Self {
        Self {
            answer: answer.to_string(),
            score,
            contexts: Mutex::new(Vec::new()),
        }
    }

    /// Contexts passed to the model, in call order.
    pub fn contexts(&self) -> Vec<String> {
        self.contexts.lock().unwrap().clone()
    }
}

impl QuestionAnsweringPipeline for FakeQa {
    fn answer(&self, _question: &str, context: &str) -> InferenceFuture<'_, LlmResult<QaResult>> {
        self.contexts.lock().unwrap().push(context.to_string());
        let result = QaResult {
            answer: self.answer.clone(),
            score: self.score,
        };
        Box::pin(async move { Ok(result) })
    }
}

/// Translation fake with a fixed output.
pub struct FakeTranslator {
    output: String,
    inputs: Mutex<Vec<String>>,
}

impl FakeTranslator {
    pub fn new(output: &str) -> Self {
        Self {
            output: output.to_string(),
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.inputs.lock().unwrap().len()
    }
}

impl TranslationPipeline for FakeTranslator {
    fn translate(&self, text: &str) -> InferenceFuture<'_, LlmResult<String>> {
        self.inputs.lock().unwrap().push(text.to_string());
        let output = self.output.clone();
        Box::pin(async move { Ok(output) })
    }
}
