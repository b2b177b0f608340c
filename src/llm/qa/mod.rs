//! Question answering over a context passage.

pub mod answer;

pub use answer::{AnswerOutcome, AnswerService, LOW_CONFIDENCE_DISCLAIMER};
