//! Chunked summarization of arbitrarily long text.

pub mod chunked;
pub mod splitter;

pub use chunked::ChunkedSummarizer;
pub use splitter::{TextChunk, split_text};
