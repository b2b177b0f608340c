//! Word-bounded text splitting for chunked summarization.

/// An ordered, word-bounded slice of the input text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TextChunk {
    /// Position of the chunk in the sequence.
    pub position: usize,
    /// Words of the chunk joined by single spaces.
    pub text: String,
}

impl TextChunk {
    /// Character length of the chunk text.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Split `text` into chunks of at most `max_chunk_chars` characters.
///
/// Each word costs its character length plus one separator. Words are never
/// split, so a single word longer than the limit becomes a chunk of its own.
#[must_use]
pub fn split_text(text: &str, max_chunk_chars: usize) -> Vec<TextChunk> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_size = 0;

    for word in text.split_whitespace() {
        let cost = word.chars().count() + 1;
        if !current.is_empty() && current_size + cost > max_chunk_chars {
            push_chunk(&mut chunks, &current);
            current.clear();
            current_size = 0;
        }
        current.push(word);
        current_size += cost;
    }

    if !current.is_empty() {
        push_chunk(&mut chunks, &current);
    }

    chunks
}

fn push_chunk(chunks: &mut Vec<TextChunk>, words: &[&str]) {
    chunks.push(TextChunk {
        position: chunks.len(),
        text: words.join(" "),
    });
}
