//! Summarizer trait and shared text segmentation helpers.

use async_trait::async_trait;

use crate::Result;

/// Trait for condensing a cleaned corpus into a summary.
///
/// Implementations receive the full corpus, the query it was gathered
/// for, and a target length in words. Errors surface as
/// [`crate::PipelineError::Summarize`].
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarizes the corpus in roughly `length` words.
    async fn summarize(&self, corpus: &str, query: &str, length: u32) -> Result<String>;

    /// Short backend name, used in logs.
    fn name(&self) -> &'static str;
}

/// Counts whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Splits text into sentences at `.`, `!` and `?` boundaries.
///
/// Naive on abbreviations and decimals, which is fine for scraped prose;
/// the consumers only need rough sentence units.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        }
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    sentences
}

/// Packs sentences into chunks of at most `max_words` words each.
///
/// Sentences are never split across chunks unless a single sentence
/// exceeds the budget on its own, in which case it is hard-split on
/// word boundaries.
pub fn split_into_chunks(text: &str, max_words: usize) -> Vec<String> {
    let max_words = max_words.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_words = 0usize;

    for sentence in split_sentences(text) {
        let words = word_count(&sentence);

        if words > max_words {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_words = 0;
            }
            let tokens: Vec<&str> = sentence.split_whitespace().collect();
            for window in tokens.chunks(max_words) {
                chunks.push(window.join(" "));
            }
            continue;
        }

        if current_words + words > max_words && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_words = 0;
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&sentence);
        current_words += words;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
