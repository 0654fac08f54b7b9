//! Offline extractive summarizer.
//!
//! Scores sentences by word frequency and reassembles the highest-scoring
//! ones in their original order. No network, deterministic; serves as the
//! fallback backend when no Gemini key is configured, and keeps tests
//! hermetic.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::PipelineError;
use crate::summarizer::{split_sentences, word_count, Summarizer};
use crate::Result;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "had", "has", "have",
    "he", "her", "his", "if", "in", "is", "it", "its", "not", "of", "on", "or", "she", "that",
    "the", "their", "them", "then", "there", "these", "they", "this", "to", "was", "were", "what",
    "when", "which", "who", "will", "with", "you",
];

/// Weight multiplier for words that appear in the query.
const QUERY_BOOST: f64 = 3.0;

/// Frequency-based extractive summarizer.
#[derive(Debug, Default)]
pub struct ExtractiveSummarizer;

impl ExtractiveSummarizer {
    /// Creates a new extractive summarizer.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Summarizer for ExtractiveSummarizer {
    async fn summarize(&self, corpus: &str, query: &str, length: u32) -> Result<String> {
        let sentences = split_sentences(corpus);
        if sentences.is_empty() {
            return Err(PipelineError::Summarize(
                "nothing to summarize".to_string(),
            ));
        }

        let query_terms: Vec<String> = tokenize(query).collect();
        let mut frequencies: HashMap<String, f64> = HashMap::new();
        for sentence in &sentences {
            for token in tokenize(sentence) {
                *frequencies.entry(token).or_insert(0.0) += 1.0;
            }
        }
        for term in &query_terms {
            if let Some(weight) = frequencies.get_mut(term) {
                *weight *= QUERY_BOOST;
            }
        }

        let mut ranked: Vec<(usize, f64)> = sentences
            .iter()
            .enumerate()
            .map(|(index, sentence)| (index, score_sentence(sentence, &frequencies)))
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        let budget = length.max(1) as usize;
        let mut selected = Vec::new();
        let mut words = 0usize;
        for (index, _) in ranked {
            selected.push(index);
            words += word_count(&sentences[index]);
            if words >= budget {
                break;
            }
        }
        selected.sort_unstable();

        let summary = selected
            .into_iter()
            .map(|index| sentences[index].as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Ok(summary)
    }

    fn name(&self) -> &'static str {
        "extractive"
    }
}

/// Lowercase alphanumeric tokens, stopwords and single letters removed.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace().filter_map(|word| {
        let token: String = word
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        if token.len() < 2 || STOPWORDS.contains(&token.as_str()) {
            None
        } else {
            Some(token)
        }
    })
}

/// Mean token weight, so long sentences do not win by length alone.
fn score_sentence(sentence: &str, frequencies: &HashMap<String, f64>) -> f64 {
    let tokens: Vec<String> = tokenize(sentence).collect();
    if tokens.is_empty() {
        return 0.0;
    }
    let total: f64 = tokens
        .iter()
        .map(|token| frequencies.get(token).copied().unwrap_or(0.0))
        .sum();
    total / tokens.len() as f64
}
