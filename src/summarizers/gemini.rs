//! Gemini summarization backend.

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::PipelineError;
use crate::summarizer::{split_into_chunks, word_count, Summarizer};
use crate::Result;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

/// Corpora above this many words are condensed chunk by chunk before the
/// final summarization pass.
const DEFAULT_MAX_CORPUS_WORDS: usize = 6_000;
const DEFAULT_CHUNK_WORDS: usize = 2_000;
const CHUNK_SUMMARY_WORDS: u32 = 150;

/// Summarizer backed by the Gemini generateContent API.
pub struct GeminiSummarizer {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    max_corpus_words: usize,
    chunk_words: usize,
}

impl GeminiSummarizer {
    /// Creates a summarizer for the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_corpus_words: DEFAULT_MAX_CORPUS_WORDS,
            chunk_words: DEFAULT_CHUNK_WORDS,
        }
    }

    /// Sets the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the API base URL, for tests and proxies.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Uses a custom reqwest client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Sets the corpus size above which chunked condensing kicks in, and
    /// the word budget per chunk.
    pub fn with_chunking(mut self, max_corpus_words: usize, chunk_words: usize) -> Self {
        self.max_corpus_words = max_corpus_words;
        self.chunk_words = chunk_words.max(1);
        self
    }

    fn endpoint_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Runs one generateContent call and returns the candidate text.
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::Summarize(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Summarize(format!(
                "Gemini API returned HTTP {status}"
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Summarize(format!("unexpected response: {e}")))?;

        first_candidate_text(&body).ok_or_else(|| {
            PipelineError::Summarize("no candidates found in the response".to_string())
        })
    }

    /// Condenses an oversized corpus by summarizing each chunk, tolerating
    /// individual chunk failures as long as at least one succeeds.
    async fn condense(&self, corpus: &str, query: &str) -> Result<String> {
        let chunks = split_into_chunks(corpus, self.chunk_words);
        debug!(
            "Corpus of {} words exceeds {}; condensing {} chunks",
            word_count(corpus),
            self.max_corpus_words,
            chunks.len()
        );

        let futures: Vec<_> = chunks
            .iter()
            .map(|chunk| {
                let prompt = build_prompt(chunk, query, CHUNK_SUMMARY_WORDS);
                async move { self.generate(&prompt).await }
            })
            .collect();

        let mut condensed = Vec::new();
        for (index, partial) in join_all(futures).await.into_iter().enumerate() {
            match partial {
                Ok(text) => condensed.push(text),
                Err(e) => warn!("Chunk {} summarization failed: {}", index, e),
            }
        }

        if condensed.is_empty() {
            return Err(PipelineError::Summarize(
                "all chunk summarizations failed".to_string(),
            ));
        }
        Ok(condensed.join("\n"))
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    async fn summarize(&self, corpus: &str, query: &str, length: u32) -> Result<String> {
        let text = if word_count(corpus) > self.max_corpus_words {
            self.condense(corpus, query).await?
        } else {
            corpus.to_string()
        };

        let summary = self.generate(&build_prompt(&text, query, length)).await?;
        let summary = summary.trim().to_string();
        if summary.is_empty() {
            return Err(PipelineError::Summarize("empty summary".to_string()));
        }
        Ok(summary)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

fn build_prompt(data: &str, query: &str, length: u32) -> String {
    format!(
        "You are an expert summarizer tasked with condensing information from multiple sources.\n\
         \n\
         ### Instructions:\n\
         - Query: \"{query}\"\n\
         - Data: aggregated from various websites, presented below.\n\
         \n\
         ### Data from the Internet:\n\
         {data}\n\
         \n\
         ### Requirements:\n\
         - Length: approximately {length} words.\n\
         - Emphasis: prioritize information corroborated by multiple sources; assign greater weight to frequently mentioned details.\n\
         - Relevance: if data appears inconsistent or irrelevant to the query, use your expertise to keep the summary pertinent.\n\
         - Format: plain text without special characters or HTML tags.\n\
         - Clarity: ensure the summary is coherent and easily understandable.\n\
         \n\
         Begin your summary below:"
    )
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Joins the text parts of the first candidate, if any.
fn first_candidate_text(response: &GenerateResponse) -> Option<String> {
    let content = response.candidates.first()?.content.as_ref()?;
    let parts: Vec<&str> = content
        .parts
        .iter()
        .filter_map(|part| part.text.as_deref())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_defaults() {
        let summarizer = GeminiSummarizer::new("key");
        assert_eq!(summarizer.model, DEFAULT_MODEL);
        assert_eq!(summarizer.base_url, DEFAULT_BASE_URL);
        assert_eq!(summarizer.name(), "gemini");
    }

    #[test]
    fn test_endpoint_url() {
        let summarizer = GeminiSummarizer::new("key")
            .with_base_url("http://127.0.0.1:9/")
            .with_model("gemini-pro");
        assert_eq!(
            summarizer.endpoint_url(),
            "http://127.0.0.1:9/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn test_build_prompt_mentions_query_and_length() {
        let prompt = build_prompt("Some data.", "rust language", 120);
        assert!(prompt.contains("\"rust language\""));
        assert!(prompt.contains("approximately 120 words"));
        assert!(prompt.contains("Some data."));
    }

    #[test]
    fn test_request_serialization_shape() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: "hello" }],
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
    }

    #[test]
    fn test_response_parse_extracts_candidate_text() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "A summary."}], "role": "model"}, "finishReason": "STOP"}
            ]
        }"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(first_candidate_text(&response).as_deref(), Some("A summary."));
    }

    #[test]
    fn test_response_parse_joins_multiple_parts() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "Part one."}, {"text": "Part two."}]}}
            ]
        }"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            first_candidate_text(&response).as_deref(),
            Some("Part one.\nPart two.")
        );
    }

    #[test]
    fn test_response_parse_no_candidates() {
        let json = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert!(first_candidate_text(&response).is_none());
    }

    #[test]
    fn test_response_parse_candidate_without_text() {
        let json = r#"{"candidates": [{"content": {"parts": []}}]}"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert!(first_candidate_text(&response).is_none());
    }

    #[test]
    fn test_with_chunking_floors_chunk_words() {
        let summarizer = GeminiSummarizer::new("key").with_chunking(100, 0);
        assert_eq!(summarizer.chunk_words, 1);
        assert_eq!(summarizer.max_corpus_words, 100);
    }
}
