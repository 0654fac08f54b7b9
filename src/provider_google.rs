//! Google Programmable Search provider.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::PipelineError;
use crate::provider::{SearchHit, SearchProvider};
use crate::Result;

const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Search provider backed by the Google Custom Search JSON API.
pub struct GoogleSearch {
    client: Client,
    api_key: String,
    engine_id: String,
    endpoint: String,
}

impl GoogleSearch {
    /// Creates a provider for the given API key and engine id.
    pub fn new(api_key: impl Into<String>, engine_id: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent("Mozilla/5.0 (compatible; webbrief/0.1)")
                .build()
                .expect("Failed to create HTTP client"),
            api_key: api_key.into(),
            engine_id: engine_id.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Overrides the API endpoint, for tests and proxies.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Uses a custom reqwest client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    async fn request_items(
        &self,
        query: &str,
        limit: usize,
        image_search: bool,
    ) -> Result<Vec<SearchItem>> {
        // the API rejects num outside 1..=10
        let num = limit.clamp(1, 10).to_string();
        let mut params = vec![
            ("key", self.api_key.as_str()),
            ("cx", self.engine_id.as_str()),
            ("q", query),
            ("num", num.as_str()),
        ];
        if image_search {
            params.push(("searchType", "image"));
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Search(format!(
                "search API returned HTTP {status}"
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Search(format!("unexpected search response: {e}")))?;

        debug!(
            "Search returned {} items for {:?} (images: {})",
            body.items.len(),
            query,
            image_search
        );
        Ok(body.items)
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    link: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
}

#[async_trait]
impl SearchProvider for GoogleSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let items = self.request_items(query, limit, false).await?;
        let hits = items
            .into_iter()
            .filter_map(|item| {
                item.link
                    .map(|link| SearchHit::new(link, item.title, item.snippet))
            })
            .take(limit)
            .collect();
        Ok(hits)
    }

    async fn search_images(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        let items = self.request_items(query, limit, true).await?;
        let urls = items
            .into_iter()
            .filter_map(|item| item.link)
            .take(limit)
            .collect();
        Ok(urls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_google_search_new() {
        let provider = GoogleSearch::new("key", "cx");
        assert_eq!(provider.api_key, "key");
        assert_eq!(provider.engine_id, "cx");
        assert_eq!(provider.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_google_search_with_endpoint() {
        let provider = GoogleSearch::new("key", "cx").with_endpoint("http://127.0.0.1:9/v1");
        assert_eq!(provider.endpoint, "http://127.0.0.1:9/v1");
    }

    #[test]
    fn test_search_response_deserialization_with_items() {
        let json = r#"{
            "kind": "customsearch#search",
            "items": [
                {"link": "https://a.example", "title": "A", "snippet": "about a"},
                {"link": "https://b.example", "title": "B", "snippet": "about b"}
            ]
        }"#;
        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.items.len(), 2);
        assert_eq!(response.items[0].link.as_deref(), Some("https://a.example"));
        assert_eq!(response.items[1].title, "B");
    }

    #[test]
    fn test_search_response_deserialization_without_items() {
        let json = r#"{"kind": "customsearch#search", "searchInformation": {"totalResults": "0"}}"#;
        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert!(response.items.is_empty());
    }

    #[test]
    fn test_search_item_tolerates_missing_fields() {
        let json = r#"{"items": [{"link": "https://a.example"}, {"title": "no link"}]}"#;
        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.items.len(), 2);
        assert!(response.items[0].snippet.is_empty());
        assert!(response.items[1].link.is_none());
    }
}
