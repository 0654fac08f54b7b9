//! Search provider abstraction.

use async_trait::async_trait;

use crate::Result;

/// One search result link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Result URL.
    pub url: String,
    /// Result title.
    pub title: String,
    /// Result snippet.
    pub snippet: String,
}

impl SearchHit {
    /// Creates a new search hit.
    pub fn new(url: impl Into<String>, title: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            snippet: snippet.into(),
        }
    }
}

/// Trait for search backends that turn a query into links.
///
/// This seam is what the pipeline fans out over; anything that can map a
/// query string to URLs can stand in for the hosted API.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Searches the web and returns up to `limit` hits.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>>;

    /// Searches for images and returns up to `limit` image URLs.
    async fn search_images(&self, query: &str, limit: usize) -> Result<Vec<String>>;
}
