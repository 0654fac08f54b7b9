//! HTTP-based page fetcher using reqwest.

use async_trait::async_trait;
use reqwest::Client;

use crate::extract;
use crate::fetcher::PageFetcher;
use crate::outcome::{FetchFailure, PageText};

/// A page fetcher that retrieves HTML over plain HTTP and extracts
/// paragraph text from it.
///
/// Timeouts are not applied here; the fan-out scheduler wraps each
/// fetch in its own per-fetch timeout.
pub struct HttpFetcher {
    client: Client,
    max_text_bytes: usize,
}

impl HttpFetcher {
    /// Creates a new `HttpFetcher` with default settings.
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .user_agent("Mozilla/5.0 (compatible; webbrief/0.1)")
                .build()
                .expect("Failed to create HTTP client"),
            max_text_bytes: extract::DEFAULT_MAX_BYTES,
        }
    }

    /// Creates an `HttpFetcher` with a custom reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            max_text_bytes: extract::DEFAULT_MAX_BYTES,
        }
    }

    /// Sets the maximum bytes of paragraph text kept per page.
    pub fn with_max_text_bytes(mut self, max_text_bytes: usize) -> Self {
        self.max_text_bytes = max_text_bytes;
        self
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<PageText, FetchFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(transport_failure)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::HttpStatus(status.as_u16()));
        }

        let html = response.text().await.map_err(transport_failure)?;
        extract::extract_page(&html, url, self.max_text_bytes).ok_or(FetchFailure::NoContent)
    }
}

fn transport_failure(err: reqwest::Error) -> FetchFailure {
    if err.is_timeout() {
        FetchFailure::TimedOut
    } else {
        FetchFailure::Transport(err.to_string())
    }
}
