//! Page fetcher abstraction for retrieving and extracting page content.

use async_trait::async_trait;

use crate::outcome::{FetchFailure, PageText};

/// Trait for fetching a URL and extracting its readable content.
///
/// Implementations return [`FetchFailure`] rather than a request-level
/// error: a failed page is data for the fan-out scheduler to record, not
/// a fault that should surface to the caller. All configuration
/// (user-agent, extraction limits) is set at construction time; `fetch`
/// is a simple URL-in, page-out interface.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the URL and extracts its paragraph text and first image.
    async fn fetch(&self, url: &str) -> Result<PageText, FetchFailure>;
}
