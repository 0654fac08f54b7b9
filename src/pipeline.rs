//! Request pipeline: search, fan out, clean, summarize.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tokio::time::{timeout_at, Duration, Instant};
use tracing::{debug, info, warn};

use crate::batch::BatchFetcher;
use crate::corpus;
use crate::error::{PipelineError, Result};
use crate::normalize;
use crate::outcome::{BatchStatus, FetchTarget};
use crate::provider::SearchProvider;
use crate::summarizer::Summarizer;

/// Default request-wide deadline.
pub const DEFAULT_GLOBAL_TIMEOUT: Duration = Duration::from_secs(30);

/// The final artifact of a summarize request.
#[derive(Debug, Clone, Serialize)]
pub struct Brief {
    /// Summary text.
    pub summary: String,
    /// Image URLs related to the query.
    pub image_urls: Vec<String>,
}

/// End-to-end summarization pipeline.
///
/// Turns a query into links via the search provider, fans the links out
/// over the batch fetcher, cleans and joins the extracted text, and hands
/// the corpus to the summarizer. The optional global deadline spans
/// everything from the search call through image collection.
pub struct Pipeline {
    provider: Arc<dyn SearchProvider>,
    batch: BatchFetcher,
    summarizer: Arc<dyn Summarizer>,
    max_links: usize,
    image_count: usize,
    global_timeout: Option<Duration>,
    summary_file: Option<PathBuf>,
}

impl Pipeline {
    /// Creates a pipeline over the given components.
    pub fn new(
        provider: Arc<dyn SearchProvider>,
        batch: BatchFetcher,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        Self {
            provider,
            batch,
            summarizer,
            max_links: 10,
            image_count: 3,
            global_timeout: Some(DEFAULT_GLOBAL_TIMEOUT),
            summary_file: None,
        }
    }

    /// Sets how many search links are fetched per request.
    pub fn with_max_links(mut self, max_links: usize) -> Self {
        self.max_links = max_links;
        self
    }

    /// Sets how many image URLs are returned per request.
    pub fn with_image_count(mut self, image_count: usize) -> Self {
        self.image_count = image_count;
        self
    }

    /// Sets the request-wide deadline. `None` disables it.
    pub fn with_global_timeout(mut self, global_timeout: Option<Duration>) -> Self {
        self.global_timeout = global_timeout;
        self
    }

    /// Mirrors each summary to the given file.
    pub fn with_summary_file(mut self, summary_file: PathBuf) -> Self {
        self.summary_file = Some(summary_file);
        self
    }

    /// Runs the full pipeline for one query.
    pub async fn run(&self, query: &str, length: u32) -> Result<Brief> {
        let query = query.trim();
        if query.is_empty() {
            return Err(PipelineError::InvalidRequest(
                "query cannot be empty".to_string(),
            ));
        }
        if length == 0 {
            return Err(PipelineError::InvalidRequest(
                "length must be at least 1".to_string(),
            ));
        }

        let started = Instant::now();
        let deadline = self.global_timeout.map(|t| started + t);
        info!("Summarizing {:?} (about {} words)", query, length);

        let hits = self
            .within(deadline, self.provider.search(query, self.max_links))
            .await?;
        let links: Vec<FetchTarget> = hits.into_iter().map(|hit| hit.url).collect();
        if links.is_empty() {
            return Err(PipelineError::NoResults);
        }
        debug!("Found {} links", links.len());

        let batch = match deadline {
            Some(d) => self.batch.run_until(&links, d).await,
            None => self.batch.run(&links).await,
        };
        debug!(
            "Fetched {} of {} pages in {}ms",
            batch.success_count(),
            links.len(),
            batch.duration_ms
        );

        if let BatchStatus::Aborted(reason) = &batch.status {
            debug!("Batch aborted: {}", reason);
            return Err(PipelineError::Aborted {
                failures: batch.failure_count(),
            });
        }
        // zero successes is a no-content failure whether the batch
        // completed or timed out; only an abort is reported differently
        if batch.success_count() == 0 {
            return Err(PipelineError::NoContent);
        }

        let page_images = corpus::page_images(&batch);
        let cleaned = normalize::clean_text(&corpus::joined_text(&batch));
        if cleaned.is_empty() {
            return Err(PipelineError::NoContent);
        }

        debug!("Summarizing with {} backend", self.summarizer.name());
        let summary = self
            .within(deadline, self.summarizer.summarize(&cleaned, query, length))
            .await?;

        if let Some(path) = &self.summary_file {
            if let Err(e) = tokio::fs::write(path, &summary).await {
                warn!("Failed to record summary to {}: {}", path.display(), e);
            }
        }

        let image_urls = self.collect_images(deadline, query, page_images).await;

        info!(
            "Summarized {:?} in {}ms",
            query,
            started.elapsed().as_millis()
        );
        Ok(Brief {
            summary,
            image_urls,
        })
    }

    /// Bounds a pipeline stage by the remaining deadline.
    async fn within<T>(
        &self,
        deadline: Option<Instant>,
        stage: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match deadline {
            Some(d) => match timeout_at(d, stage).await {
                Ok(result) => result,
                Err(_) => Err(PipelineError::DeadlineExceeded),
            },
            None => stage.await,
        }
    }

    /// Looks up query images, falling back to images found on the fetched
    /// pages. Image search failures, deadline expiry included, never fail
    /// the request.
    async fn collect_images(
        &self,
        deadline: Option<Instant>,
        query: &str,
        page_images: Vec<String>,
    ) -> Vec<String> {
        if self.image_count == 0 {
            return Vec::new();
        }

        let lookup = self.provider.search_images(query, self.image_count);
        let mut images = match self.within(deadline, lookup).await {
            Ok(urls) => urls,
            Err(e) => {
                warn!("Image search failed: {}", e);
                Vec::new()
            }
        };
        if images.is_empty() {
            images = page_images;
        }
        images.truncate(self.image_count);
        images
    }
}
