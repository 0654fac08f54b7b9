//! # webbrief
//!
//! A web research and summarization service.
//!
//! Given a query, webbrief asks a search provider for matching links, fans
//! out over them concurrently to extract readable text, cleans and joins
//! what survives, and condenses the corpus with a summarizer backend:
//!
//! - Concurrent page fetching with per-fetch and request-wide deadlines
//! - Fail-fast or best-effort failure policies
//! - Gemini-backed or local extractive summarization
//! - An axum HTTP surface (`POST /summarize`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use webbrief::{BatchFetcher, ExtractiveSummarizer, GoogleSearch, HttpFetcher, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let provider = GoogleSearch::new("api-key", "engine-id");
//!     let batch = BatchFetcher::new(Arc::new(HttpFetcher::new()));
//!     let pipeline = Pipeline::new(
//!         Arc::new(provider),
//!         batch,
//!         Arc::new(ExtractiveSummarizer::new()),
//!     );
//!
//!     let brief = pipeline.run("rust programming", 100).await?;
//!     println!("{}", brief.summary);
//!     Ok(())
//! }
//! ```

mod error;
mod config;
mod outcome;
mod fetcher;
mod fetcher_http;
mod extract;
mod batch;
mod normalize;
mod corpus;
mod provider;
mod provider_google;
mod summarizer;
mod pipeline;

pub mod server;
pub mod summarizers;

pub use error::{PipelineError, Result};
pub use config::Config;
pub use outcome::{BatchResult, BatchStatus, FetchFailure, FetchOutcome, FetchTarget, PageText};
pub use fetcher::PageFetcher;
pub use fetcher_http::HttpFetcher;
pub use batch::{BatchFetcher, FetchPolicy};
pub use provider::{SearchHit, SearchProvider};
pub use provider_google::GoogleSearch;
pub use summarizer::Summarizer;
pub use summarizers::{ExtractiveSummarizer, GeminiSummarizer};
pub use pipeline::{Brief, Pipeline};
