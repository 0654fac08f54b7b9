//! Error types for the summarization pipeline.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can cross the pipeline boundary to the caller.
///
/// Failures of individual page fetches never appear here; the fan-out
/// scheduler absorbs those as [`crate::FetchOutcome`] values. This enum
/// covers request-level outcomes only.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The search provider returned an error.
    #[error("Search provider error: {0}")]
    Search(String),

    /// The search provider returned zero links.
    #[error("Search returned no results; try a different query")]
    NoResults,

    /// Too many page fetches failed and the batch was abandoned.
    #[error("Failed to fetch sufficient data from the internet ({failures} fetches failed); try a more specific query")]
    Aborted {
        /// Number of fetches that had failed when the batch aborted.
        failures: usize,
    },

    /// The request-wide deadline elapsed before a summary was produced.
    #[error("The request took too long to complete; try narrowing your query")]
    DeadlineExceeded,

    /// No readable text could be extracted from any fetched page.
    #[error("No readable content found in the fetched pages")]
    NoContent,

    /// The summarization backend failed.
    #[error("Summarization failed: {0}")]
    Summarize(String),

    /// The request was malformed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),
}
