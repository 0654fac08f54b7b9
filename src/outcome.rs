//! Fetch outcome and batch result types.

use thiserror::Error;

/// A URL handed to the fan-out scheduler.
pub type FetchTarget = String;

/// Text and image extracted from one fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// URL the page was fetched from.
    pub url: String,
    /// Extracted paragraph text.
    pub text: String,
    /// First usable image URL on the page, if any.
    pub image: Option<String>,
}

impl PageText {
    /// Creates a page text record without an image.
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
            image: None,
        }
    }

    /// Sets the image URL.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// Why a single page fetch failed.
///
/// These are data, not faults: the scheduler records them per target and
/// keeps going (or aborts the batch, depending on policy).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// Connection, DNS, TLS or body-read error.
    #[error("transport error: {0}")]
    Transport(String),

    /// Server answered with a non-success status.
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// The page had no extractable paragraph text.
    #[error("no extractable text")]
    NoContent,

    /// The per-fetch timeout elapsed.
    #[error("fetch timed out")]
    TimedOut,
}

/// Terminal result of one fetch in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was fetched and yielded text.
    Success(PageText),
    /// The fetch failed; the cause is recorded.
    Failure {
        /// Target URL that failed.
        target: FetchTarget,
        /// What went wrong.
        cause: FetchFailure,
    },
}

impl FetchOutcome {
    /// Returns true for a successful fetch.
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    /// Returns true for a failed fetch.
    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Returns the target URL this outcome belongs to.
    pub fn target(&self) -> &str {
        match self {
            FetchOutcome::Success(page) => &page.url,
            FetchOutcome::Failure { target, .. } => target,
        }
    }

    /// Returns the extracted page for a success.
    pub fn page(&self) -> Option<&PageText> {
        match self {
            FetchOutcome::Success(page) => Some(page),
            FetchOutcome::Failure { .. } => None,
        }
    }
}

/// How a batch of fetches ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStatus {
    /// Every fetch reached a terminal outcome.
    Completed,
    /// The batch deadline elapsed; resolved outcomes were kept.
    TimedOut,
    /// The failure threshold was hit and remaining fetches were cancelled.
    Aborted(String),
}

impl BatchStatus {
    /// Returns true if the batch ran to natural completion.
    pub fn is_completed(&self) -> bool {
        matches!(self, BatchStatus::Completed)
    }
}

/// Outcomes of a fan-out batch, in input order.
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// Per-target outcomes, ordered as the targets were submitted.
    ///
    /// Under [`BatchStatus::Completed`] there is exactly one entry per
    /// target; under the other statuses only resolved targets appear,
    /// still in submission order.
    pub outcomes: Vec<FetchOutcome>,
    /// How the batch ended.
    pub status: BatchStatus,
    /// Wall time the batch took, in milliseconds.
    pub duration_ms: u64,
}

impl BatchResult {
    /// Iterates over successful pages in outcome order.
    pub fn successes(&self) -> impl Iterator<Item = &PageText> {
        self.outcomes.iter().filter_map(|outcome| outcome.page())
    }

    /// Number of successful fetches.
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of failed fetches.
    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }
}
