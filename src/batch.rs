//! Concurrent fetch scheduling.
//!
//! Fans a list of target URLs out over an async fetcher and collects one
//! terminal outcome per target, in input order, under a configurable abort
//! policy, a per-fetch timeout and an optional batch-wide deadline.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{timeout, timeout_at, Duration, Instant};
use tracing::{debug, warn};

use crate::fetcher::PageFetcher;
use crate::outcome::{BatchResult, BatchStatus, FetchOutcome, FetchTarget};

/// Default failed-fetch count at which a batch aborts.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

/// Default per-fetch timeout.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// How the scheduler reacts to failed fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPolicy {
    /// Abort the batch once `threshold` fetches have failed, cancelling
    /// whatever is still in flight.
    FailFast {
        /// Failed-fetch count that triggers the abort; zero is treated
        /// as one.
        threshold: u32,
    },
    /// Wait for every fetch to reach a terminal outcome, however many fail.
    BestEffort,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self::FailFast {
            threshold: DEFAULT_FAILURE_THRESHOLD,
        }
    }
}

/// Schedules batches of page fetches over a shared fetcher.
///
/// Individual fetch failures are absorbed as [`FetchOutcome::Failure`]
/// entries; the batch itself only distinguishes the terminal states in
/// [`BatchStatus`]. Outcomes always come back in the order the targets
/// were submitted, regardless of completion order.
pub struct BatchFetcher {
    fetcher: Arc<dyn PageFetcher>,
    policy: FetchPolicy,
    fetch_timeout: Duration,
    concurrency: Option<usize>,
    discard_on_abort: bool,
}

impl BatchFetcher {
    /// Creates a scheduler with the default policy and timeouts.
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            policy: FetchPolicy::default(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            concurrency: None,
            discard_on_abort: true,
        }
    }

    /// Sets the abort policy.
    pub fn with_policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the per-fetch timeout.
    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Caps the number of fetches in flight at once. Unbounded by default.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    /// Controls what happens to in-flight fetches when a batch aborts.
    ///
    /// `true` (the default) cancels them and drops anything they would
    /// have produced; `false` lets them finish and keeps their outcomes.
    pub fn with_discard_on_abort(mut self, discard_on_abort: bool) -> Self {
        self.discard_on_abort = discard_on_abort;
        self
    }

    /// Fetches every target and returns the outcomes in input order.
    pub async fn run(&self, targets: &[FetchTarget]) -> BatchResult {
        self.run_inner(targets, None).await
    }

    /// Like [`BatchFetcher::run`], but gives up at `deadline`.
    ///
    /// When the deadline elapses the batch returns immediately with
    /// [`BatchStatus::TimedOut`], keeping whatever outcomes had already
    /// resolved. The deadline wins over the per-fetch timeout and over
    /// any pending abort salvage.
    pub async fn run_until(&self, targets: &[FetchTarget], deadline: Instant) -> BatchResult {
        self.run_inner(targets, Some(deadline)).await
    }

    async fn run_inner(&self, targets: &[FetchTarget], deadline: Option<Instant>) -> BatchResult {
        let start = Instant::now();
        let mut slots: Vec<Option<FetchOutcome>> = vec![None; targets.len()];

        debug!("Fetching {} pages", targets.len());

        let semaphore = self.concurrency.map(|n| Arc::new(Semaphore::new(n)));
        let mut tasks: JoinSet<(usize, FetchOutcome)> = JoinSet::new();
        for (index, target) in targets.iter().enumerate() {
            let fetcher = Arc::clone(&self.fetcher);
            let semaphore = semaphore.clone();
            let target = target.clone();
            let fetch_timeout = self.fetch_timeout;

            tasks.spawn(async move {
                let _permit = match semaphore {
                    Some(s) => s.acquire_owned().await.ok(),
                    None => None,
                };
                let outcome = fetch_one(fetcher.as_ref(), target, fetch_timeout).await;
                (index, outcome)
            });
        }

        let mut failures = 0usize;
        let mut status = BatchStatus::Completed;

        loop {
            let joined = match deadline {
                Some(d) => match timeout_at(d, tasks.join_next()).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        let resolved = slots.iter().filter(|s| s.is_some()).count();
                        warn!(
                            "Batch deadline elapsed with {} of {} fetches resolved",
                            resolved,
                            targets.len()
                        );
                        status = BatchStatus::TimedOut;
                        tasks.abort_all();
                        break;
                    }
                },
                None => tasks.join_next().await,
            };

            let Some(joined) = joined else {
                break;
            };

            match joined {
                Ok((index, outcome)) => {
                    if let FetchOutcome::Failure { target, cause } = &outcome {
                        debug!("Fetch failed for {}: {}", target, cause);
                        failures += 1;
                    }
                    slots[index] = Some(outcome);

                    if let FetchPolicy::FailFast { threshold } = self.policy {
                        let threshold = (threshold as usize).max(1);
                        if failures >= threshold {
                            warn!("Aborting batch after {} failed fetches", failures);
                            status = BatchStatus::Aborted(format!(
                                "failure threshold ({threshold}) exceeded"
                            ));
                            if self.discard_on_abort {
                                tasks.abort_all();
                            } else {
                                drain_remaining(&mut tasks, &mut slots, deadline).await;
                            }
                            break;
                        }
                    }
                }
                Err(join_err) => {
                    if !join_err.is_cancelled() {
                        warn!("Fetch task panicked: {}", join_err);
                    }
                }
            }
        }

        let outcomes: Vec<FetchOutcome> = slots.into_iter().flatten().collect();
        BatchResult {
            outcomes,
            status,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}

/// Runs one fetch under the per-fetch timeout and records the result.
async fn fetch_one(
    fetcher: &dyn PageFetcher,
    target: FetchTarget,
    fetch_timeout: Duration,
) -> FetchOutcome {
    match timeout(fetch_timeout, fetcher.fetch(&target)).await {
        Ok(Ok(page)) => FetchOutcome::Success(page),
        Ok(Err(cause)) => FetchOutcome::Failure { target, cause },
        Err(_) => FetchOutcome::Failure {
            target,
            cause: crate::outcome::FetchFailure::TimedOut,
        },
    }
}

/// Waits out the remaining fetches after an abort and keeps their
/// outcomes. Still bounded by the batch deadline when one is set.
async fn drain_remaining(
    tasks: &mut JoinSet<(usize, FetchOutcome)>,
    slots: &mut [Option<FetchOutcome>],
    deadline: Option<Instant>,
) {
    loop {
        let joined = match deadline {
            Some(d) => match timeout_at(d, tasks.join_next()).await {
                Ok(joined) => joined,
                Err(_) => {
                    tasks.abort_all();
                    break;
                }
            },
            None => tasks.join_next().await,
        };

        let Some(joined) = joined else {
            break;
        };
        if let Ok((index, outcome)) = joined {
            slots[index] = Some(outcome);
        }
    }
}
