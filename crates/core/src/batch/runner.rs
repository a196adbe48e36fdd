//! Bounded-concurrency batch runner.

use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, trace, warn};

use super::config::BatchConfig;
use super::types::{BatchProgress, BatchReport, ItemFailure, PoolStatus};

/// Error type for batch operations.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// One or more items failed; every item still ran to completion.
    #[error(
        "{} of {total} items failed in {label}: {}",
        .failures.len(),
        summarize(.failures)
    )]
    ItemsFailed {
        label: String,
        total: usize,
        failures: Vec<ItemFailure>,
    },
}

fn summarize(failures: &[ItemFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.key, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}

impl BatchReport {
    /// Converts a report with failures into an error.
    pub fn into_result(self, label: &str) -> Result<Vec<String>, BatchError> {
        if self.failures.is_empty() {
            return Ok(self.succeeded);
        }
        Err(BatchError::ItemsFailed {
            label: label.to_string(),
            total: self.total(),
            failures: self.failures,
        })
    }
}

/// Tracks statistics for the worker pool.
#[derive(Default)]
struct PoolStats {
    active: AtomicU64,
    queued: AtomicU64,
    total_processed: AtomicU64,
    total_failed: AtomicU64,
}

impl PoolStats {
    fn to_status(&self, max_concurrent: usize) -> PoolStatus {
        PoolStatus {
            active_jobs: self.active.load(Ordering::Relaxed) as usize,
            max_concurrent,
            queued_jobs: self.queued.load(Ordering::Relaxed) as usize,
            total_processed: self.total_processed.load(Ordering::Relaxed),
            total_failed: self.total_failed.load(Ordering::Relaxed),
        }
    }
}

/// Decrements the active count even if the item panics or is aborted.
struct ActiveGuard(Arc<PoolStats>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.active.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Decrements the queued count once the item leaves the queue.
struct QueuedGuard(Arc<PoolStats>);

impl Drop for QueuedGuard {
    fn drop(&mut self) {
        self.0.queued.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Aborts the item's task when dropped.
///
/// Dropping a batch mid-run drops every item future, so child processes
/// and temporary files owned by those futures are released.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Runs independent items with at most `max_parallel` in flight.
///
/// All items are dispatched up front in order; each waits for a permit.
/// A failing item never cancels its siblings, but dropping the future
/// returned by [`BatchRunner::run`] aborts every item still queued or
/// running.
pub struct BatchRunner {
    max_parallel: usize,
    semaphore: Arc<Semaphore>,
    stats: Arc<PoolStats>,
    progress_tx: Option<mpsc::Sender<BatchProgress>>,
}

impl BatchRunner {
    /// Creates a runner; a limit of zero is raised to one.
    pub fn new(max_parallel: usize) -> Self {
        let max_parallel = max_parallel.max(1);
        Self {
            max_parallel,
            semaphore: Arc::new(Semaphore::new(max_parallel)),
            stats: Arc::new(PoolStats::default()),
            progress_tx: None,
        }
    }

    /// Creates a runner from configuration.
    pub fn from_config(config: &BatchConfig) -> Self {
        Self::new(config.max_parallel)
    }

    /// Sets the channel receiving progress updates.
    pub fn with_progress(mut self, progress_tx: mpsc::Sender<BatchProgress>) -> Self {
        self.progress_tx = Some(progress_tx);
        self
    }

    /// Maximum items in flight.
    pub fn max_parallel(&self) -> usize {
        self.max_parallel
    }

    /// Returns the current pool status.
    pub fn status(&self) -> PoolStatus {
        self.stats.to_status(self.max_parallel)
    }

    fn emit(&self, progress: BatchProgress) {
        if let Some(tx) = &self.progress_tx {
            if let Err(e) = tx.try_send(progress) {
                trace!(error = %e, "Dropped batch progress update");
            }
        }
    }

    /// Runs `work` for every `(key, item)` and waits for all of them.
    ///
    /// Results are reported in dispatch order, regardless of completion
    /// order.
    pub async fn run<T, F, Fut, E>(&self, label: &str, items: Vec<(String, T)>, work: F) -> BatchReport
    where
        F: Fn(T) -> Fut,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let total = items.len();
        info!(label, total, max_parallel = self.max_parallel, "Starting batch");

        let mut handles = Vec::with_capacity(total);
        for (key, item) in items {
            let semaphore = Arc::clone(&self.semaphore);
            let stats = Arc::clone(&self.stats);
            let task = work(item);
            stats.queued.fetch_add(1, Ordering::Relaxed);
            debug!(label, key = %key, "Dispatching item");

            let queued = QueuedGuard(Arc::clone(&stats));
            let handle = tokio::spawn(async move {
                let permit = semaphore.acquire_owned().await;
                drop(queued);
                let Ok(_permit) = permit else {
                    return Err("worker pool closed".to_string());
                };

                stats.active.fetch_add(1, Ordering::Relaxed);
                let _active = ActiveGuard(stats);
                task.await.map_err(|e| e.to_string())
            });
            handles.push((key, AbortOnDrop(handle)));
        }
        self.emit(BatchProgress::Started {
            label: label.to_string(),
            total,
        });

        let mut report = BatchReport::default();
        for (key, mut handle) in handles {
            let outcome = (&mut handle.0)
                .await
                .unwrap_or_else(|e| Err(join_failure(e)));
            match outcome {
                Ok(()) => {
                    self.stats.total_processed.fetch_add(1, Ordering::Relaxed);
                    report.succeeded.push(key.clone());
                    self.emit(BatchProgress::ItemCompleted {
                        label: label.to_string(),
                        key,
                        completed: report.total(),
                        total,
                    });
                }
                Err(error) => {
                    warn!(label, key = %key, error = %error, "Item failed");
                    self.stats.total_failed.fetch_add(1, Ordering::Relaxed);
                    self.emit(BatchProgress::ItemFailed {
                        label: label.to_string(),
                        key: key.clone(),
                        error: error.clone(),
                    });
                    report.failures.push(ItemFailure { key, error });
                }
            }
        }

        info!(
            label,
            succeeded = report.succeeded.len(),
            failed = report.failures.len(),
            "Batch finished"
        );
        self.emit(BatchProgress::Finished {
            label: label.to_string(),
            succeeded: report.succeeded.len(),
            failed: report.failures.len(),
        });
        report
    }
}

fn join_failure(error: JoinError) -> String {
    if !error.is_panic() {
        return error.to_string();
    }
    let payload = error.into_panic();
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("task panicked: {message}")
}
