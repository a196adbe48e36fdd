//! Types for the batch module.

use serde::{Deserialize, Serialize};

/// Status of the batch worker pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolStatus {
    /// Number of items currently running.
    pub active_jobs: usize,
    /// Maximum concurrent items.
    pub max_concurrent: usize,
    /// Number of items waiting for a permit.
    pub queued_jobs: usize,
    /// Total items finished successfully since creation.
    pub total_processed: u64,
    /// Total items failed since creation.
    pub total_failed: u64,
}

/// One failed item of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFailure {
    /// Key the item was dispatched under.
    pub key: String,
    /// Human readable failure, including any tool diagnostics.
    pub error: String,
}

/// Outcome of a whole batch, in dispatch order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Keys of items that finished successfully.
    pub succeeded: Vec<String>,
    /// Items that failed.
    pub failures: Vec<ItemFailure>,
}

impl BatchReport {
    /// Total number of items in the batch.
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failures.len()
    }

    /// Whether every item succeeded.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Progress update for a running batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchProgress {
    /// All items dispatched.
    Started { label: String, total: usize },
    /// An item finished.
    ItemCompleted {
        label: String,
        key: String,
        completed: usize,
        total: usize,
    },
    /// An item failed.
    ItemFailed {
        label: String,
        key: String,
        error: String,
    },
    /// Every item has finished.
    Finished {
        label: String,
        succeeded: usize,
        failed: usize,
    },
}
