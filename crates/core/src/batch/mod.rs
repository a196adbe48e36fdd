//! Batch module: runs independent items with bounded concurrency.
//!
//! The `BatchRunner` dispatches every item at once and gates execution with
//! a semaphore. It waits for all items and reports each outcome; one
//! failure never cancels the rest. Progress can be observed through a
//! channel.
//!
//! # Example
//!
//! ```ignore
//! use transcoder_core::batch::{BatchRunner, BatchProgress};
//!
//! let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel(100);
//! let runner = BatchRunner::new(4).with_progress(progress_tx);
//!
//! let report = runner
//!     .run("Album [FLAC]", items, |item| async move { encode(item).await })
//!     .await;
//!
//! report.into_result("Album [FLAC]")?;
//! ```

mod config;
mod runner;
mod types;

pub use config::BatchConfig;
pub use runner::{BatchError, BatchRunner};
pub use types::{BatchProgress, BatchReport, ItemFailure, PoolStatus};
