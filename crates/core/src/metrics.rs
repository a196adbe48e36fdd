//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Folders (transcoded, skipped, failed)
//! - Files (encodes, durations, in-flight work)
//! - Sidecar copies

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Folder Metrics
// =============================================================================

/// Folder transcodes total by result.
pub static FOLDERS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("flactrans_folders_total", "Total folder transcodes"),
        &["result"], // "transcoded", "skipped", "failed"
    )
    .unwrap()
});

// =============================================================================
// File Metrics
// =============================================================================

/// File transcodes total by result.
pub static TRANSCODES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("flactrans_transcodes_total", "Total file transcodes"),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

/// File transcode duration in seconds, tagging included.
pub static TRANSCODE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "flactrans_transcode_duration_seconds",
            "Duration of single file transcodes",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0, 300.0]),
        &["quality"],
    )
    .unwrap()
});

/// Files currently being transcoded.
pub static TRANSCODES_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "flactrans_transcodes_in_flight",
        "Number of file transcodes currently running",
    )
    .unwrap()
});

// =============================================================================
// Sidecar Metrics
// =============================================================================

/// Sidecar files copied.
pub static SIDECARS_COPIED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "flactrans_sidecars_copied_total",
        "Total artwork and document files copied",
    )
    .unwrap()
});

/// Returns every core metric for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Folders
        Box::new(FOLDERS_TOTAL.clone()),
        // Files
        Box::new(TRANSCODES_TOTAL.clone()),
        Box::new(TRANSCODE_DURATION.clone()),
        Box::new(TRANSCODES_IN_FLIGHT.clone()),
        // Sidecars
        Box::new(SIDECARS_COPIED.clone()),
    ]
}
