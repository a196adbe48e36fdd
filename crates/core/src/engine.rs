//! Per-item transcode: channel check, decode + encode, then tagging.

use prometheus::IntGauge;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

use crate::batch::{BatchReport, BatchRunner};
use crate::encoder::{AudioTranscoder, EncodeResult, EncoderError};
use crate::metrics::{TRANSCODES_IN_FLIGHT, TRANSCODES_TOTAL, TRANSCODE_DURATION};
use crate::quality::Quality;
use crate::source::TranscodeItem;
use crate::tags::{write_tags, TagWriteError};

/// Highest channel count the lossy target accepts.
pub const MAX_CHANNELS: u8 = 2;

/// Failure of a single item. Siblings are unaffected.
#[derive(Debug, Error)]
pub enum ItemError {
    /// The source has more channels than the target supports.
    #[error("{path} has {channels} channels; only mono and stereo can be transcoded")]
    ChannelCount { path: PathBuf, channels: u8 },

    /// Decoding or encoding failed.
    #[error(transparent)]
    Encode(#[from] EncoderError),

    /// The audio was written but tagging it failed.
    #[error(transparent)]
    TagWrite(#[from] TagWriteError),

    /// The blocking tag-write task did not complete.
    #[error("Tag writing task failed: {0}")]
    Join(String),
}

/// Runs every item of a folder through a transcoder on a batch runner.
pub struct TranscodeEngine<T: AudioTranscoder> {
    transcoder: Arc<T>,
    runner: BatchRunner,
}

impl<T: AudioTranscoder + 'static> TranscodeEngine<T> {
    /// Creates a new engine.
    pub fn new(transcoder: T, runner: BatchRunner) -> Self {
        Self {
            transcoder: Arc::new(transcoder),
            runner,
        }
    }

    /// The transcoder in use.
    pub fn transcoder(&self) -> &T {
        &self.transcoder
    }

    /// The batch runner in use.
    pub fn runner(&self) -> &BatchRunner {
        &self.runner
    }

    /// Transcodes all `items`, keyed by source path, and waits for every one.
    pub async fn run(&self, label: &str, items: Vec<TranscodeItem>, quality: Quality) -> BatchReport {
        let keyed = items
            .into_iter()
            .map(|item| (item.source.display().to_string(), item))
            .collect();

        self.runner
            .run(label, keyed, |item| {
                let transcoder = Arc::clone(&self.transcoder);
                async move { process_item(transcoder.as_ref(), item, quality).await.map(|_| ()) }
            })
            .await
    }
}

/// Holds one unit of an in-flight gauge until dropped.
struct InFlight<'a>(&'a IntGauge);

impl<'a> InFlight<'a> {
    fn enter(gauge: &'a IntGauge) -> Self {
        gauge.inc();
        Self(gauge)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.dec();
    }
}

/// Processes one item, recording metrics for the outcome.
pub async fn process_item<T: AudioTranscoder + ?Sized>(
    transcoder: &T,
    item: TranscodeItem,
    quality: Quality,
) -> Result<EncodeResult, ItemError> {
    let start = Instant::now();
    let in_flight = InFlight::enter(&TRANSCODES_IN_FLIGHT);
    let result = transcode_and_tag(transcoder, item, quality).await;
    drop(in_flight);

    let outcome = if result.is_ok() { "success" } else { "failed" };
    TRANSCODES_TOTAL.with_label_values(&[outcome]).inc();
    TRANSCODE_DURATION
        .with_label_values(&[quality.label()])
        .observe(start.elapsed().as_secs_f64());
    result
}

async fn transcode_and_tag<T: AudioTranscoder + ?Sized>(
    transcoder: &T,
    item: TranscodeItem,
    quality: Quality,
) -> Result<EncodeResult, ItemError> {
    let channels = item.flac.channels();
    if channels > MAX_CHANNELS {
        return Err(ItemError::ChannelCount {
            path: item.source,
            channels,
        });
    }

    debug!(source = %item.source.display(), dest = %item.dest.display(), %quality, "Transcoding");
    let encoded = transcoder.transcode(&item.source, &item.dest, quality).await?;

    let TranscodeItem {
        source,
        dest,
        flac,
        tags,
    } = item;
    tokio::task::spawn_blocking(move || {
        let pictures = flac.pictures();
        write_tags(&dest, &tags, &pictures)
    })
    .await
    .map_err(|e| ItemError::Join(e.to_string()))??;

    info!(
        source = %source.display(),
        bytes = encoded.output_size_bytes,
        duration_ms = encoded.duration_ms,
        "Transcoded file"
    );
    Ok(encoded)
}
