//! Mock transcoder for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::fixtures::mpeg_frames;
use crate::encoder::{AudioTranscoder, EncodeResult, EncoderError, Tool};
use crate::quality::Quality;

/// A recorded transcode call for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedTranscode {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub quality: Quality,
}

/// Mock implementation of the AudioTranscoder trait.
///
/// Writes a short tagless MPEG stream to the destination instead of running
/// any process. Provides controllable behavior for testing:
/// - Track transcodes for assertions
/// - Fail selected source files
/// - Simulate slow encodes and observe peak concurrency
#[derive(Debug, Clone, Default)]
pub struct MockTranscoder {
    /// Recorded successful transcodes, in completion order.
    transcodes: Arc<RwLock<Vec<RecordedTranscode>>>,
    /// Source file names that fail.
    failing: Arc<RwLock<HashSet<String>>>,
    /// Simulated encode duration in milliseconds.
    delay_ms: Arc<RwLock<u64>>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl MockTranscoder {
    /// Create a new mock transcoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every source whose file name is `file_name` fail.
    pub async fn fail_on(&self, file_name: &str) {
        self.failing.write().await.insert(file_name.to_string());
    }

    /// Set the simulated encode duration.
    pub async fn set_delay_ms(&self, delay_ms: u64) {
        *self.delay_ms.write().await = delay_ms;
    }

    /// Get all recorded transcodes.
    pub async fn recorded_transcodes(&self) -> Vec<RecordedTranscode> {
        self.transcodes.read().await.clone()
    }

    /// Highest number of transcodes observed running at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn encode(&self, source: &Path, dest: &Path) -> Result<u64, EncoderError> {
        let delay = *self.delay_ms.read().await;
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.failing.read().await.contains(&name) {
            return Err(EncoderError::process_failed(
                Tool::Lame,
                Some(1),
                format!("mock failure for {name}").as_bytes(),
            ));
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = mpeg_frames(6);
        tokio::fs::write(dest, &bytes).await?;
        Ok(bytes.len() as u64)
    }
}

#[async_trait]
impl AudioTranscoder for MockTranscoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn transcode(
        &self,
        source: &Path,
        dest: &Path,
        quality: Quality,
    ) -> Result<EncodeResult, EncoderError> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);

        let result = self.encode(source, dest).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let size = result?;
        self.transcodes.write().await.push(RecordedTranscode {
            source: source.to_path_buf(),
            dest: dest.to_path_buf(),
            quality,
        });
        Ok(EncodeResult {
            output_path: dest.to_path_buf(),
            output_size_bytes: size,
            duration_ms: 0,
        })
    }

    async fn validate(&self) -> Result<(), EncoderError> {
        Ok(())
    }
}
