//! Whole-folder transcode: validate, name, collect, copy, encode.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::batch::{BatchError, BatchRunner};
use crate::config::Config;
use crate::encoder::{AudioTranscoder, FlacLameTranscoder};
use crate::engine::TranscodeEngine;
use crate::metrics::FOLDERS_TOTAL;
use crate::naming::{destination_folder, NamingError};
use crate::quality::Quality;
use crate::source::{collect_items, copy_sidecars, ensure_lossless, SourceError};

/// Errors from transcoding a folder.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// The destination folder name could not be computed.
    #[error(transparent)]
    Naming(#[from] NamingError),

    /// The source folder failed validation, reading or copying.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// One or more files failed; all of them were attempted.
    #[error(transparent)]
    Batch(#[from] BatchError),

    /// A blocking filesystem task did not complete.
    #[error("Background task failed: {0}")]
    Join(String),
}

impl TranscodeError {
    /// Whether the source folder contained lossy audio.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Source(e) if e.is_validation())
    }

    /// Whether a source file's metadata was unusable.
    pub fn is_metadata(&self) -> bool {
        matches!(self, Self::Source(e) if e.is_metadata())
    }
}

/// Transcodes lossless release folders into sibling lossy folders.
///
/// # Example
///
/// ```ignore
/// use transcoder_core::{FolderTranscoder, Quality};
///
/// let transcoder = FolderTranscoder::from_config(&config);
/// let dest = transcoder
///     .transcode_folder(Path::new("/music/Artist - Album [FLAC]"), Quality::V0)
///     .await?;
/// assert!(dest.ends_with("Artist - Album [MP3 V0]"));
/// ```
pub struct FolderTranscoder<T: AudioTranscoder> {
    engine: TranscodeEngine<T>,
}

impl FolderTranscoder<FlacLameTranscoder> {
    /// Creates a folder transcoder running `flac` and `lame`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            FlacLameTranscoder::new(config.encoder.clone()),
            BatchRunner::from_config(&config.batch),
        )
    }
}

impl<T: AudioTranscoder + 'static> FolderTranscoder<T> {
    /// Creates a folder transcoder from its parts.
    pub fn new(transcoder: T, runner: BatchRunner) -> Self {
        Self {
            engine: TranscodeEngine::new(transcoder, runner),
        }
    }

    /// The engine running per-file work.
    pub fn engine(&self) -> &TranscodeEngine<T> {
        &self.engine
    }

    /// Transcodes `source` at `quality` and returns the destination folder.
    ///
    /// An existing destination is returned untouched without doing any
    /// work. Otherwise every FLAC file is attempted; if any fail, the
    /// error lists them all.
    pub async fn transcode_folder(
        &self,
        source: &Path,
        quality: Quality,
    ) -> Result<PathBuf, TranscodeError> {
        let result = self.transcode(source, quality).await;
        if result.is_err() {
            FOLDERS_TOTAL.with_label_values(&["failed"]).inc();
        }
        result
    }

    async fn transcode(&self, source: &Path, quality: Quality) -> Result<PathBuf, TranscodeError> {
        let root = source.to_path_buf();
        run_blocking(move || ensure_lossless(&root)).await??;

        let dest = destination_folder(source, quality)?;
        if dest.is_dir() {
            warn!(dest = %dest.display(), "Destination already exists, skipping");
            FOLDERS_TOTAL.with_label_values(&["skipped"]).inc();
            return Ok(dest);
        }

        info!(
            source = %source.display(),
            dest = %dest.display(),
            %quality,
            "Transcoding folder"
        );

        let (root, dest_root) = (source.to_path_buf(), dest.clone());
        let items = run_blocking(move || {
            let items = collect_items(&root, &dest_root)?;
            copy_sidecars(&root, &dest_root)?;
            Ok::<_, SourceError>(items)
        })
        .await??;

        let label = dest
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let report = self.engine.run(&label, items, quality).await;
        let files = report.into_result(&label)?;

        FOLDERS_TOTAL.with_label_values(&["transcoded"]).inc();
        info!(dest = %dest.display(), files = files.len(), "Folder transcoded");
        Ok(dest)
    }
}

async fn run_blocking<F, R>(f: F) -> Result<R, TranscodeError>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| TranscodeError::Join(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::FlacFixture;
    use crate::testing::MockTranscoder;
    use std::fs;
    use tempfile::TempDir;

    fn transcoder() -> FolderTranscoder<MockTranscoder> {
        FolderTranscoder::new(MockTranscoder::new(), BatchRunner::new(2))
    }

    #[tokio::test]
    async fn test_lossy_file_aborts_before_destination_exists() {
        let root = TempDir::new().unwrap();
        let source = root.path().join("Album [FLAC]");
        FlacFixture::new().write(&source.join("01.flac"));
        fs::write(source.join("bonus.m4a"), b"aac").unwrap();

        let err = transcoder()
            .transcode_folder(&source, Quality::V0)
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert!(!root.path().join("Album [MP3 V0]").exists());
    }

    #[tokio::test]
    async fn test_metadata_error_spawns_nothing() {
        let root = TempDir::new().unwrap();
        let source = root.path().join("Album");
        FlacFixture::new()
            .comment("TRACKNUMBER", "1")
            .comment("DISCNUMBER", "1")
            .comment("DISCTOTAL", "2")
            .comment("TOTALDISCS", "3")
            .write(&source.join("01.flac"));
        let transcoder = transcoder();

        let err = transcoder
            .transcode_folder(&source, Quality::Cbr320)
            .await
            .unwrap_err();

        assert!(err.is_metadata());
        assert!(transcoder.engine().transcoder().recorded_transcodes().await.is_empty());
        assert!(!root.path().join("Album [MP3 320]").exists());
    }

    #[tokio::test]
    async fn test_existing_destination_is_returned_untouched() {
        let root = TempDir::new().unwrap();
        let source = root.path().join("Album [FLAC]");
        FlacFixture::new().write(&source.join("01.flac"));
        let existing = root.path().join("Album [MP3 V0]");
        fs::create_dir_all(&existing).unwrap();
        let transcoder = transcoder();

        let dest = transcoder.transcode_folder(&source, Quality::V0).await.unwrap();

        assert_eq!(dest, existing);
        assert!(transcoder.engine().transcoder().recorded_transcodes().await.is_empty());
        assert_eq!(fs::read_dir(&existing).unwrap().count(), 0);
    }
}
