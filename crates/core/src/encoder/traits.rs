//! Trait definitions for the encoder module.

use async_trait::async_trait;
use std::path::Path;

use super::error::EncoderError;
use super::types::EncodeResult;
use crate::quality::Quality;

/// Turns one FLAC file into one MP3 file.
#[async_trait]
pub trait AudioTranscoder: Send + Sync {
    /// Returns the name of this transcoder implementation.
    fn name(&self) -> &str;

    /// Decodes `source` and encodes it to `dest` with the `quality` preset.
    ///
    /// Creates the parent directory of `dest` if needed. Must not leave any
    /// intermediate file behind, whatever the outcome.
    async fn transcode(
        &self,
        source: &Path,
        dest: &Path,
        quality: Quality,
    ) -> Result<EncodeResult, EncoderError>;

    /// Validates that the transcoder is properly configured and ready.
    async fn validate(&self) -> Result<(), EncoderError>;
}
