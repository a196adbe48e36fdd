//! Source folder handling.
//!
//! Everything that reads the lossless release before any encoder runs:
//!
//! - [`ensure_lossless`] rejects folders that already contain lossy audio
//! - [`FlacSource`] reads one FLAC file's stream info, comments and pictures
//! - [`collect_items`] builds the ordered work list for the engine
//! - [`copy_sidecars`] mirrors artwork and documents into the destination

mod collector;
mod error;
mod reader;
mod sidecar;
mod validator;

pub use collector::{collect_items, destination_for, TranscodeItem, LOSSLESS_EXTENSION};
pub use error::SourceError;
pub use reader::FlacSource;
pub use sidecar::{copy_sidecars, SIDECAR_EXTENSIONS};
pub use validator::{ensure_lossless, LOSSY_EXTENSIONS};

use std::path::Path;

/// Lowercased extension of `path`, if it has one.
pub(crate) fn extension_lowercase(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}
