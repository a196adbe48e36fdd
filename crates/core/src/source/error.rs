//! Error types for the source module.

use std::path::PathBuf;
use thiserror::Error;

use crate::tags::TagNormalizeError;

/// Errors raised while inspecting or copying from a source folder.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source path is not a directory.
    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// A lossy file was found in a folder that should be lossless.
    #[error("A lossy file was found in the folder: {path}")]
    LossyFileFound { path: PathBuf },

    /// Walking the source tree failed.
    #[error("Failed to walk source folder: {0}")]
    Walk(#[from] walkdir::Error),

    /// A FLAC file could not be opened.
    #[error("Failed to open {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A FLAC file could not be parsed.
    #[error("Failed to read FLAC metadata from {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: lofty::error::LoftyError,
    },

    /// A FLAC file has no tag block.
    #[error("FLAC file has no tags: {path}")]
    MissingTags { path: PathBuf },

    /// A FLAC file carries tags, but not as vorbis comments.
    #[error("FLAC tags are not vorbis comments: {path}")]
    WrongTagKind { path: PathBuf },

    /// A file's tags could not be normalized.
    #[error("Invalid tags in {path}: {source}")]
    Tags {
        path: PathBuf,
        #[source]
        source: TagNormalizeError,
    },

    /// A file is outside the source root.
    #[error("{path} is not inside {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    /// Copying a sidecar file failed.
    #[error("Failed to copy {from} to {to}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    /// Whether this error is about the folder's contents being lossy.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::LossyFileFound { .. })
    }

    /// Whether this error comes from a file's metadata.
    pub fn is_metadata(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. } | Self::MissingTags { .. } | Self::WrongTagKind { .. } | Self::Tags { .. }
        )
    }
}
