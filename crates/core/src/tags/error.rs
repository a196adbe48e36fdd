//! Error types for the tags module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from cleaning a source tag map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagNormalizeError {
    /// Two total keys of the same group disagree.
    #[error("Conflicting values of {}", keys.join(" and "))]
    ConflictingTotals { keys: Vec<String> },

    /// A total key does not hold an integer.
    #[error("Tag {key} is not a number: {value:?}")]
    InvalidTotal { key: String, value: String },
}

/// Errors from writing tags into an encoded file.
#[derive(Debug, Error)]
pub enum TagWriteError {
    /// The file could not be opened.
    #[error("Failed to open {path} for tagging")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not something an ID3v2 tag can be attached to.
    #[error("Cannot create a tag container on {path}")]
    NoContainer {
        path: PathBuf,
        #[source]
        source: lofty::error::LoftyError,
    },

    /// A frame could not be built for a tag.
    #[error("Invalid frame {frame_id} for tag {key}")]
    InvalidFrame {
        key: String,
        frame_id: &'static str,
        #[source]
        source: lofty::error::LoftyError,
    },

    /// Saving the tag failed.
    #[error("Failed to save tags to {path}")]
    Save {
        path: PathBuf,
        #[source]
        source: lofty::error::LoftyError,
    },
}
