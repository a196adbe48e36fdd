//! Tag handling for transcodes.
//!
//! Source files carry vendor comments (FLAC's key / multi-value block); the
//! output carries an ID3v2.4 tag. This module cleans the source tags, maps
//! each key onto an ID3v2 frame and writes the result into encoded files.
//!
//! # Example
//!
//! ```ignore
//! use transcoder_core::tags::{normalize_tags, write_tags, TagMap};
//!
//! let mut raw = TagMap::new();
//! raw.insert("tracknumber".into(), vec!["3".into()]);
//! raw.insert("tracktotal".into(), vec!["12".into()]);
//!
//! let tags = normalize_tags(&raw)?;
//! assert_eq!(tags["tracknumber"], vec!["3/12".to_string()]);
//!
//! write_tags(Path::new("/out/03.mp3"), &tags, &[])?;
//! ```

mod error;
mod frames;
mod normalize;
mod writer;

use std::collections::BTreeMap;

pub use error::{TagNormalizeError, TagWriteError};
pub use frames::{build_frame, frame_mapping, FrameKind, FrameMapping};
pub use normalize::{normalize_tags, DROPPED_TAGS, NORMALIZATION_PREFIX};
pub use writer::write_tags;

/// Lowercase tag name to its ordered values.
pub type TagMap = BTreeMap<String, Vec<String>>;
