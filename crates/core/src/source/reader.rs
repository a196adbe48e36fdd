//! Reading FLAC stream info, comments and pictures.

use lofty::config::ParseOptions;
use lofty::file::AudioFile;
use lofty::flac::FlacFile;
use lofty::ogg::OggPictureStorage;
use lofty::picture::Picture;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

use super::error::SourceError;
use crate::tags::TagMap;

/// A parsed FLAC file.
///
/// Holds everything the engine needs after collection (channel count and
/// embedded pictures) so the file is only read once.
pub struct FlacSource {
    path: PathBuf,
    flac: FlacFile,
}

impl FlacSource {
    /// Reads the FLAC file at `path`.
    ///
    /// Returns the parsed file and its raw vendor comments with lowercased
    /// keys. Fails when the file has no tag block or its tags are not
    /// vendor comments.
    pub fn open(path: &Path) -> Result<(Self, TagMap), SourceError> {
        let mut file = File::open(path).map_err(|source| SourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let flac = FlacFile::read_from(&mut file, ParseOptions::new()).map_err(|source| {
            SourceError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let comments = match flac.vorbis_comments() {
            Some(comments) => comments,
            None if flac.id3v2().is_some() => {
                return Err(SourceError::WrongTagKind {
                    path: path.to_path_buf(),
                })
            }
            None => {
                return Err(SourceError::MissingTags {
                    path: path.to_path_buf(),
                })
            }
        };

        let mut tags = TagMap::new();
        for (key, value) in comments.items() {
            tags.entry(key.to_lowercase())
                .or_default()
                .push(value.to_string());
        }

        Ok((
            Self {
                path: path.to_path_buf(),
                flac,
            },
            tags,
        ))
    }

    /// Path the file was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of audio channels from the stream info.
    pub fn channels(&self) -> u8 {
        self.flac.properties().channels()
    }

    /// Embedded pictures, in file order.
    pub fn pictures(&self) -> Vec<Picture> {
        self.flac
            .pictures()
            .iter()
            .map(|(picture, _)| picture.clone())
            .collect()
    }
}

impl fmt::Debug for FlacSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlacSource")
            .field("path", &self.path)
            .field("channels", &self.channels())
            .finish_non_exhaustive()
    }
}
