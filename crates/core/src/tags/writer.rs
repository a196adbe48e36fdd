//! Writes normalized tags and pictures into an encoded MP3.

use lofty::config::{ParseOptions, WriteOptions};
use lofty::file::AudioFile;
use lofty::id3::v2::{AttachedPictureFrame, Frame, Id3v2Tag};
use lofty::mpeg::MpegFile;
use lofty::picture::Picture;
use lofty::tag::{TagExt, TagType};
use lofty::TextEncoding;
use std::fs::File;
use std::path::Path;
use tracing::debug;

use super::error::TagWriteError;
use super::frames::build_frame;
use super::TagMap;

/// Adds `tags` and `pictures` to the ID3v2 tag of the MP3 at `path`.
///
/// A tag is created when the file has none; frames already present with the
/// same identity are replaced. The tag is always saved as ID3v2.4 and any
/// ID3v1 tag is removed.
pub fn write_tags(path: &Path, tags: &TagMap, pictures: &[Picture]) -> Result<(), TagWriteError> {
    let mut file = File::open(path).map_err(|source| TagWriteError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mpeg = MpegFile::read_from(&mut file, ParseOptions::new())
        .map_err(|source| TagWriteError::NoContainer {
            path: path.to_path_buf(),
            source,
        })?;
    let has_id3v1 = mpeg.id3v1().is_some();
    let mut tag: Id3v2Tag = mpeg.id3v2().cloned().unwrap_or_default();
    drop(file);

    for (key, values) in tags {
        tag.insert(build_frame(key, values)?);
    }
    for picture in pictures {
        tag.insert(Frame::Picture(AttachedPictureFrame::new(
            TextEncoding::UTF8,
            picture.clone(),
        )));
    }

    tag.save_to_path(path, WriteOptions::default().use_id3v23(false))
        .map_err(|source| TagWriteError::Save {
            path: path.to_path_buf(),
            source,
        })?;

    if has_id3v1 {
        TagType::Id3v1
            .remove_from_path(path)
            .map_err(|source| TagWriteError::Save {
                path: path.to_path_buf(),
                source,
            })?;
    }

    debug!(
        path = %path.display(),
        frames = tags.len(),
        pictures = pictures.len(),
        "Wrote ID3v2 tag"
    );
    Ok(())
}
