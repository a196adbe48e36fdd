//! Discovery of the FLAC files to transcode.

use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::error::SourceError;
use super::extension_lowercase;
use super::reader::FlacSource;
use crate::naming::LOSSY_EXTENSION;
use crate::tags::{normalize_tags, TagMap};

/// Extension of the lossless files picked up for transcoding.
pub const LOSSLESS_EXTENSION: &str = "flac";

/// One FLAC file to transcode.
///
/// Built once during collection and consumed once by the engine.
#[derive(Debug)]
pub struct TranscodeItem {
    /// Absolute path of the source FLAC file.
    pub source: PathBuf,
    /// Path of the MP3 to create.
    pub dest: PathBuf,
    /// Parsed source file; owned by the item until its task finishes.
    pub flac: FlacSource,
    /// Normalized tags (no total keys).
    pub tags: TagMap,
}

/// Maps `file` under `source_root` to the same relative path under
/// `dest_root`, with the lossy extension.
pub fn destination_for(
    file: &Path,
    source_root: &Path,
    dest_root: &Path,
) -> Result<PathBuf, SourceError> {
    let relative = file
        .strip_prefix(source_root)
        .map_err(|_| SourceError::OutsideRoot {
            path: file.to_path_buf(),
            root: source_root.to_path_buf(),
        })?;
    Ok(dest_root.join(relative).with_extension(LOSSY_EXTENSION))
}

/// Reads every FLAC file under `source_root`, in path order.
///
/// Any unreadable file or bad tag aborts the whole collection.
pub fn collect_items(
    source_root: &Path,
    dest_root: &Path,
) -> Result<Vec<TranscodeItem>, SourceError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(source_root).follow_links(false) {
        let entry = entry?;
        if entry.file_type().is_file()
            && extension_lowercase(entry.path()).as_deref() == Some(LOSSLESS_EXTENSION)
        {
            files.push(entry.into_path());
        }
    }
    files.sort();

    let mut items = Vec::with_capacity(files.len());
    for file in files {
        let (flac, raw_tags) = FlacSource::open(&file)?;
        let tags = normalize_tags(&raw_tags).map_err(|source| SourceError::Tags {
            path: file.clone(),
            source,
        })?;
        let dest = destination_for(&file, source_root, dest_root)?;
        debug!(source = %file.display(), dest = %dest.display(), "Collected item");
        items.push(TranscodeItem {
            source: file,
            dest,
            flac,
            tags,
        });
    }

    info!(
        source = %source_root.display(),
        items = items.len(),
        "Collected FLAC files"
    );
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::FlacFixture;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_destination_for() {
        let dest = destination_for(
            Path::new("/music/Album [FLAC]/CD1/01 Intro.flac"),
            Path::new("/music/Album [FLAC]"),
            Path::new("/music/Album [MP3 V0]"),
        )
        .unwrap();
        assert_eq!(dest, PathBuf::from("/music/Album [MP3 V0]/CD1/01 Intro.mp3"));
    }

    #[test]
    fn test_destination_outside_root() {
        let err = destination_for(
            Path::new("/elsewhere/01.flac"),
            Path::new("/music/Album"),
            Path::new("/music/Album [MP3 V0]"),
        )
        .unwrap_err();
        assert!(matches!(err, SourceError::OutsideRoot { .. }));
    }

    #[test]
    fn test_collects_in_path_order_with_normalized_tags() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("CD2")).unwrap();

        for (name, track) in [("CD2/01.flac", "1"), ("02.flac", "2"), ("01.FLAC", "1")] {
            FlacFixture::new()
                .comment("TRACKNUMBER", track)
                .comment("TRACKTOTAL", "2")
                .comment("REPLAYGAIN_TRACK_GAIN", "-1.00 dB")
                .write(&src.path().join(name));
        }
        fs::write(src.path().join("cover.jpg"), b"jpg").unwrap();

        let items = collect_items(src.path(), dst.path()).unwrap();
        let sources: Vec<_> = items
            .iter()
            .map(|item| item.source.strip_prefix(src.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            sources,
            vec![
                PathBuf::from("01.FLAC"),
                PathBuf::from("02.flac"),
                PathBuf::from("CD2/01.flac"),
            ]
        );

        assert_eq!(items[1].dest, dst.path().join("02.mp3"));
        assert_eq!(items[1].tags["tracknumber"], vec!["2/2".to_string()]);
        assert!(!items[1].tags.contains_key("tracktotal"));
        assert!(!items[1].tags.contains_key("replaygain_track_gain"));
    }

    #[test]
    fn test_conflicting_totals_abort_collection() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        FlacFixture::new()
            .comment("TRACKNUMBER", "1")
            .write(&src.path().join("01.flac"));
        FlacFixture::new()
            .comment("TRACKNUMBER", "2")
            .comment("TRACKTOTAL", "10")
            .comment("TOTALTRACKS", "11")
            .write(&src.path().join("02.flac"));

        let err = collect_items(src.path(), dst.path()).unwrap_err();
        assert!(err.is_metadata());
        assert!(matches!(err, SourceError::Tags { .. }));
    }
}
