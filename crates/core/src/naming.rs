//! Destination folder naming.
//!
//! Release folders usually carry a bracketed format tag such as `[FLAC]` or
//! `[FLAC 24-96]`, and sometimes a free-standing `Lossless` word. The
//! destination name rewrites those markers in place when they exist and only
//! appends a new bracket when it has to, so an already-labelled folder never
//! ends up double-tagged.

use once_cell::sync::Lazy;
use regex_lite::{NoExpand, Regex};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::quality::Quality;

/// Name of the lossless source format as it appears in folder names.
pub const LOSSLESS_FORMAT: &str = "FLAC";

/// Name of the lossy target format as it appears in folder names.
pub const LOSSY_FORMAT: &str = "MP3";

/// Extension given to every transcoded file.
pub const LOSSY_EXTENSION: &str = "mp3";

static FORMAT_BRACKET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\[{}(?P<rest>[^\]]*)\]", LOSSLESS_FORMAT))
        .expect("valid format bracket regex")
});

static LOSSLESS_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)lossless").expect("valid lossless regex"));

/// Errors from computing a destination folder.
#[derive(Debug, Error)]
pub enum NamingError {
    /// The source path has no usable final component.
    #[error("Source path has no folder name: {path}")]
    NoFolderName { path: PathBuf },

    /// The folder name is not valid UTF-8.
    #[error("Source folder name is not valid UTF-8: {path}")]
    NonUtf8Name { path: PathBuf },
}

/// How a folder name gets rewritten, picked from the two markers it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FolderRename {
    /// `[FLAC ...]` bracket plus a `Lossless` word: swap both in place.
    BracketAndWord,
    /// `[FLAC ...]` bracket only: the bracket gets format and quality.
    BracketOnly,
    /// `Lossless` word only: swap the word, append `[MP3]`.
    WordOnly,
    /// No markers: append `[MP3 <quality>]`.
    Unmarked,
}

impl FolderRename {
    fn classify(name: &str) -> Self {
        match (FORMAT_BRACKET.is_match(name), LOSSLESS_WORD.is_match(name)) {
            (true, true) => Self::BracketAndWord,
            (true, false) => Self::BracketOnly,
            (false, true) => Self::WordOnly,
            (false, false) => Self::Unmarked,
        }
    }

    fn apply(self, name: &str, quality: Quality) -> String {
        let label = quality.label();
        match self {
            Self::BracketAndWord => {
                let replacement = format!("[{}${{rest}}]", LOSSY_FORMAT);
                let swapped = FORMAT_BRACKET.replace_all(name, replacement.as_str());
                LOSSLESS_WORD
                    .replace_all(&swapped, NoExpand(label))
                    .into_owned()
            }
            Self::BracketOnly => {
                let replacement = format!("[{} {}${{rest}}]", LOSSY_FORMAT, label);
                FORMAT_BRACKET
                    .replace_all(name, replacement.as_str())
                    .into_owned()
            }
            Self::WordOnly => {
                let swapped = LOSSLESS_WORD.replace_all(name, NoExpand(label));
                format!("{} [{}]", swapped, LOSSY_FORMAT)
            }
            Self::Unmarked => format!("{} [{} {}]", name, LOSSY_FORMAT, label),
        }
    }
}

/// Computes the destination folder name for a source folder name.
pub fn destination_folder_name(folder_name: &str, quality: Quality) -> String {
    FolderRename::classify(folder_name).apply(folder_name, quality)
}

/// Computes the destination folder for a source folder.
///
/// The result is a sibling of `source` and depends only on its final
/// component and `quality`.
pub fn destination_folder(source: &Path, quality: Quality) -> Result<PathBuf, NamingError> {
    let name = source.file_name().ok_or_else(|| NamingError::NoFolderName {
        path: source.to_path_buf(),
    })?;
    let name = name.to_str().ok_or_else(|| NamingError::NonUtf8Name {
        path: source.to_path_buf(),
    })?;

    let renamed = destination_folder_name(name, quality);
    Ok(match source.parent() {
        Some(parent) => parent.join(renamed),
        None => PathBuf::from(renamed),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracket_only() {
        assert_eq!(
            destination_folder_name("Artist - Album [FLAC]", Quality::V0),
            "Artist - Album [MP3 V0]"
        );
    }

    #[test]
    fn test_bracket_keeps_trailing_details() {
        assert_eq!(
            destination_folder_name("Artist - Album (2004) [FLAC 24-96]", Quality::Cbr320),
            "Artist - Album (2004) [MP3 320 24-96]"
        );
    }

    #[test]
    fn test_bracket_with_lossless_word() {
        assert_eq!(
            destination_folder_name("Artist - Album [FLAC Lossless]", Quality::Cbr320),
            "Artist - Album [MP3 320]"
        );
    }

    #[test]
    fn test_lossless_word_outside_bracket() {
        assert_eq!(
            destination_folder_name("Artist - Album (lossless) [FLAC]", Quality::V0),
            "Artist - Album (V0) [MP3]"
        );
    }

    #[test]
    fn test_lossless_word_without_bracket() {
        let name = destination_folder_name("Artist - Album (Lossless)", Quality::V0);
        assert_eq!(name, "Artist - Album (V0) [MP3]");
        assert!(name.contains("(V0)"));
        assert!(name.ends_with("[MP3]"));
    }

    #[test]
    fn test_unmarked_folder() {
        assert_eq!(
            destination_folder_name("Artist - Album", Quality::Cbr320),
            "Artist - Album [MP3 320]"
        );
    }

    #[test]
    fn test_lowercase_format_bracket_is_not_a_marker() {
        assert_eq!(
            destination_folder_name("Artist - Album [flac]", Quality::V0),
            "Artist - Album [flac] [MP3 V0]"
        );
    }

    #[test]
    fn test_destination_is_sibling() {
        let dest =
            destination_folder(Path::new("/music/Artist - Album [FLAC]"), Quality::V0).unwrap();
        assert_eq!(dest, PathBuf::from("/music/Artist - Album [MP3 V0]"));
    }

    #[test]
    fn test_destination_is_deterministic() {
        let source = Path::new("/music/Artist - Album");
        let first = destination_folder(source, Quality::Cbr320).unwrap();
        let second = destination_folder(source, Quality::Cbr320).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_root_has_no_folder_name() {
        let err = destination_folder(Path::new("/"), Quality::V0).unwrap_err();
        assert!(matches!(err, NamingError::NoFolderName { .. }));
    }
}
