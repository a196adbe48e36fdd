//! Lossless source validation.

use std::path::Path;
use tracing::warn;
use walkdir::WalkDir;

use super::error::SourceError;
use super::extension_lowercase;

/// Extensions of lossy audio files that must not appear in a source folder.
pub const LOSSY_EXTENSIONS: &[&str] = &["mp3", "m4a", "ogg", "opus"];

/// Fails if any file under `root` has a lossy audio extension.
///
/// Does not touch the filesystem beyond reading the tree.
pub fn ensure_lossless(root: &Path) -> Result<(), SourceError> {
    if !root.is_dir() {
        return Err(SourceError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_lossy = extension_lowercase(entry.path())
            .is_some_and(|ext| LOSSY_EXTENSIONS.contains(&ext.as_str()));
        if is_lossy {
            warn!(path = %entry.path().display(), "Lossy file found in source folder");
            return Err(SourceError::LossyFileFound {
                path: entry.path().to_path_buf(),
            });
        }
    }

    Ok(())
}
