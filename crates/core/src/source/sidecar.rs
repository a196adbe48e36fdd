//! Copies artwork and documents alongside the transcoded audio.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use super::error::SourceError;
use super::extension_lowercase;
use crate::metrics::SIDECARS_COPIED;

/// Extensions of non-audio files carried over to the destination.
pub const SIDECAR_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "pdf", "txt"];

/// Copies every sidecar file under `source_root` to the same relative path
/// under `dest_root`, creating directories as needed.
///
/// Returns the copied paths relative to the roots, in path order.
pub fn copy_sidecars(source_root: &Path, dest_root: &Path) -> Result<Vec<PathBuf>, SourceError> {
    let mut copied = Vec::new();

    for entry in WalkDir::new(source_root)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_sidecar = extension_lowercase(entry.path())
            .is_some_and(|ext| SIDECAR_EXTENSIONS.contains(&ext.as_str()));
        if !is_sidecar {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(source_root)
            .map_err(|_| SourceError::OutsideRoot {
                path: entry.path().to_path_buf(),
                root: source_root.to_path_buf(),
            })?;
        let target = dest_root.join(relative);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| SourceError::Copy {
                from: entry.path().to_path_buf(),
                to: target.clone(),
                source,
            })?;
        }
        fs::copy(entry.path(), &target).map_err(|source| SourceError::Copy {
            from: entry.path().to_path_buf(),
            to: target.clone(),
            source,
        })?;

        debug!(file = %relative.display(), "Copied sidecar file");
        SIDECARS_COPIED.inc();
        copied.push(relative.to_path_buf());
    }

    Ok(copied)
}
