//! Match file discovery.

use std::path::{Path, PathBuf};
use tracing::warn;

/// Recursively collect files under `root` with the given extension, sorted.
///
/// A `root` that is itself a file is returned as-is regardless of extension.
/// A missing root yields an empty list.
pub fn discover_demos(root: &Path, extension: &str) -> Vec<PathBuf> {
    if !root.exists() {
        warn!("Input path does not exist: {}", root.display());
        return Vec::new();
    }
    if root.is_file() {
        return vec![root.to_path_buf()];
    }

    let extension = extension.trim_start_matches('.');
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case(extension))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}
