//! Bounded recursive search for directories
//!
//! Backs the "jump to directory" box: walk down from a root and collect
//! directories whose path contains a pattern, stopping after `max` hits.

use crate::error::SnapshotError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Find up to `max` directories under `root` whose path contains `pattern`
///
/// The walk is depth-first in file-name order and includes `root` itself.
/// Matching is a plain substring test on the whole path as walked, so a
/// pattern that occurs in `root` matches every directory below it. Symlinks
/// are not followed. Subtrees that cannot be read are skipped.
///
/// Fails only when `root` itself cannot be listed.
pub fn find_directories(
    root: &Path,
    pattern: &str,
    max: usize,
) -> Result<Vec<PathBuf>, SnapshotError> {
    fs::read_dir(root).map_err(|source| SnapshotError::ReadDir {
        path: root.to_path_buf(),
        source,
    })?;

    let mut found = Vec::new();
    if max == 0 {
        return Ok(found);
    }

    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable path during search: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        if entry.path().to_string_lossy().contains(pattern) {
            found.push(entry.into_path());
            if found.len() >= max {
                break;
            }
        }
    }

    debug!(
        "Directory search under {} for '{}': {} hits",
        root.display(),
        pattern,
        found.len()
    );
    Ok(found)
}
