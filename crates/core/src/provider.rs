//! Filesystem metadata access
//!
//! Snapshots read the filesystem only through [`MetadataProvider`], which keeps
//! the "stat without following links" and "stat following links" views
//! separate. [`LocalFs`] is the `std::fs` implementation.

use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Plain metadata for one path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub is_dir: bool,
    pub is_symlink: bool,
    pub len: u64,
    pub modified: Option<SystemTime>,
    /// Permission bits (`0o777` mask)
    pub mode: u32,
}

/// A child yielded by directory enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirChild {
    pub name: String,
    pub path: PathBuf,
}

/// Source of directory listings and per-path metadata
pub trait MetadataProvider: Send + Sync {
    /// Enumerate immediate children in the order the platform yields them
    ///
    /// The outer error means the directory itself is unreadable; inner errors
    /// are children that could not be enumerated.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<io::Result<DirChild>>>;

    /// Metadata without following a final symlink (lstat)
    fn symlink_metadata(&self, path: &Path) -> io::Result<FileStat>;

    /// Metadata after following symlinks (stat)
    fn metadata(&self, path: &Path) -> io::Result<FileStat>;
}

/// Local filesystem provider
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl MetadataProvider for LocalFs {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<io::Result<DirChild>>> {
        let children = fs::read_dir(path)?
            .map(|item| {
                item.map(|entry| DirChild {
                    name: entry.file_name().to_string_lossy().into_owned(),
                    path: entry.path(),
                })
            })
            .collect();
        Ok(children)
    }

    fn symlink_metadata(&self, path: &Path) -> io::Result<FileStat> {
        fs::symlink_metadata(path).map(|m| stat_from(&m))
    }

    fn metadata(&self, path: &Path) -> io::Result<FileStat> {
        fs::metadata(path).map(|m| stat_from(&m))
    }
}

fn stat_from(meta: &Metadata) -> FileStat {
    FileStat {
        is_dir: meta.is_dir(),
        is_symlink: meta.file_type().is_symlink(),
        len: meta.len(),
        modified: meta.modified().ok(),
        mode: permission_bits(meta),
    }
}

#[cfg(unix)]
fn permission_bits(meta: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn permission_bits(meta: &Metadata) -> u32 {
    if meta.permissions().readonly() {
        0o444
    } else {
        0o666
    }
}
