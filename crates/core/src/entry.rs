//! Listing entries for a single directory level

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Kind of listing entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// Regular file (or a symlink resolving to one)
    File,
    /// Directory
    Directory,
    /// Symlink whose target is a directory
    SymlinkDirectory,
}

impl EntryKind {
    /// True for anything that lists as a directory, including resolved links
    pub fn is_dir(self) -> bool {
        matches!(self, EntryKind::Directory | EntryKind::SymlinkDirectory)
    }
}

/// One immediate child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Directory the entry was listed from
    pub dir: PathBuf,
    /// File name, unique within its listing
    pub name: String,
    /// Extension including the leading dot, empty if none
    pub extension: String,
    /// Classification after one level of symlink resolution
    pub kind: EntryKind,
    /// Byte size from the unresolved metadata
    pub size: u64,
    /// Last modification time, when the platform reports one
    pub modified: Option<SystemTime>,
    /// Permission bits (`0o777` mask)
    pub mode: u32,
    /// Position within the listing this entry came from
    pub index: usize,
    /// Entry is a symbolic link
    pub link: bool,
}

impl Entry {
    /// Full path of the entry
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.name)
    }

    /// Modification time in ANSI C layout (`Mon Jan  2 15:04:05 2006`)
    pub fn modified_display(&self) -> String {
        match self.modified {
            Some(ts) => {
                let local: DateTime<Local> = ts.into();
                local.format("%a %b %e %H:%M:%S %Y").to_string()
            }
            None => String::new(),
        }
    }
}

/// Extension of a file name including the dot
///
/// Last-dot rule: `archive.tar.gz` -> `.gz`, `Makefile` -> ``, `.bashrc` -> `.bashrc`.
pub fn extension_of(name: &str) -> String {
    match name.rfind('.') {
        Some(pos) => name[pos..].to_string(),
        None => String::new(),
    }
}

/// Name component of a path as an owned string
pub(crate) fn name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
