//! Single-level directory snapshots
//!
//! A snapshot lists the immediate children of one directory, classifies each
//! through one level of symlink resolution, and keeps going when individual
//! children fail.

use crate::entry::{extension_of, name_of, Entry, EntryKind};
use crate::error::{ErrorSlot, SnapshotError};
use crate::fingerprint::Fingerprint;
use crate::provider::{DirChild, FileStat, LocalFs, MetadataProvider};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Point-in-time listing of one directory
#[derive(Debug)]
pub struct Snapshot {
    dir: PathBuf,
    entries: Vec<Entry>,
    errors: Vec<SnapshotError>,
}

impl Snapshot {
    /// Snapshot `path` on the local filesystem
    pub fn capture(path: &Path) -> Result<Self, SnapshotError> {
        Self::capture_with(&LocalFs, path)
    }

    /// Snapshot `path` through the given provider
    ///
    /// Fails only when the directory itself cannot be enumerated. Children
    /// whose metadata cannot be read are skipped and reported in
    /// [`Snapshot::errors`].
    pub fn capture_with<P>(provider: &P, path: &Path) -> Result<Self, SnapshotError>
    where
        P: MetadataProvider + ?Sized,
    {
        let children = provider
            .read_dir(path)
            .map_err(|source| SnapshotError::ReadDir {
                path: path.to_path_buf(),
                source,
            })?;

        let mut snapshot = Self::empty(path);
        for child in children {
            match child {
                Ok(child) => snapshot.push_child(provider, child),
                Err(source) => snapshot.errors.push(SnapshotError::Metadata {
                    path: path.to_path_buf(),
                    source,
                }),
            }
        }

        if !snapshot.errors.is_empty() {
            debug!(
                "Snapshot of {} skipped or partially read {} entries",
                path.display(),
                snapshot.errors.len()
            );
        }

        Ok(snapshot)
    }

    /// Snapshot `path`, reporting failures through `slot` instead of `Err`
    ///
    /// The slot is cleared first and ends up holding the last error seen, if
    /// any. An unreadable directory yields an empty snapshot.
    pub fn capture_into(path: &Path, slot: &ErrorSlot) -> Self {
        Self::capture_into_with(&LocalFs, path, slot)
    }

    /// [`Snapshot::capture_into`] through the given provider
    pub fn capture_into_with<P>(provider: &P, path: &Path, slot: &ErrorSlot) -> Self
    where
        P: MetadataProvider + ?Sized,
    {
        slot.clear();
        match Self::capture_with(provider, path) {
            Ok(snapshot) => {
                if let Some(err) = snapshot.errors.last() {
                    slot.record(err);
                }
                snapshot
            }
            Err(err) => {
                slot.record(&err);
                Self::empty(path)
            }
        }
    }

    /// Snapshot with no entries
    pub fn empty(path: &Path) -> Self {
        Self {
            dir: path.to_path_buf(),
            entries: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn push_child<P>(&mut self, provider: &P, child: DirChild)
    where
        P: MetadataProvider + ?Sized,
    {
        let unresolved = match provider.symlink_metadata(&child.path) {
            Ok(stat) => stat,
            Err(source) => {
                self.errors.push(SnapshotError::Metadata {
                    path: child.path,
                    source,
                });
                return;
            }
        };

        let resolved = match provider.metadata(&child.path) {
            Ok(stat) => Some(stat),
            Err(source) => {
                // Dangling link: keep the entry as the unresolved view saw it
                self.errors.push(SnapshotError::Resolve {
                    path: child.path.clone(),
                    source,
                });
                None
            }
        };

        let (kind, link) = classify(&unresolved, resolved.as_ref());
        let name = if child.name.is_empty() {
            name_of(&child.path)
        } else {
            child.name
        };

        self.entries.push(Entry {
            dir: self.dir.clone(),
            extension: extension_of(&name),
            name,
            kind,
            size: unresolved.len,
            modified: unresolved.modified,
            mode: unresolved.mode,
            index: self.entries.len(),
            link,
        });
    }

    /// Directory this snapshot lists
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Entries in enumeration order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    /// Per-child failures encountered while listing
    pub fn errors(&self) -> &[SnapshotError] {
        &self.errors
    }

    /// Number of listed entries
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fingerprint of the listed names and sizes
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.entries)
    }
}

/// Kind and link flag from the unresolved and (optionally) resolved views
///
/// An entry that lists as a non-directory but resolves to one is a directory
/// reached through a symlink. Either view reporting a symlink marks it as a
/// link; links to plain files stay `File`.
fn classify(unresolved: &FileStat, resolved: Option<&FileStat>) -> (EntryKind, bool) {
    let mut kind = if unresolved.is_dir {
        EntryKind::Directory
    } else {
        EntryKind::File
    };
    let mut link = unresolved.is_symlink;

    if let Some(resolved) = resolved {
        if resolved.is_dir && !unresolved.is_dir {
            kind = EntryKind::SymlinkDirectory;
            link = true;
        }
        if resolved.is_symlink {
            link = true;
        }
    }

    (kind, link)
}
