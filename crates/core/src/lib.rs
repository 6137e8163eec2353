//! Directory snapshots and change fingerprints for Twinpane
//!
//! This crate provides:
//! - Single-level directory listings with symlink classification
//! - Order-sensitive BLAKE3 fingerprints of a listing
//! - A pluggable metadata provider (local filesystem by default)
//! - The shared last-error slot consulted by the UI layer
//! - Bounded recursive search for directories by name

pub mod entry;
pub mod error;
pub mod fingerprint;
pub mod provider;
pub mod search;
pub mod snapshot;

// Re-exports
pub use entry::{extension_of, Entry, EntryKind};
pub use error::{ErrorSlot, SnapshotError};
pub use fingerprint::Fingerprint;
pub use provider::{DirChild, FileStat, LocalFs, MetadataProvider};
pub use search::find_directories;
pub use snapshot::Snapshot;
