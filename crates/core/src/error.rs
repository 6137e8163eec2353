//! Snapshot errors and the shared last-error slot

use parking_lot::Mutex;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Failure while listing a directory
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The listed directory itself could not be read (missing, unreadable, vanished)
    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Metadata for one child could not be read; the child is skipped
    #[error("failed to read metadata for {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A child could not be resolved through its symlink; the child is kept
    #[error("failed to resolve {path}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SnapshotError {
    /// Path the error refers to
    pub fn path(&self) -> &PathBuf {
        match self {
            SnapshotError::ReadDir { path, .. }
            | SnapshotError::Metadata { path, .. }
            | SnapshotError::Resolve { path, .. } => path,
        }
    }
}

/// Last-error slot shared between the watcher and whoever controls it
///
/// Every failing operation overwrites the previous message. Callers poll it
/// after an operation instead of receiving the error directly.
#[derive(Debug, Clone, Default)]
pub struct ErrorSlot {
    inner: Arc<Mutex<Option<String>>>,
}

impl ErrorSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the slot with a new message
    pub fn set(&self, message: impl Into<String>) {
        *self.inner.lock() = Some(message.into());
    }

    /// Record an error's display form
    pub fn record(&self, err: &dyn std::error::Error) {
        self.set(err.to_string());
    }

    pub fn clear(&self) {
        *self.inner.lock() = None;
    }

    /// Current message, if the last operation failed
    pub fn get(&self) -> Option<String> {
        self.inner.lock().clone()
    }

    pub fn is_set(&self) -> bool {
        self.inner.lock().is_some()
    }
}
