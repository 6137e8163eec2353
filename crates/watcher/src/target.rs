//! Per-pane watch state

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use twinpane_core::Fingerprint;

/// One of the two directory views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pane {
    Left,
    Right,
}

impl Pane {
    /// Both panes, in polling order
    pub const ALL: [Pane; 2] = [Pane::Left, Pane::Right];

    /// Event channel the UI listens on for this pane
    pub fn channel(self) -> &'static str {
        match self {
            Pane::Left => "leftSideChange",
            Pane::Right => "rightSideChange",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Pane::Left => 0,
            Pane::Right => 1,
        }
    }
}

impl fmt::Display for Pane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pane::Left => write!(f, "left"),
            Pane::Right => write!(f, "right"),
        }
    }
}

impl std::str::FromStr for Pane {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "left" | "l" => Ok(Pane::Left),
            "right" | "r" => Ok(Pane::Right),
            _ => anyhow::bail!("Unknown pane '{}': expected 'left' or 'right'", s),
        }
    }
}

/// What the watcher last observed for one pane
///
/// The stored count and fingerprint survive path changes; the first cycle
/// after a switch compares the new directory against the old state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchTarget {
    /// Directory being watched, `None` when the pane is not monitored
    pub path: Option<PathBuf>,
    /// Entry count at the last observed change
    pub last_count: usize,
    /// Fingerprint at the last observed change
    pub last_fingerprint: Fingerprint,
}

impl WatchTarget {
    /// Point the target at a new directory, keeping the stored state
    pub fn assign(&mut self, path: PathBuf) {
        self.path = Some(path);
    }

    pub fn clear(&mut self) {
        self.path = None;
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.path.is_some()
    }

    /// Compare a fresh observation against the stored state and adopt it
    ///
    /// The count is checked first; the fingerprint is only compared when the
    /// counts agree. Returns whether anything changed.
    pub fn observe(&mut self, count: usize, fingerprint: impl FnOnce() -> Fingerprint) -> bool {
        if count != self.last_count {
            self.last_count = count;
            self.last_fingerprint = fingerprint();
            return true;
        }

        let fingerprint = fingerprint();
        if fingerprint != self.last_fingerprint {
            self.last_fingerprint = fingerprint;
            return true;
        }

        false
    }
}
