//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use twinpane_core::EntryKind;

/// Resolve a user-supplied path against the current directory
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    Ok(cwd.join(path))
}

/// Format file size in human-readable format
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Permission bits as `rwxr-xr-x`
pub fn format_mode(mode: u32) -> String {
    const FLAGS: [char; 3] = ['r', 'w', 'x'];
    (0..9)
        .map(|bit| {
            if mode & (0o400 >> bit) != 0 {
                FLAGS[bit % 3]
            } else {
                '-'
            }
        })
        .collect()
}

/// One-character kind marker in `ls -l` style
pub fn kind_marker(kind: EntryKind) -> char {
    match kind {
        EntryKind::File => '-',
        EntryKind::Directory => 'd',
        EntryKind::SymlinkDirectory => 'l',
    }
}

/// Dotfiles are hidden unless asked for
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}
