//! One-shot directory listing

use crate::system_config;
use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::Path;
use twinpane_core::{Entry, EntryKind, ErrorSlot, Snapshot};

pub async fn run(path: &Path, json: bool, all: bool) -> Result<()> {
    let config = system_config::load()?;
    let dir = util::absolute_path(path)?;

    let slot = ErrorSlot::new();
    let snapshot = Snapshot::capture_into(&dir, &slot);

    // No per-entry errors but a populated slot means the directory itself failed
    if snapshot.errors().is_empty() {
        if let Some(err) = slot.get() {
            anyhow::bail!(err);
        }
    }

    let show_hidden = all || config.display.show_hidden;
    let visible: Vec<&Entry> = snapshot
        .entries()
        .iter()
        .filter(|e| show_hidden || !util::is_hidden(&e.name))
        .collect();

    if json {
        let rendered = serde_json::to_string_pretty(&visible).context("Failed to serialize listing")?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("{}", snapshot.dir().display().bold());
    for entry in &visible {
        print_entry(entry, config.display.human_sizes);
    }

    println!();
    println!(
        "{} entries ({} shown)  fingerprint {}",
        snapshot.count(),
        visible.len(),
        snapshot.fingerprint().short().dimmed()
    );
    if let Some(err) = slot.get() {
        println!("{} {}", "warning:".yellow(), err);
    }

    Ok(())
}

fn print_entry(entry: &Entry, human_sizes: bool) {
    let size = if entry.kind.is_dir() {
        "-".to_string()
    } else if human_sizes {
        util::format_size(entry.size)
    } else {
        entry.size.to_string()
    };

    let name = match entry.kind {
        EntryKind::File if entry.link => format!("{} {}", entry.name, "@".dimmed()),
        EntryKind::File => entry.name.clone(),
        EntryKind::Directory => format!("{}/", entry.name).blue().to_string(),
        EntryKind::SymlinkDirectory => {
            format!("{}/ {}", entry.name.cyan(), "-> dir".dimmed())
        }
    };

    println!(
        "{}{} {:>10}  {}  {}",
        util::kind_marker(entry.kind),
        util::format_mode(entry.mode),
        size,
        entry.modified_display().dimmed(),
        name
    );
}
