//! Bounded directory search

use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::Path;
use twinpane_core::find_directories;

pub async fn run(path: &Path, pattern: &str, max: usize, json: bool) -> Result<()> {
    let root = util::absolute_path(path)?;
    let found = find_directories(&root, pattern, max)?;

    if json {
        let rendered = serde_json::to_string_pretty(&found).context("Failed to serialize matches")?;
        println!("{}", rendered);
        return Ok(());
    }

    for dir in &found {
        println!("{}", dir.display().blue());
    }

    println!();
    if found.is_empty() {
        println!("No directories matching '{}' under {}", pattern, root.display());
    } else if found.len() >= max {
        println!("{} directories {}", found.len(), "(limit reached)".dimmed());
    } else {
        println!("{} directories", found.len());
    }

    Ok(())
}
