//! Watch one or two directories in the foreground

use crate::system_config;
use anyhow::{Context, Result};
use std::path::PathBuf;

pub async fn run(left: Option<PathBuf>, right: Option<PathBuf>, interval: Option<u64>) -> Result<()> {
    let mut config = system_config::load()?.watcher;
    if let Some(secs) = interval {
        config.poll_interval_secs = secs;
    }
    config.validate().context("Invalid poll interval")?;

    crate::daemon::run(&config, left, right).await
}
