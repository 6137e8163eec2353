//! System-wide configuration file
//!
//! Stored as TOML at `<config dir>/twinpane/config.toml`, or wherever
//! `TWINPANE_CONFIG` points. A missing file means all defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use twinpane_watcher::WatcherConfig;

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "TWINPANE_CONFIG";

/// Complete system configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default)]
    pub watcher: WatcherConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

/// Listing display options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Show dotfiles in listings (default: false)
    #[serde(default)]
    pub show_hidden: bool,

    /// Print sizes as KB/MB/GB instead of bytes (default: true)
    #[serde(default = "default_true")]
    pub human_sizes: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_hidden: false,
            human_sizes: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl SystemConfig {
    pub fn validate(&self) -> Result<()> {
        self.watcher.validate()
    }
}

/// Location of the config file
pub fn config_file_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("twinpane").join("config.toml"))
}

/// Load the system config, falling back to defaults
pub fn load() -> Result<SystemConfig> {
    match config_file_path() {
        Some(path) => load_from(&path),
        None => Ok(SystemConfig::default()),
    }
}

/// Load config from a specific file; a missing file yields defaults
pub fn load_from(path: &Path) -> Result<SystemConfig> {
    if !path.exists() {
        return Ok(SystemConfig::default());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: SystemConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;

    Ok(config)
}

/// Save the system config
pub fn save(config: &SystemConfig) -> Result<()> {
    let path = config_file_path().context("Could not determine config file path")?;
    save_to(config, &path)
}

/// Validate and write config to a specific file
pub fn save_to(config: &SystemConfig, path: &Path) -> Result<()> {
    config.validate().context("Refusing to save invalid configuration")?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let serialized = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, serialized)
        .with_context(|| format!("Failed to write config file {}", path.display()))?;
    Ok(())
}

/// Write a default config file if none exists yet
pub fn init_if_missing() -> Result<()> {
    let path = config_file_path().context("Could not determine config file path")?;
    if !path.exists() {
        save_to(&SystemConfig::default(), &path)?;
    }
    Ok(())
}

/// Annotated example config
pub fn example_config() -> &'static str {
    r#"# Twinpane configuration

[watcher]
# Seconds between directory polls (1-3600)
poll_interval_secs = 30

[display]
# Show dotfiles in listings
show_hidden = false
# Print sizes as KB/MB/GB
human_sizes = true
"#
}
