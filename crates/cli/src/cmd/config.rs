//! Configuration management command
//!
//! Provides CLI interface to view and edit system configuration.

use crate::system_config::{self, SystemConfig};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;

/// List all configuration values
pub async fn run_list() -> Result<()> {
    let config = system_config::load()?;
    let config_path = system_config::config_file_path()
        .context("Could not determine config file path")?;

    println!("{}", "System Configuration".bold());
    println!("{}: {}\n", "Location".dimmed(), config_path.display().dimmed());

    println!("{}", "[watcher]".yellow());
    println!(
        "  {} = {} {}",
        "poll_interval_secs".cyan(),
        config.watcher.poll_interval_secs,
        format!("({}s)", config.watcher.poll_interval_secs).dimmed()
    );

    println!("\n{}", "[display]".yellow());
    println!("  {} = {}", "show_hidden".cyan(), config.display.show_hidden);
    println!("  {} = {}", "human_sizes".cyan(), config.display.human_sizes);

    println!("\n{}", "Valid Ranges:".bold());
    println!("  poll_interval_secs: 1-3600");

    Ok(())
}

/// Get a single configuration value
pub async fn run_get(key: &str) -> Result<()> {
    let config = system_config::load()?;
    println!("{}", get_value(&config, key)?);
    Ok(())
}

/// Set a configuration value
pub async fn run_set(key: &str, value: &str) -> Result<()> {
    let mut config = system_config::load()?;
    set_value(&mut config, key, value)?;

    // Validate before saving
    config.validate().context("Invalid configuration value")?;
    system_config::save(&config)?;

    println!("{} {} = {}", "✓".green(), key.cyan(), value);
    println!(
        "{}",
        "Note: Restart running watchers for changes to take effect".yellow()
    );

    Ok(())
}

/// Show the config file path and optionally create it
pub async fn run_path(create: bool) -> Result<()> {
    let config_path = system_config::config_file_path()
        .context("Could not determine config file path")?;

    if create && !config_path.exists() {
        system_config::init_if_missing()?;
        println!("{} Created config file at: {}", "✓".green(), config_path.display());
    } else if config_path.exists() {
        println!("{}", config_path.display());
    } else {
        println!("{}", config_path.display());
        println!("{}", "File does not exist. Use --create to create it.".yellow());
    }

    Ok(())
}

/// Show example configuration
pub async fn run_example() -> Result<()> {
    println!("{}", system_config::example_config());
    Ok(())
}

fn get_value(config: &SystemConfig, key: &str) -> Result<String> {
    let value = match key {
        "watcher.poll_interval_secs" => config.watcher.poll_interval_secs.to_string(),
        "display.show_hidden" => config.display.show_hidden.to_string(),
        "display.human_sizes" => config.display.human_sizes.to_string(),
        _ => anyhow::bail!(
            "Unknown config key: {}. Use 'twinpane config --list' to see available keys.",
            key
        ),
    };
    Ok(value)
}

fn set_value(config: &mut SystemConfig, key: &str, value: &str) -> Result<()> {
    match key {
        "watcher.poll_interval_secs" => {
            let val: u64 = value.parse()
                .context("Invalid value: must be a positive integer")?;
            config.watcher.poll_interval_secs = val;
        }
        "display.show_hidden" => {
            let val: bool = value.parse()
                .context("Invalid value: must be 'true' or 'false'")?;
            config.display.show_hidden = val;
        }
        "display.human_sizes" => {
            let val: bool = value.parse()
                .context("Invalid value: must be 'true' or 'false'")?;
            config.display.human_sizes = val;
        }
        _ => anyhow::bail!(
            "Unknown config key: {}. Use 'twinpane config --list' to see available keys.",
            key
        ),
    }
    Ok(())
}
