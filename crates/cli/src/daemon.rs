//! Foreground watch session
//!
//! Plays the part of the application shell: the watcher is created with empty
//! panes and started once, stdin lines stand in for the UI assigning and
//! closing pane directories, and shutdown stops the watcher.

use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use twinpane_watcher::{ChannelSink, Pane, PaneEvent, PaneWatcher, WatcherConfig};

/// Control line sent by the UI side
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    /// Watch a directory in a pane
    Watch(Pane, PathBuf),
    /// Stop watching a pane
    Close(Pane),
    /// Print pane state
    Status,
    /// End the session
    Quit,
}

/// Parse one control line; blank lines yield `None`
pub fn parse_control(line: &str) -> Result<Option<Control>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let control = match command {
        "left" | "right" => {
            if rest.is_empty() {
                anyhow::bail!("Usage: {} <path>", command);
            }
            Control::Watch(command.parse()?, PathBuf::from(rest))
        }
        "close" => Control::Close(rest.parse()?),
        "status" => Control::Status,
        "quit" | "exit" | "q" => Control::Quit,
        _ => anyhow::bail!(
            "Unknown command '{}' (expected left, right, close, status, quit)",
            command
        ),
    };

    Ok(Some(control))
}

/// Run a watch session until `quit`, end of input or Ctrl-C
pub async fn run(config: &WatcherConfig, left: Option<PathBuf>, right: Option<PathBuf>) -> Result<()> {
    let (sink, mut events) = ChannelSink::new();
    let watcher = PaneWatcher::from_config(config, sink);

    for (pane, path) in [(Pane::Left, left), (Pane::Right, right)] {
        if let Some(path) = path {
            watcher.set_target(pane, util::absolute_path(&path)?);
        }
    }

    watcher.start();
    info!("Watch session started");
    println!(
        "{} (every {}s). Commands: left <path>, right <path>, close <pane>, status, quit",
        "Watching".bold(),
        watcher.interval().as_secs()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            Some(event) = events.recv() => report_event(&watcher, &event),
            line = lines.next_line() => {
                match line.context("Failed to read control input")? {
                    Some(line) => match parse_control(&line) {
                        Ok(Some(Control::Quit)) => break,
                        Ok(Some(control)) => apply(&watcher, control)?,
                        Ok(None) => {}
                        Err(e) => eprintln!("{} {}", "error:".red(), e),
                    },
                    // Input closed: the UI side is gone
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    watcher.stop().await;
    info!("Watch session ended");
    println!("Watcher stopped");
    Ok(())
}

fn apply(watcher: &PaneWatcher, control: Control) -> Result<()> {
    debug!("Control: {:?}", control);
    match control {
        Control::Watch(pane, path) => {
            let path = util::absolute_path(&path)?;
            println!("{} pane -> {}", pane, path.display().cyan());
            watcher.set_target(pane, path);
        }
        Control::Close(pane) => {
            println!("{} pane closed", pane);
            watcher.clear_target(pane);
        }
        Control::Status => print_status(watcher),
        Control::Quit => {}
    }
    Ok(())
}

fn report_event(watcher: &PaneWatcher, event: &PaneEvent) {
    let target = watcher.target(event.pane);
    let path = target
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    println!(
        "{} {} changed: {} ({} entries)",
        "●".green(),
        event.pane,
        path.cyan(),
        target.last_count
    );

    if let Some(err) = watcher.last_error() {
        println!("  {} {}", "warning:".yellow(), err);
    }
}

fn print_status(watcher: &PaneWatcher) {
    println!(
        "Watcher: {}",
        if watcher.is_running() {
            "running".green().to_string()
        } else {
            "stopped".red().to_string()
        }
    );

    for pane in Pane::ALL {
        let target = watcher.target(pane);
        match target.path() {
            Some(path) => println!(
                "  {:<6} {} ({} entries, {})",
                pane.to_string(),
                path.display(),
                target.last_count,
                target.last_fingerprint.short().dimmed()
            ),
            None => println!("  {:<6} {}", pane.to_string(), "(not watched)".dimmed()),
        }
    }

    if let Some(err) = watcher.last_error() {
        println!("  Last error: {}", err.yellow());
    }
}
