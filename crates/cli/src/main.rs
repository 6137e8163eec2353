//! Twinpane CLI - twinpane command

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;

mod cmd;
mod daemon;
mod system_config;
mod util;

/// Twinpane - dual-pane file manager backend
#[derive(Parser)]
#[command(name = "twinpane")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List a directory once
    Ls {
        /// Directory to list (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Print entries as JSON
        #[arg(long)]
        json: bool,
        /// Include dotfiles
        #[arg(short, long)]
        all: bool,
    },
    /// Search below a directory for directories whose path contains a pattern
    Find {
        /// Directory to search from
        path: PathBuf,
        /// Text the directory path must contain
        pattern: String,
        /// Stop after this many matches
        #[arg(long, default_value_t = 20)]
        max: usize,
        /// Print matches as JSON
        #[arg(long)]
        json: bool,
    },
    /// Watch the left and right pane directories for changes
    Watch {
        /// Directory for the left pane
        #[arg(long)]
        left: Option<PathBuf>,
        /// Directory for the right pane
        #[arg(long)]
        right: Option<PathBuf>,
        /// Seconds between polls (default: from config, 30)
        #[arg(long)]
        interval: Option<u64>,
        /// Write logs to this file instead of stdout
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
    /// View or edit configuration
    Config {
        /// List all values (the default)
        #[arg(long)]
        list: bool,
        /// Print one value
        #[arg(long, value_name = "KEY")]
        get: Option<String>,
        /// Set a value
        #[arg(long, num_args = 2, value_names = ["KEY", "VALUE"])]
        set: Option<Vec<String>>,
        /// Print the config file path
        #[arg(long)]
        path: bool,
        /// With --path, create the file if missing
        #[arg(long)]
        create: bool,
        /// Print an annotated example config
        #[arg(long)]
        example: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = match &cli.command {
        Commands::Watch { log_file, .. } => log_file.as_deref(),
        _ => None,
    };
    let _log_guard = init_tracing(log_file)?;

    match cli.command {
        Commands::Ls { path, json, all } => cmd::ls::run(&path, json, all).await,
        Commands::Find { path, pattern, max, json } => {
            cmd::find::run(&path, &pattern, max, json).await
        }
        Commands::Watch { left, right, interval, .. } => {
            cmd::watch::run(left, right, interval).await
        }
        Commands::Config { list, get, set, path, create, example } => {
            if list {
                cmd::config::run_list().await
            } else if let Some(key) = get {
                cmd::config::run_get(&key).await
            } else if let Some(pair) = set {
                cmd::config::run_set(&pair[0], &pair[1]).await
            } else if path {
                cmd::config::run_path(create).await
            } else if example {
                cmd::config::run_example().await
            } else {
                cmd::config::run_list().await
            }
        }
    }
}

/// Initialize tracing, optionally to a log file
///
/// The returned guard flushes the file writer and must outlive `main`'s work.
fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let Some(path) = log_file else {
        tracing_subscriber::fmt::init();
        return Ok(None);
    };

    let path = util::absolute_path(path)?;
    let dir = path.parent().context("Log file has no parent directory")?;
    let file_name = path.file_name().context("Log file has no file name")?;
    std::fs::create_dir_all(dir).context("Failed to create log directory")?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(Some(guard))
}
