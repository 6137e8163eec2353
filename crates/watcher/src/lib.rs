//! Directory change watching for Twinpane
//!
//! This crate provides the polling watcher behind the two file panes:
//! - Fixed left/right watch targets with set/clear per pane
//! - A cancellable polling loop (default 30s window)
//! - Count-then-fingerprint change detection
//! - Notification sinks for delivering changes to the UI layer

pub mod config;
pub mod poll;
pub mod sink;
pub mod target;

pub use config::WatcherConfig;
pub use poll::PaneWatcher;
pub use sink::{ChannelSink, NotificationSink, PaneEvent};
pub use target::{Pane, WatchTarget};
