//! Polling watcher for the two panes
//!
//! Every cycle arms a wait window, snapshots each monitored pane, compares
//! against what was last observed, and emits a notification per changed pane.
//! The window is cut short by [`PaneWatcher::stop`].

use crate::config::WatcherConfig;
use crate::sink::NotificationSink;
use crate::target::{Pane, WatchTarget};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use twinpane_core::{ErrorSlot, LocalFs, MetadataProvider, Snapshot};

/// Directory change watcher for the left and right panes
///
/// Starts `Stopped`. [`start`](Self::start) spawns the polling task on the
/// current tokio runtime; [`stop`](Self::stop) clears both targets and ends
/// the task without waiting out the current window.
pub struct PaneWatcher {
    shared: Arc<Shared>,
    running: Mutex<Option<RunningLoop>>,
}

/// State shared between the controller and the polling task
struct Shared {
    targets: Mutex<[WatchTarget; 2]>,
    sink: Arc<dyn NotificationSink>,
    provider: Arc<dyn MetadataProvider>,
    errors: ErrorSlot,
    interval: Duration,
    /// Set by `stop()` before targets are cleared; checked before every emit
    stopping: AtomicBool,
}

struct RunningLoop {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl PaneWatcher {
    /// Create a watcher polling the local filesystem every `interval`
    pub fn new<S>(interval: Duration, sink: S) -> Self
    where
        S: NotificationSink + 'static,
    {
        Self::with_provider(interval, sink, LocalFs)
    }

    /// Create a watcher from configuration
    pub fn from_config<S>(config: &WatcherConfig, sink: S) -> Self
    where
        S: NotificationSink + 'static,
    {
        Self::new(config.poll_interval(), sink)
    }

    /// Create a watcher reading metadata through `provider`
    pub fn with_provider<S, P>(interval: Duration, sink: S, provider: P) -> Self
    where
        S: NotificationSink + 'static,
        P: MetadataProvider + 'static,
    {
        Self {
            shared: Arc::new(Shared {
                targets: Mutex::new([WatchTarget::default(), WatchTarget::default()]),
                sink: Arc::new(sink),
                provider: Arc::new(provider),
                errors: ErrorSlot::new(),
                interval,
                stopping: AtomicBool::new(false),
            }),
            running: Mutex::new(None),
        }
    }

    /// Watch `path` in `pane`
    ///
    /// Only the path is replaced. The stored count and fingerprint are kept,
    /// so the switch is reported by the next cycle, up to one full interval
    /// later. Callers wanting an immediate listing take a
    /// [`Snapshot`] themselves. An empty path clears the pane.
    pub fn set_target(&self, pane: Pane, path: impl Into<PathBuf>) {
        let path = path.into();
        if path.as_os_str().is_empty() {
            self.clear_target(pane);
            return;
        }

        debug!("Watching {} pane: {}", pane, path.display());
        self.shared.targets.lock()[pane.index()].assign(path);
    }

    /// Stop monitoring `pane`
    pub fn clear_target(&self, pane: Pane) {
        debug!("Closing {} pane watch", pane);
        self.shared.targets.lock()[pane.index()].clear();
    }

    /// Copy of the current state of `pane`
    pub fn target(&self, pane: Pane) -> WatchTarget {
        self.shared.targets.lock()[pane.index()].clone()
    }

    /// Last recorded failure, if the most recent cycle had one
    pub fn last_error(&self) -> Option<String> {
        self.shared.errors.get()
    }

    pub fn interval(&self) -> Duration {
        self.shared.interval
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
    }

    /// Spawn the polling task
    ///
    /// Returns `false` without spawning anything if a task is already
    /// running. Must be called from within a tokio runtime.
    pub fn start(&self) -> bool {
        let mut running = self.running.lock();
        if running.as_ref().is_some_and(|r| !r.handle.is_finished()) {
            debug!("Watcher already running; ignoring start");
            return false;
        }

        self.shared.stopping.store(false, Ordering::SeqCst);
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(run(Arc::clone(&self.shared), stop_rx));
        *running = Some(RunningLoop { stop_tx, handle });
        true
    }

    /// Clear both targets and end the polling task
    ///
    /// The pending wait window is cancelled immediately. Once this returns no
    /// further notifications are emitted; stored counts and fingerprints are
    /// left as they were.
    pub async fn stop(&self) {
        // Flag and take under one lock so a concurrent start() cannot slip in
        let running = {
            let mut running = self.running.lock();
            self.shared.stopping.store(true, Ordering::SeqCst);
            running.take()
        };

        {
            let mut targets = self.shared.targets.lock();
            for target in targets.iter_mut() {
                target.clear();
            }
        }

        let Some(running) = running else {
            return;
        };

        let _ = running.stop_tx.send(true);
        if let Err(e) = running.handle.await {
            warn!("Watcher task ended abnormally: {}", e);
        }
        info!("Pane watcher stopped");
    }

    /// Run one detection pass over both panes
    ///
    /// Returns the number of notifications emitted. The polling task calls
    /// this once per cycle.
    pub fn poll_once(&self) -> usize {
        self.shared.poll_once()
    }
}

impl Shared {
    fn poll_once(&self) -> usize {
        self.errors.clear();

        let mut emitted = 0;
        for pane in Pane::ALL {
            if self.poll_pane(pane) {
                emitted += 1;
            }
        }
        emitted
    }

    fn poll_pane(&self, pane: Pane) -> bool {
        let Some(path) = self.targets.lock()[pane.index()].path.clone() else {
            return false;
        };

        // The filesystem is read without holding the pane lock
        let snapshot = match Snapshot::capture_with(self.provider.as_ref(), &path) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Snapshot of {} pane failed: {}", pane, e);
                self.errors.record(&e);
                return false;
            }
        };
        if let Some(e) = snapshot.errors().last() {
            warn!(
                "{} of {} entries in {} pane could not be read: {}",
                snapshot.errors().len(),
                snapshot.count() + snapshot.errors().len(),
                pane,
                e
            );
            self.errors.record(e);
        }

        let mut targets = self.targets.lock();
        let target = &mut targets[pane.index()];

        // Retargeted, cleared or stopped while the listing was taken
        if self.stopping.load(Ordering::SeqCst) || target.path() != Some(path.as_path()) {
            debug!("{} pane changed during poll; skipping", pane);
            return false;
        }

        if target.observe(snapshot.count(), || snapshot.fingerprint()) {
            info!(
                "{} pane changed: {} entries ({})",
                pane,
                target.last_count,
                target.last_fingerprint.short()
            );
            self.sink.emit(pane.channel(), "");
            true
        } else {
            debug!("{} pane unchanged", pane);
            false
        }
    }
}

/// Polling task body
async fn run(shared: Arc<Shared>, mut stop_rx: watch::Receiver<bool>) {
    info!("Starting pane watcher (interval: {:?})", shared.interval);

    while !*stop_rx.borrow() {
        let window = tokio::time::sleep(shared.interval);

        let cycle = Arc::clone(&shared);
        match tokio::task::spawn_blocking(move || cycle.poll_once()).await {
            Ok(0) => {}
            Ok(emitted) => debug!("Poll cycle emitted {} notifications", emitted),
            Err(e) => warn!("Poll cycle failed: {}", e),
        }

        tokio::select! {
            _ = window => {}
            changed = stop_rx.changed() => {
                if changed.is_err() {
                    // Controller dropped without stopping
                    break;
                }
            }
        }
    }

    debug!("Pane watcher loop exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::ChannelSink;
    use std::fs;
    use std::io;
    use std::path::Path;
    use twinpane_core::{DirChild, FileStat};
    use tempfile::TempDir;

    /// Sink recording every channel it is called with
    #[derive(Default)]
    struct RecordingSink {
        channels: Mutex<Vec<String>>,
    }

    impl RecordingSink {
        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.channels.lock())
        }
    }

    impl NotificationSink for RecordingSink {
        fn emit(&self, channel: &str, payload: &str) {
            assert!(payload.is_empty());
            self.channels.lock().push(channel.to_string());
        }
    }

    fn recording_watcher(interval: Duration) -> (PaneWatcher, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        (PaneWatcher::new(interval, Arc::clone(&sink)), sink)
    }

    /// Watcher with one settled pane pointing at `dir`
    fn settled(dir: &TempDir, pane: Pane) -> (PaneWatcher, Arc<RecordingSink>) {
        let (watcher, sink) = recording_watcher(Duration::from_secs(30));
        watcher.set_target(pane, dir.path());
        watcher.poll_once();
        sink.take();
        (watcher, sink)
    }

    #[test]
    fn test_adding_file_emits_once() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), b"a").unwrap();
        let (watcher, sink) = settled(&temp_dir, Pane::Left);

        assert_eq!(watcher.poll_once(), 0);

        fs::write(temp_dir.path().join("b.txt"), b"b").unwrap();
        assert_eq!(watcher.poll_once(), 1);
        assert_eq!(sink.take(), vec!["leftSideChange"]);
        assert_eq!(watcher.target(Pane::Left).last_count, 2);

        assert_eq!(watcher.poll_once(), 0);
        assert!(sink.take().is_empty());
    }

    #[test]
    fn test_same_size_rename_emits_once() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("old.txt"), b"same").unwrap();
        fs::write(temp_dir.path().join("keep.txt"), b"keep").unwrap();
        let (watcher, sink) = settled(&temp_dir, Pane::Right);

        fs::rename(temp_dir.path().join("old.txt"), temp_dir.path().join("new.txt")).unwrap();

        assert_eq!(watcher.poll_once(), 1);
        assert_eq!(sink.take(), vec!["rightSideChange"]);
        assert_eq!(watcher.poll_once(), 0);
    }

    #[test]
    fn test_first_poll_after_assignment_reports() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a"), b"a").unwrap();

        let (watcher, sink) = recording_watcher(Duration::from_secs(30));
        watcher.set_target(Pane::Left, temp_dir.path());

        assert_eq!(watcher.poll_once(), 1);
        assert_eq!(sink.take(), vec!["leftSideChange"]);
    }

    #[test]
    fn test_switch_to_same_count_different_names() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::write(first.path().join("alpha"), b"1").unwrap();
        fs::write(first.path().join("beta"), b"22").unwrap();
        fs::write(second.path().join("gamma"), b"1").unwrap();
        fs::write(second.path().join("delta"), b"22").unwrap();

        let (watcher, sink) = settled(&first, Pane::Left);
        let before = watcher.target(Pane::Left);

        watcher.set_target(Pane::Left, second.path());
        assert_eq!(watcher.target(Pane::Left).last_fingerprint, before.last_fingerprint);

        assert_eq!(watcher.poll_once(), 1);
        assert_eq!(sink.take(), vec!["leftSideChange"]);

        let after = watcher.target(Pane::Left);
        assert_eq!(after.last_count, before.last_count);
        assert_ne!(after.last_fingerprint, before.last_fingerprint);
    }

    #[test]
    fn test_switch_to_identical_listing_is_silent() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        for dir in [&first, &second] {
            fs::write(dir.path().join("same.txt"), b"abc").unwrap();
        }

        let (watcher, sink) = settled(&first, Pane::Left);
        watcher.set_target(Pane::Left, second.path());

        assert_eq!(watcher.poll_once(), 0);
        assert!(sink.take().is_empty());
    }

    #[test]
    fn test_cleared_pane_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        let (watcher, sink) = recording_watcher(Duration::from_secs(30));
        watcher.set_target(Pane::Left, &missing);
        watcher.clear_target(Pane::Left);
        watcher.set_target(Pane::Right, "");

        assert_eq!(watcher.poll_once(), 0);
        assert!(sink.take().is_empty());
        // Nothing was snapshotted, so nothing failed
        assert!(watcher.last_error().is_none());
        assert!(!watcher.target(Pane::Right).is_active());
    }

    #[test]
    fn test_unreadable_pane_does_not_block_other() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");
        let good = TempDir::new().unwrap();
        fs::write(good.path().join("file"), b"x").unwrap();

        let (watcher, sink) = recording_watcher(Duration::from_secs(30));
        watcher.set_target(Pane::Left, &missing);
        watcher.set_target(Pane::Right, good.path());

        assert_eq!(watcher.poll_once(), 1);
        assert_eq!(sink.take(), vec!["rightSideChange"]);
        assert!(watcher.last_error().unwrap().contains("missing"));

        // Left state untouched while unreadable
        let left = watcher.target(Pane::Left);
        assert_eq!(left.last_count, 0);

        // Becoming readable again reports once
        fs::create_dir(&missing).unwrap();
        fs::write(missing.join("late"), b"late").unwrap();
        assert_eq!(watcher.poll_once(), 1);
        assert_eq!(sink.take(), vec!["leftSideChange"]);
        assert!(watcher.last_error().is_none());
    }

    #[test]
    fn test_vanished_directory_keeps_last_state() {
        let parent = TempDir::new().unwrap();
        let dir = parent.path().join("doomed");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("a"), b"a").unwrap();

        let (watcher, sink) = recording_watcher(Duration::from_secs(30));
        watcher.set_target(Pane::Left, &dir);
        watcher.poll_once();
        sink.take();

        fs::remove_dir_all(&dir).unwrap();
        assert_eq!(watcher.poll_once(), 0);
        assert_eq!(watcher.target(Pane::Left).last_count, 1);
        assert!(watcher.last_error().is_some());

        // Recreated with the same listing: nothing to report
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("a"), b"a").unwrap();
        assert_eq!(watcher.poll_once(), 0);
    }

    /// In-memory listing where some children cannot be stat'ed
    struct ScriptedFs {
        dirs: Vec<(&'static str, Vec<&'static str>)>,
        broken: &'static str,
    }

    impl ScriptedFs {
        fn stat(&self, path: &Path) -> io::Result<FileStat> {
            if path.file_name().is_some_and(|name| name == self.broken) {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"));
            }
            Ok(FileStat {
                is_dir: false,
                is_symlink: false,
                len: 1,
                modified: None,
                mode: 0o644,
            })
        }
    }

    impl MetadataProvider for ScriptedFs {
        fn read_dir(&self, path: &Path) -> io::Result<Vec<io::Result<DirChild>>> {
            let (_, children) = self
                .dirs
                .iter()
                .find(|(dir, _)| Path::new(dir) == path)
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?;
            Ok(children
                .iter()
                .map(|name| {
                    Ok(DirChild {
                        name: name.to_string(),
                        path: path.join(name),
                    })
                })
                .collect())
        }

        fn symlink_metadata(&self, path: &Path) -> io::Result<FileStat> {
            self.stat(path)
        }

        fn metadata(&self, path: &Path) -> io::Result<FileStat> {
            self.stat(path)
        }
    }

    #[test]
    fn test_unreadable_child_still_reports_pane() {
        let provider = ScriptedFs {
            dirs: vec![
                ("/panes/left", vec!["kept.txt", "locked.txt", "other.txt"]),
                ("/panes/right", vec!["solo.txt"]),
            ],
            broken: "locked.txt",
        };
        let sink = Arc::new(RecordingSink::default());
        let watcher = PaneWatcher::with_provider(Duration::from_secs(30), Arc::clone(&sink), provider);
        watcher.set_target(Pane::Left, "/panes/left");
        watcher.set_target(Pane::Right, "/panes/right");

        assert_eq!(watcher.poll_once(), 2);
        assert_eq!(sink.take(), vec!["leftSideChange", "rightSideChange"]);

        // The bad child is left out of the count but named in the slot
        assert_eq!(watcher.target(Pane::Left).last_count, 2);
        assert_eq!(watcher.target(Pane::Right).last_count, 1);
        let err = watcher.last_error().unwrap();
        assert!(err.contains("locked.txt"), "unexpected error: {}", err);

        // Nothing changed on disk; the error stays but nothing is re-emitted
        assert_eq!(watcher.poll_once(), 0);
        assert!(sink.take().is_empty());
        assert!(watcher.last_error().unwrap().contains("locked.txt"));
    }

    #[test]
    fn test_from_config_uses_poll_interval() {
        let config = WatcherConfig { poll_interval_secs: 7 };
        let (sink, _events) = ChannelSink::new();
        let watcher = PaneWatcher::from_config(&config, sink);
        assert_eq!(watcher.interval(), Duration::from_secs(7));
    }

    #[tokio::test]
    async fn test_start_is_guarded() {
        let (watcher, _sink) = recording_watcher(Duration::from_secs(3600));

        assert!(!watcher.is_running());
        assert!(watcher.start());
        assert!(!watcher.start());
        assert!(watcher.is_running());

        watcher.stop().await;
        assert!(!watcher.is_running());

        assert!(watcher.start());
        watcher.stop().await;
    }

    #[tokio::test]
    async fn test_stop_cancels_window() {
        let (watcher, _sink) = recording_watcher(Duration::from_secs(3600));
        watcher.start();

        // Let the first cycle finish and park in the window
        tokio::time::sleep(Duration::from_millis(50)).await;

        tokio::time::timeout(Duration::from_secs(2), watcher.stop())
            .await
            .expect("stop should not wait out the window");
    }

    #[tokio::test]
    async fn test_stop_on_stopped_watcher_clears_targets() {
        let temp_dir = TempDir::new().unwrap();
        let (watcher, _sink) = recording_watcher(Duration::from_secs(30));
        watcher.set_target(Pane::Left, temp_dir.path());

        watcher.stop().await;
        assert!(!watcher.target(Pane::Left).is_active());
    }

    #[tokio::test]
    async fn test_loop_reports_changes() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a"), b"a").unwrap();

        let (sink, mut rx) = ChannelSink::new();
        let watcher = PaneWatcher::new(Duration::from_millis(50), sink);
        watcher.set_target(Pane::Left, temp_dir.path());
        watcher.start();

        let first = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.pane, Pane::Left);

        fs::write(temp_dir.path().join("b"), b"b").unwrap();
        let second = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.pane, Pane::Left);

        watcher.stop().await;
    }

    #[tokio::test]
    async fn test_restart_after_stop_reports_again() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a"), b"a").unwrap();

        let (sink, mut rx) = ChannelSink::new();
        let watcher = PaneWatcher::new(Duration::from_millis(20), sink);
        watcher.start();
        watcher.stop().await;
        assert!(!watcher.is_running());

        // stop() left the stop flag raised; a fresh start must lower it
        watcher.set_target(Pane::Left, temp_dir.path());
        assert!(watcher.start());

        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.pane, Pane::Left);

        watcher.stop().await;
    }

    #[tokio::test]
    async fn test_no_notifications_after_stop() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a"), b"a").unwrap();

        let (sink, mut rx) = ChannelSink::new();
        let watcher = PaneWatcher::new(Duration::from_millis(20), sink);
        watcher.set_target(Pane::Right, temp_dir.path());
        watcher.start();

        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();

        watcher.stop().await;
        let frozen = watcher.target(Pane::Right);

        fs::write(temp_dir.path().join("b"), b"b").unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(rx.try_recv().is_err());
        assert_eq!(frozen.path, None);
        assert_eq!(watcher.target(Pane::Right), frozen);
        assert_eq!(frozen.last_count, 1);
    }
}
