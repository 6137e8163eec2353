//! Delivery of pane change notifications to the UI layer

use crate::target::Pane;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

/// Receiver of change notifications
///
/// Called with a pane channel name (`leftSideChange` / `rightSideChange`) and
/// an empty payload. Delivery is fire-and-forget; implementations must not
/// block the watch loop.
///
/// `emit` runs while the watcher holds its pane lock. Implementations must
/// not call back into the [`PaneWatcher`](crate::PaneWatcher) that owns
/// them; hand the event off (as [`ChannelSink`] does) and read pane state
/// from the receiving side.
pub trait NotificationSink: Send + Sync {
    fn emit(&self, channel: &str, payload: &str);
}

impl<S: NotificationSink + ?Sized> NotificationSink for Arc<S> {
    fn emit(&self, channel: &str, payload: &str) {
        (**self).emit(channel, payload)
    }
}

/// Change notification as seen by in-process consumers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneEvent {
    pub pane: Pane,
    pub payload: String,
}

impl PaneEvent {
    /// Map a channel name back to its pane
    pub fn from_channel(channel: &str, payload: &str) -> Option<Self> {
        let pane = Pane::ALL.into_iter().find(|p| p.channel() == channel)?;
        Some(Self {
            pane,
            payload: payload.to_string(),
        })
    }
}

/// Sink forwarding notifications over an unbounded channel
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<PaneEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver the UI side drains
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PaneEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn emit(&self, channel: &str, payload: &str) {
        let Some(event) = PaneEvent::from_channel(channel, payload) else {
            warn!("Dropping notification on unknown channel '{}'", channel);
            return;
        };

        if self.tx.send(event).is_err() {
            warn!("Notification receiver dropped; {} not delivered", channel);
        }
    }
}
