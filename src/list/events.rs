//! Change notifications emitted by a list cache.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The kind of change a batch mutation made.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Deleted,
    Updated,
    /// Reserved. No list cache operation emits it.
    Modified,
}

/// One batch mutation and the records it carried, in argument order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "records", rename_all = "snake_case")]
pub enum ChangeEvent<T> {
    /// Records were persisted and appended.
    Added(Vec<T>),

    /// Records were deleted.
    Deleted(Vec<T>),

    /// A record replaced whatever was stored under its key.
    Updated(Vec<T>),

    /// Reserved for listeners of custom caches; never produced here.
    Modified(Vec<T>),
}

impl<T> ChangeEvent<T> {
    pub fn new(kind: ChangeKind, records: Vec<T>) -> Self {
        match kind {
            ChangeKind::Added => ChangeEvent::Added(records),
            ChangeKind::Deleted => ChangeEvent::Deleted(records),
            ChangeKind::Updated => ChangeEvent::Updated(records),
            ChangeKind::Modified => ChangeEvent::Modified(records),
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            ChangeEvent::Added(_) => ChangeKind::Added,
            ChangeEvent::Deleted(_) => ChangeKind::Deleted,
            ChangeEvent::Updated(_) => ChangeKind::Updated,
            ChangeEvent::Modified(_) => ChangeKind::Modified,
        }
    }

    pub fn records(&self) -> &[T] {
        match self {
            ChangeEvent::Added(records)
            | ChangeEvent::Deleted(records)
            | ChangeEvent::Updated(records)
            | ChangeEvent::Modified(records) => records,
        }
    }

    pub fn into_records(self) -> Vec<T> {
        match self {
            ChangeEvent::Added(records)
            | ChangeEvent::Deleted(records)
            | ChangeEvent::Updated(records)
            | ChangeEvent::Modified(records) => records,
        }
    }
}

/// Receives one event per batch mutation, after the batch is persisted.
///
/// Any `Fn(&ChangeEvent<T>)` closure is a listener.
pub trait ChangeListener<T>: Send + Sync {
    fn notify(&self, event: &ChangeEvent<T>);
}

impl<T, F> ChangeListener<T> for F
where
    F: Fn(&ChangeEvent<T>) + Send + Sync,
{
    fn notify(&self, event: &ChangeEvent<T>) {
        self(event)
    }
}

/// Listener that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopListener;

impl<T> ChangeListener<T> for NoopListener {
    fn notify(&self, _event: &ChangeEvent<T>) {}
}

/// Forwards events into a channel.
///
/// A full bounded channel drops the event rather than blocking the
/// mutation that produced it.
pub struct ChannelListener<T> {
    sender: Sender<ChangeEvent<T>>,
}

impl<T> ChannelListener<T> {
    pub fn unbounded() -> (Self, Receiver<ChangeEvent<T>>) {
        let (sender, receiver) = unbounded();
        (Self { sender }, receiver)
    }

    pub fn bounded(capacity: usize) -> (Self, Receiver<ChangeEvent<T>>) {
        let (sender, receiver) = bounded(capacity);
        (Self { sender }, receiver)
    }
}

impl<T: Clone + Send> ChangeListener<T> for ChannelListener<T> {
    fn notify(&self, event: &ChangeEvent<T>) {
        match self.sender.try_send(event.clone()) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                warn!(kind = ?event.kind(), "change channel full, dropping event");
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!("change channel disconnected");
            }
        }
    }
}
