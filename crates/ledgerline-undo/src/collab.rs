#![forbid(unsafe_code)]

//! Collaborator seams.
//!
//! The undo manager depends on three external services: the logical clock
//! that stamps outgoing operations, the submission channel that applies them
//! to the store and queues them for sync, and the notification channel that
//! tells in-process listeners what changed.

use std::fmt;

use async_trait::async_trait;
use ledgerline_core::{Operation, Timestamp};
use tokio::sync::broadcast;

use crate::error::SubmitError;
use crate::event::UndoEvent;

/// Source of fresh logical timestamps, monotonic per process.
pub trait Clock: Send + Sync {
    fn next_timestamp(&self) -> Timestamp;
}

/// Applies operations to the authoritative store and queues them for sync.
///
/// One call is one atomic unit from the caller's point of view.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, operations: Vec<Operation>) -> Result<(), SubmitError>;
}

/// Fire-and-forget broadcast of undo/redo events.
pub trait Announcer: Send + Sync {
    fn announce(&self, event: &UndoEvent);
}

/// Announcer that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAnnouncer;

impl Announcer for NullAnnouncer {
    fn announce(&self, _event: &UndoEvent) {}
}

/// Announcer fanning events out over a `tokio` broadcast channel.
///
/// Sending never blocks; with no subscribers the event is dropped, and slow
/// subscribers observe `RecvError::Lagged` rather than back-pressuring undo.
#[derive(Clone)]
pub struct BroadcastAnnouncer {
    sender: broadcast::Sender<UndoEvent>,
}

impl fmt::Debug for BroadcastAnnouncer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BroadcastAnnouncer")
            .field("receivers", &self.sender.receiver_count())
            .finish()
    }
}

impl BroadcastAnnouncer {
    /// Create an announcer buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UndoEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastAnnouncer {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Announcer for BroadcastAnnouncer {
    fn announce(&self, event: &UndoEvent) {
        if self.sender.send(event.clone()).is_err() {
            tracing::trace!(target: "ledgerline.undo", "no undo-event subscribers");
        }
    }
}
