#![forbid(unsafe_code)]

//! Announcer that remembers what it was told.

use std::sync::{Mutex, PoisonError};

use ledgerline_undo::{Announcer, UndoEvent};

#[derive(Debug, Default)]
pub struct RecordingAnnouncer {
    events: Mutex<Vec<UndoEvent>>,
}

impl RecordingAnnouncer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All events announced so far, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<UndoEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<UndoEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Announcer for RecordingAnnouncer {
    fn announce(&self, event: &UndoEvent) {
        tracing::trace!(target: "ledgerline.harness", event = %event.kind, "recorded announcement");
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}
