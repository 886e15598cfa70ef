#![forbid(unsafe_code)]

//! Test harness for Ledgerline.
//!
//! In-memory stand-ins for the collaborators the undo manager talks to, so
//! integration tests can drive full record/undo/redo cycles and assert on
//! the resulting store contents.
//!
//! - [`MemoryStore`] - column store that captures prior state and records
//!   through the manager; also the [`Submitter`](ledgerline_undo::Submitter)
//! - [`SequenceClock`] - deterministic monotonic timestamps
//! - [`RecordingAnnouncer`] - keeps every announced event
//! - [`Fixture`] - all of the above wired to one [`UndoManager`]

pub mod announcer;
pub mod clock;
pub mod store;

use std::sync::Arc;

use ledgerline_undo::{UndoConfig, UndoManager};

pub use announcer::RecordingAnnouncer;
pub use clock::SequenceClock;
pub use store::{MemoryStore, StoreSnapshot};

/// A manager wired to in-memory collaborators.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub manager: Arc<UndoManager>,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<SequenceClock>,
    pub announcer: Arc<RecordingAnnouncer>,
}

impl Fixture {
    /// Standard rules, default history size.
    #[must_use]
    pub fn new() -> Self {
        Self::build(|manager| manager)
    }

    /// Apply `config` to the manager.
    #[must_use]
    pub fn with_config(config: &UndoConfig) -> Self {
        Self::build(|manager| manager.with_config(config))
    }

    fn build(configure: impl FnOnce(UndoManager) -> UndoManager) -> Self {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(SequenceClock::new(1_700_000_000_000, 0xBEEF));
        let announcer = Arc::new(RecordingAnnouncer::new());
        let manager = configure(
            UndoManager::new(clock.clone(), store.clone()).with_announcer(announcer.clone()),
        );
        Self {
            manager: Arc::new(manager),
            store,
            clock,
            announcer,
        }
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
