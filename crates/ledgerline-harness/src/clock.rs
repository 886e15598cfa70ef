#![forbid(unsafe_code)]

//! Deterministic clock.

use std::sync::atomic::{AtomicU64, Ordering};

use ledgerline_core::Timestamp;
use ledgerline_undo::Clock;

/// Hands out strictly increasing timestamps, one millisecond apart.
#[derive(Debug)]
pub struct SequenceClock {
    next_millis: AtomicU64,
    node: u64,
    issued: AtomicU64,
}

impl SequenceClock {
    #[must_use]
    pub fn new(start_millis: u64, node: u64) -> Self {
        Self {
            next_millis: AtomicU64::new(start_millis),
            node,
            issued: AtomicU64::new(0),
        }
    }

    /// Number of timestamps issued so far.
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }
}

impl Clock for SequenceClock {
    fn next_timestamp(&self) -> Timestamp {
        self.issued.fetch_add(1, Ordering::Relaxed);
        let millis = self.next_millis.fetch_add(1, Ordering::Relaxed);
        Timestamp::new(millis, 0, self.node)
    }
}
