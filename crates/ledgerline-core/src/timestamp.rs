#![forbid(unsafe_code)]

//! Logical clock stamps.
//!
//! Timestamps are produced by the synchronization layer's hybrid logical
//! clock. This crate only needs them to be totally ordered and printable;
//! it never generates them itself.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A hybrid logical clock value.
///
/// Ordering is lexicographic over `(millis, counter, node)`, which matches the
/// ordering of the canonical string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Timestamp {
    /// Wall-clock milliseconds observed by the issuing node.
    pub millis: u64,
    /// Logical counter disambiguating stamps within the same millisecond.
    pub counter: u16,
    /// Issuing node identifier.
    pub node: u64,
}

impl Timestamp {
    /// Create a timestamp from its parts.
    #[must_use]
    pub const fn new(millis: u64, counter: u16, node: u64) -> Self {
        Self {
            millis,
            counter,
            node,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:013}-{:04X}-{:016x}",
            self.millis, self.counter, self.node
        )
    }
}
