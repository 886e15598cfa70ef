#![forbid(unsafe_code)]

//! Notifications emitted after undo/redo submissions.

use std::collections::BTreeSet;
use std::fmt;

use ledgerline_core::Operation;

use crate::annotation::Annotation;
use crate::context::TransactionTag;

/// Direction of a history move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UndoKind {
    Undo,
    Redo,
}

impl UndoKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Undo => "undo",
            Self::Redo => "redo",
        }
    }
}

impl fmt::Display for UndoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of the `"undo-event"` broadcast.
///
/// Listeners use `affected_datasets` to invalidate derived caches and `meta`
/// to tell the user what was reverted or replayed.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoEvent {
    pub kind: UndoKind,
    /// The stamped operations that were submitted.
    pub operations: Vec<Operation>,
    pub affected_datasets: BTreeSet<String>,
    pub meta: Option<Annotation>,
    pub transaction_tag: Option<TransactionTag>,
}

impl UndoEvent {
    /// Event name on the notification channel.
    pub const NAME: &'static str = "undo-event";

    #[must_use]
    pub fn new(
        kind: UndoKind,
        operations: Vec<Operation>,
        meta: Option<Annotation>,
        transaction_tag: Option<TransactionTag>,
    ) -> Self {
        let affected_datasets = operations.iter().map(|op| op.dataset.clone()).collect();
        Self {
            kind,
            operations,
            affected_datasets,
            meta,
            transaction_tag,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Returns `true` if any submitted operation touched `dataset`.
    #[must_use]
    pub fn affects(&self, dataset: &str) -> bool {
        self.affected_datasets.contains(dataset)
    }
}
