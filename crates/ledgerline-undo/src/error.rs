#![forbid(unsafe_code)]

//! Error types.

use thiserror::Error;

use crate::event::UndoKind;

/// Boxed error returned by a [`Submitter`](crate::collab::Submitter).
pub type SubmitError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, UndoError>;

/// Failure of an undo or redo.
///
/// The log cursor has already moved when submission fails, so the store and
/// the log disagree afterwards. Callers should surface the failure and
/// reconcile, e.g. via `reset_history` followed by a fresh read, rather than
/// retrying.
#[derive(Debug, Error)]
pub enum UndoError {
    #[error("{kind} submission of {operations} operations failed: {source}")]
    Submission {
        kind: UndoKind,
        operations: usize,
        #[source]
        source: SubmitError,
    },
}

impl UndoError {
    /// Which history move failed.
    #[must_use]
    pub fn kind(&self) -> UndoKind {
        match self {
            Self::Submission { kind, .. } => *kind,
        }
    }
}
