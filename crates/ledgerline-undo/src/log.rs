#![forbid(unsafe_code)]

//! Transaction log with a movable cursor.
//!
//! The [`TransactionLog`] is a flat sequence of boundary markers and recorded
//! operation batches. A cursor marks "now": entries at or before it are the
//! undoable past, entries after it are the redoable future.
//!
//! # Invariants
//!
//! 1. `entries[0]` is always a boundary marker (the sentinel).
//! 2. `cursor < entries.len()`.
//! 3. No batch sits at index 0; every batch follows a marker or another
//!    batch of the same transaction.
//! 4. The number of markers never exceeds `max_transactions` after a
//!    transaction begins.
//!
//! # Cursor model
//!
//! ```text
//! two transactions recorded
//! ┌───────────────────────────────────────────────┐
//! │ [M0] [M1] [B1] [M2] [B2]                      │
//! │                      ^ cursor                  │
//! └───────────────────────────────────────────────┘
//!
//! step_back()  crosses B2, lands on M2
//! ┌───────────────────────────────────────────────┐
//! │ [M0] [M1] [B1] [M2] [B2]                      │
//! │                 ^ cursor                       │
//! └───────────────────────────────────────────────┘
//!
//! begin_transaction()  drops B2, reuses M2 in place
//! ┌───────────────────────────────────────────────┐
//! │ [M0] [M1] [B1] [M2']                           │
//! │                 ^ cursor                       │
//! └───────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::sync::Arc;

use ledgerline_core::{Operation, PriorState};
use thiserror::Error;
use web_time::Instant;

use crate::annotation::Annotation;
use crate::context::TransactionTag;

/// Default number of transactions retained.
pub const DEFAULT_MAX_TRANSACTIONS: usize = 20;

/// Operations recorded by one transactional unit of work.
#[derive(Debug, Clone)]
pub struct OperationBatch {
    operations: Vec<Operation>,
    prior_state: PriorState,
    tag: Option<TransactionTag>,
    recorded_at: Instant,
}

impl OperationBatch {
    #[must_use]
    pub fn new(
        operations: Vec<Operation>,
        prior_state: PriorState,
        tag: Option<TransactionTag>,
    ) -> Self {
        Self {
            operations,
            prior_state,
            tag,
            recorded_at: Instant::now(),
        }
    }

    /// Operations in the order they were applied.
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Snapshot of every touched row before the batch applied.
    #[must_use]
    pub fn prior_state(&self) -> &PriorState {
        &self.prior_state
    }

    /// Correlation id of the transaction that produced the batch.
    #[must_use]
    pub fn tag(&self) -> Option<&TransactionTag> {
        self.tag.as_ref()
    }

    #[must_use]
    pub fn recorded_at(&self) -> Instant {
        self.recorded_at
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Size in bytes for memory accounting.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self
                .operations
                .iter()
                .map(Operation::size_bytes)
                .sum::<usize>()
            + self.prior_state.size_bytes()
    }
}

/// One log entry.
#[derive(Debug, Clone)]
pub enum LogEntry {
    /// Transaction boundary; carries the annotation of the transaction it opens.
    Marker(Option<Annotation>),
    /// Operations recorded inside a transaction.
    Batch(Arc<OperationBatch>),
}

impl LogEntry {
    #[must_use]
    pub fn is_marker(&self) -> bool {
        matches!(self, Self::Marker(_))
    }

    #[must_use]
    pub fn as_batch(&self) -> Option<&Arc<OperationBatch>> {
        match self {
            Self::Batch(batch) => Some(batch),
            Self::Marker(_) => None,
        }
    }

    #[must_use]
    pub fn annotation(&self) -> Option<&Annotation> {
        match self {
            Self::Marker(annotation) => annotation.as_ref(),
            Self::Batch(_) => None,
        }
    }

    fn size_bytes(&self) -> usize {
        match self {
            Self::Marker(annotation) => {
                std::mem::size_of::<Self>() + annotation.as_ref().map_or(0, Annotation::size_bytes)
            }
            Self::Batch(batch) => std::mem::size_of::<Self>() + batch.size_bytes(),
        }
    }
}

/// How [`TransactionLog::begin_transaction`] opened the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Begin {
    /// A new marker was appended.
    Opened,
    /// The empty marker at the cursor was reused with the new annotation.
    Reused,
}

/// Batches crossed by one cursor move.
#[derive(Debug, Clone, Default)]
pub struct Traversal {
    /// Annotation of the marker delimiting the crossed transaction.
    pub meta: Option<Annotation>,
    /// Crossed batches in log order.
    pub batches: Vec<Arc<OperationBatch>>,
    /// Cursor before the move.
    pub from: usize,
    /// Cursor after the move.
    pub to: usize,
}

impl Traversal {
    /// Returns `true` if no batch was crossed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}

/// Structural problem found by [`TransactionLog::check_invariants`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogViolation {
    #[error("log is empty")]
    Empty,
    #[error("first entry is not a boundary marker")]
    MissingSentinel,
    #[error("cursor {cursor} out of range (len {len})")]
    CursorOutOfRange { cursor: usize, len: usize },
    #[error("{markers} markers exceed the limit of {limit}")]
    TooManyMarkers { markers: usize, limit: usize },
    #[error("empty batch at index {index}")]
    EmptyBatch { index: usize },
}

/// Ordered undo/redo log.
pub struct TransactionLog {
    entries: Vec<LogEntry>,
    cursor: usize,
    max_transactions: usize,
}

impl fmt::Debug for TransactionLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionLog")
            .field("len", &self.entries.len())
            .field("cursor", &self.cursor)
            .field("markers", &self.marker_count())
            .field("max_transactions", &self.max_transactions)
            .finish()
    }
}

impl Default for TransactionLog {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TRANSACTIONS)
    }
}

impl TransactionLog {
    /// Create a log holding only the sentinel marker.
    ///
    /// `max_transactions` is clamped to at least 1 so the sentinel always fits.
    #[must_use]
    pub fn new(max_transactions: usize) -> Self {
        Self {
            entries: vec![LogEntry::Marker(None)],
            cursor: 0,
            max_transactions: max_transactions.max(1),
        }
    }

    // ========================================================================
    // Recording
    // ========================================================================

    /// Open a transaction boundary.
    ///
    /// Discards the redo future first. If the entry at the cursor is a marker
    /// with nothing recorded after it, its annotation is replaced in place so
    /// consecutive empty transactions coalesce; otherwise a new marker is
    /// appended. Capacity is enforced afterwards.
    pub fn begin_transaction(&mut self, annotation: Option<Annotation>) -> Begin {
        self.truncate_future();

        let begin = match self.entries.get_mut(self.cursor) {
            Some(LogEntry::Marker(slot)) => {
                *slot = annotation;
                Begin::Reused
            }
            _ => {
                self.entries.push(LogEntry::Marker(annotation));
                self.cursor = self.entries.len() - 1;
                Begin::Opened
            }
        };

        self.enforce_capacity();
        begin
    }

    /// Append a recorded batch and advance the cursor to it.
    ///
    /// Empty batches are ignored. Returns `true` if the batch was appended.
    pub fn record_batch(&mut self, batch: OperationBatch) -> bool {
        if batch.is_empty() {
            return false;
        }
        self.truncate_future();
        tracing::debug!(
            target: "ledgerline.undo",
            operations = batch.len(),
            tag = batch.tag().map(TransactionTag::as_str),
            index = self.entries.len(),
            "recorded batch"
        );
        self.entries.push(LogEntry::Batch(Arc::new(batch)));
        self.cursor = self.entries.len() - 1;
        true
    }

    /// Drop the stale redo branch, then evict the oldest whole transactions
    /// until at most `max_transactions` markers remain.
    ///
    /// Returns the number of entries evicted by the capacity pass.
    pub fn truncate_future_and_enforce_capacity(&mut self) -> usize {
        self.truncate_future();
        self.enforce_capacity()
    }

    /// Collapse to the single sentinel marker.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.entries.push(LogEntry::Marker(None));
        self.cursor = 0;
    }

    fn truncate_future(&mut self) {
        self.entries.truncate(self.cursor + 1);
    }

    fn enforce_capacity(&mut self) -> usize {
        let markers: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_marker())
            .map(|(i, _)| i)
            .collect();

        if markers.len() <= self.max_transactions {
            return 0;
        }

        let keep_from = markers[markers.len() - self.max_transactions];
        self.entries.drain(..keep_from);
        self.cursor = self.entries.len() - 1;
        tracing::debug!(
            target: "ledgerline.undo",
            evicted = keep_from,
            retained = self.entries.len(),
            "evicted oldest transactions"
        );
        keep_from
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Move the cursor back across one transaction.
    ///
    /// The cursor steps left once, then keeps stepping left until it rests
    /// on a marker (clamped at the sentinel). The returned traversal holds
    /// the batches in `(new cursor, old cursor]` and the annotation of the
    /// marker the cursor now rests on.
    pub fn step_back(&mut self) -> Traversal {
        let end = self.cursor;
        let mut cursor = end.saturating_sub(1);
        while cursor > 0 && !self.entries[cursor].is_marker() {
            cursor -= 1;
        }
        self.cursor = cursor;

        Traversal {
            meta: self.entries[cursor].annotation().cloned(),
            batches: self.batches_between(cursor, end),
            from: end,
            to: cursor,
        }
    }

    /// Move the cursor forward across one transaction.
    ///
    /// The cursor steps right once, then keeps stepping right until it rests
    /// on the next marker (clamped at the last entry). The annotation is taken
    /// from the entry the cursor started on when that entry is a marker, so a
    /// run of redos reports each transaction's own annotation.
    pub fn step_forward(&mut self) -> Traversal {
        let start = self.cursor;
        let last = self.entries.len() - 1;
        let meta = self.entries[start].annotation().cloned();

        let mut cursor = (start + 1).min(last);
        while cursor < last && !self.entries[cursor].is_marker() {
            cursor += 1;
        }
        self.cursor = cursor;

        Traversal {
            meta,
            batches: self.batches_between(start, cursor),
            from: start,
            to: cursor,
        }
    }

    /// Batches in the half-open range `(after, through]`.
    fn batches_between(&self, after: usize, through: usize) -> Vec<Arc<OperationBatch>> {
        if through <= after {
            return Vec::new();
        }
        self.entries[after + 1..=through]
            .iter()
            .filter_map(LogEntry::as_batch)
            .cloned()
            .collect()
    }

    // ========================================================================
    // Info
    // ========================================================================

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`: the sentinel is never removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn max_transactions(&self) -> usize {
        self.max_transactions
    }

    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_marker()).count()
    }

    /// Returns `true` if a batch exists at or before the cursor.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.entries[..=self.cursor]
            .iter()
            .any(|e| !e.is_marker())
    }

    /// Returns `true` if a batch exists after the cursor.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.entries[self.cursor + 1..]
            .iter()
            .any(|e| !e.is_marker())
    }

    /// Annotation of the transaction the next undo would revert.
    #[must_use]
    pub fn next_undo_annotation(&self) -> Option<&Annotation> {
        self.undo_annotations(1).into_iter().next().flatten()
    }

    /// Annotation of the transaction the next redo would replay.
    #[must_use]
    pub fn next_redo_annotation(&self) -> Option<&Annotation> {
        if !self.can_redo() {
            return None;
        }
        self.entries[self.cursor].annotation()
    }

    /// Annotations of undoable transactions, most recent first.
    ///
    /// Only transactions that recorded at least one batch are listed; an
    /// entry is `None` when the transaction was opened without annotation.
    pub fn undo_annotations(&self, limit: usize) -> Vec<Option<&Annotation>> {
        let mut out = Vec::new();
        let mut has_batch = false;
        for entry in self.entries[..=self.cursor].iter().rev() {
            if out.len() >= limit {
                break;
            }
            match entry {
                LogEntry::Batch(_) => has_batch = true,
                LogEntry::Marker(annotation) => {
                    if has_batch {
                        out.push(annotation.as_ref());
                    }
                    has_batch = false;
                }
            }
        }
        out
    }

    /// Approximate memory held by the log.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.entries.iter().map(LogEntry::size_bytes).sum()
    }

    /// Verify the structural invariants listed in the module docs.
    pub fn check_invariants(&self) -> Result<(), LogViolation> {
        let Some(first) = self.entries.first() else {
            return Err(LogViolation::Empty);
        };
        if !first.is_marker() {
            return Err(LogViolation::MissingSentinel);
        }
        if self.cursor >= self.entries.len() {
            return Err(LogViolation::CursorOutOfRange {
                cursor: self.cursor,
                len: self.entries.len(),
            });
        }
        let markers = self.marker_count();
        if markers > self.max_transactions {
            return Err(LogViolation::TooManyMarkers {
                markers,
                limit: self.max_transactions,
            });
        }
        if let Some(index) = self
            .entries
            .iter()
            .position(|e| e.as_batch().is_some_and(|b| b.is_empty()))
        {
            return Err(LogViolation::EmptyBatch { index });
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn push_raw(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(row: &str) -> OperationBatch {
        OperationBatch::new(
            vec![Operation::new("transactions", row, "amount", 100)],
            PriorState::new(),
            Some(TransactionTag::new(format!("tag-{row}"))),
        )
    }

    fn record(log: &mut TransactionLog, name: &str) {
        log.begin_transaction(Some(Annotation::new(name)));
        assert!(log.record_batch(batch(name)));
    }

    fn rows(t: &Traversal) -> Vec<String> {
        t.batches
            .iter()
            .flat_map(|b| b.operations().iter().map(|o| o.row.clone()))
            .collect()
    }

    #[test]
    fn new_log_has_sentinel() {
        let log = TransactionLog::default();
        assert_eq!(log.len(), 1);
        assert_eq!(log.cursor(), 0);
        assert!(!log.can_undo());
        assert!(!log.can_redo());
        assert!(log.check_invariants().is_ok());
    }

    #[test]
    fn begin_appends_marker_after_batch() {
        let mut log = TransactionLog::default();
        // Sentinel is empty, so the first transaction reuses it.
        assert_eq!(log.begin_transaction(Some("a".into())), Begin::Reused);
        log.record_batch(batch("a"));
        assert_eq!(log.begin_transaction(Some("b".into())), Begin::Opened);
        assert_eq!(log.len(), 3);
        assert_eq!(log.cursor(), 2);
    }

    #[test]
    fn consecutive_empty_transactions_coalesce() {
        let mut log = TransactionLog::default();
        record(&mut log, "a");
        log.begin_transaction(Some("empty-1".into()));
        log.begin_transaction(Some("empty-2".into()));
        assert_eq!(log.marker_count(), 2);
        assert_eq!(
            log.entries()[log.cursor()].annotation().map(|a| a.description.as_str()),
            Some("empty-2")
        );
    }

    #[test]
    fn record_empty_batch_is_ignored() {
        let mut log = TransactionLog::default();
        log.begin_transaction(None);
        let empty = OperationBatch::new(Vec::new(), PriorState::new(), None);
        assert!(!log.record_batch(empty));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn step_back_crosses_one_transaction() {
        let mut log = TransactionLog::default();
        record(&mut log, "a");
        record(&mut log, "b");

        let t = log.step_back();
        assert_eq!(rows(&t), vec!["b"]);
        assert_eq!(t.meta.map(|m| m.description), Some("b".to_string()));
        assert!(log.entries()[log.cursor()].is_marker());

        let t = log.step_back();
        assert_eq!(rows(&t), vec!["a"]);
        assert_eq!(log.cursor(), 0);

        let t = log.step_back();
        assert!(t.is_empty());
        assert_eq!(log.cursor(), 0);
    }

    #[test]
    fn step_back_skips_trailing_empty_marker() {
        let mut log = TransactionLog::default();
        record(&mut log, "a");
        record(&mut log, "b");
        log.begin_transaction(Some("nothing".into()));

        let t = log.step_back();
        assert_eq!(rows(&t), vec!["b"]);
    }

    #[test]
    fn multiple_batches_in_one_transaction() {
        let mut log = TransactionLog::default();
        log.begin_transaction(Some("multi".into()));
        log.record_batch(batch("x"));
        log.record_batch(batch("y"));

        let t = log.step_back();
        assert_eq!(rows(&t), vec!["x", "y"]);
        let t = log.step_forward();
        assert_eq!(rows(&t), vec!["x", "y"]);
        assert_eq!(log.cursor(), 2);
    }

    #[test]
    fn step_forward_mirrors_step_back() {
        let mut log = TransactionLog::default();
        record(&mut log, "a");
        record(&mut log, "b");
        log.step_back();
        log.step_back();

        let t = log.step_forward();
        assert_eq!(rows(&t), vec!["a"]);
        assert_eq!(t.meta.map(|m| m.description), Some("a".to_string()));
        // Rests on the marker of the next transaction.
        assert_eq!(log.cursor(), 2);
        assert!(log.entries()[log.cursor()].is_marker());

        let t = log.step_forward();
        assert_eq!(rows(&t), vec!["b"]);
        assert_eq!(t.meta.map(|m| m.description), Some("b".to_string()));

        let t = log.step_forward();
        assert!(t.is_empty());
        assert_eq!(log.cursor(), log.len() - 1);
    }

    #[test]
    fn undo_redo_undo_returns_to_same_cursor() {
        let mut log = TransactionLog::default();
        record(&mut log, "a");
        record(&mut log, "b");
        log.step_back();
        let after_first_undo = log.cursor();
        log.step_forward();
        log.step_back();
        assert_eq!(log.cursor(), after_first_undo);
    }

    #[test]
    fn consecutive_redos_report_their_own_annotations() {
        let mut log = TransactionLog::default();
        record(&mut log, "one");
        record(&mut log, "two");
        record(&mut log, "three");
        log.step_back();
        log.step_back();
        log.step_back();

        let mut metas = Vec::new();
        while log.can_redo() {
            let expected = log.next_redo_annotation().map(|a| a.description.clone());
            assert!(expected.is_some());
            let t = log.step_forward();
            assert_eq!(t.meta.as_ref().map(|m| m.description.clone()), expected);
            metas.extend(t.meta.map(|m| m.description));
        }
        assert_eq!(metas, vec!["one", "two", "three"]);
        assert!(log.check_invariants().is_ok());
    }

    #[test]
    fn begin_after_partial_redo_reuses_landing_marker() {
        let mut log = TransactionLog::default();
        record(&mut log, "a");
        record(&mut log, "b");
        log.step_back();
        log.step_back();
        log.step_forward();

        assert_eq!(log.begin_transaction(Some("c".into())), Begin::Reused);
        assert!(log.record_batch(batch("c")));
        assert_eq!(log.marker_count(), 2);
        assert!(!log.can_redo());

        let t = log.step_back();
        assert_eq!(rows(&t), vec!["c"]);
        assert_eq!(t.meta.map(|m| m.description), Some("c".to_string()));
    }

    #[test]
    fn new_transaction_discards_future() {
        let mut log = TransactionLog::default();
        record(&mut log, "a");
        record(&mut log, "b");
        log.step_back();
        assert!(log.can_redo());

        record(&mut log, "c");
        assert!(!log.can_redo());
        assert!(log.step_forward().is_empty());

        log.step_back();
        let t = log.step_back();
        assert_eq!(rows(&t), vec!["a"]);
    }

    #[test]
    fn capacity_drops_whole_transactions() {
        let mut log = TransactionLog::new(3);
        for name in ["a", "b", "c", "d", "e"] {
            record(&mut log, name);
            assert!(log.marker_count() <= 3);
            assert!(log.check_invariants().is_ok());
        }
        // Three markers, each followed by exactly its batch.
        assert_eq!(log.len(), 6);

        let mut undone = Vec::new();
        loop {
            let t = log.step_back();
            if t.is_empty() {
                break;
            }
            undone.extend(rows(&t));
        }
        assert_eq!(undone, vec!["e", "d", "c"]);
    }

    #[test]
    fn truncate_future_and_enforce_capacity_reports_evictions() {
        let mut log = TransactionLog::new(50);
        for name in ["a", "b", "c"] {
            record(&mut log, name);
        }
        log.step_back();
        assert_eq!(log.truncate_future_and_enforce_capacity(), 0);
        assert_eq!(log.cursor(), log.len() - 1);
        assert!(!log.can_redo());
    }

    #[test]
    fn reset_collapses_to_sentinel() {
        let mut log = TransactionLog::default();
        record(&mut log, "a");
        record(&mut log, "b");
        log.reset();
        assert_eq!(log.len(), 1);
        assert_eq!(log.cursor(), 0);
        assert!(log.step_back().is_empty());
        assert!(log.step_forward().is_empty());
    }

    #[test]
    fn annotations_for_ui() {
        let mut log = TransactionLog::default();
        record(&mut log, "first");
        record(&mut log, "second");
        log.begin_transaction(Some("empty".into()));

        let names: Vec<_> = log
            .undo_annotations(5)
            .into_iter()
            .map(|a| a.map(|a| a.description.clone()))
            .collect();
        assert_eq!(
            names,
            vec![Some("second".to_string()), Some("first".to_string())]
        );
        assert_eq!(
            log.next_undo_annotation().map(|a| a.description.as_str()),
            Some("second")
        );
        assert_eq!(log.undo_annotations(1).len(), 1);

        log.step_back();
        assert_eq!(
            log.next_redo_annotation().map(|a| a.description.as_str()),
            Some("second")
        );
    }

    #[test]
    fn check_invariants_flags_malformed_log() {
        let mut log = TransactionLog::new(2);
        log.entries.clear();
        assert_eq!(log.check_invariants(), Err(LogViolation::Empty));

        log.push_raw(LogEntry::Batch(Arc::new(batch("x"))));
        assert_eq!(log.check_invariants(), Err(LogViolation::MissingSentinel));

        let mut log = TransactionLog::new(2);
        log.push_raw(LogEntry::Marker(None));
        log.push_raw(LogEntry::Marker(None));
        assert_eq!(
            log.check_invariants(),
            Err(LogViolation::TooManyMarkers {
                markers: 3,
                limit: 2
            })
        );

        let mut log = TransactionLog::default();
        log.push_raw(LogEntry::Batch(Arc::new(OperationBatch::new(
            Vec::new(),
            PriorState::new(),
            None,
        ))));
        assert_eq!(
            log.check_invariants(),
            Err(LogViolation::EmptyBatch { index: 1 })
        );

        let mut log = TransactionLog::default();
        log.cursor = 4;
        assert_eq!(
            log.check_invariants(),
            Err(LogViolation::CursorOutOfRange { cursor: 4, len: 1 })
        );
    }

    #[test]
    fn memory_usage_grows_with_entries() {
        let mut log = TransactionLog::default();
        let before = log.memory_usage();
        record(&mut log, "a");
        assert!(log.memory_usage() > before);
    }

    #[test]
    fn debug_impl() {
        let log = TransactionLog::default();
        let s = format!("{log:?}");
        assert!(s.contains("TransactionLog"));
        assert!(s.contains("cursor"));
    }
}
