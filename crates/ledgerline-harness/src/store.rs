#![forbid(unsafe_code)]

//! In-memory column store.
//!
//! Plays the mutation layer and the submission channel at once: [`mutate`]
//! snapshots the touched rows, applies the writes and hands the batch to the
//! manager, while the [`Submitter`] impl applies undo/redo output.
//!
//! [`mutate`]: MemoryStore::mutate

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use ahash::{AHashMap, AHashSet};
use async_trait::async_trait;
use ledgerline_core::{Operation, PriorRow, PriorState, RowRef, Value};
use ledgerline_undo::{SubmitError, Submitter, UndoManager};

type Row = BTreeMap<String, Value>;

/// Ordered copy of the store contents, for equality assertions.
pub type StoreSnapshot = BTreeMap<RowRef, Row>;

#[derive(Debug, Default)]
struct Inner {
    rows: AHashMap<RowRef, Row>,
    submissions: Vec<Vec<Operation>>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    failures_pending: AtomicUsize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write a cell without going through the manager.
    pub fn seed(
        &self,
        dataset: impl Into<String>,
        row: impl Into<String>,
        column: impl Into<String>,
        value: impl Into<Value>,
    ) {
        let row = RowRef::new(dataset, row);
        self.inner()
            .rows
            .entry(row)
            .or_default()
            .insert(column.into(), value.into());
    }

    /// Current value of a cell; `None` if the row or column was never written.
    #[must_use]
    pub fn get(&self, dataset: &str, row: &str, column: &str) -> Option<Value> {
        self.inner()
            .rows
            .get(&RowRef::new(dataset, row))
            .and_then(|r| r.get(column).cloned())
    }

    #[must_use]
    pub fn contains_row(&self, dataset: &str, row: &str) -> bool {
        self.inner().rows.contains_key(&RowRef::new(dataset, row))
    }

    /// Returns `true` if the row exists and its tombstone is set.
    #[must_use]
    pub fn is_tombstoned(&self, dataset: &str, row: &str) -> bool {
        self.get(dataset, row, ledgerline_undo::rules::DEFAULT_TOMBSTONE_COLUMN)
            == Some(Value::Integer(1))
    }

    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        self.inner()
            .rows
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Prior state of every row `operations` touch, as the store holds it now.
    #[must_use]
    pub fn capture_prior(&self, operations: &[Operation]) -> PriorState {
        let inner = self.inner();
        let mut prior = PriorState::new();
        let mut seen = AHashSet::new();
        for op in operations {
            let key = op.row_ref();
            if !seen.insert(key.clone()) {
                continue;
            }
            if let Some(row) = inner.rows.get(&key) {
                let snapshot: PriorRow = row.iter().map(|(c, v)| (c.clone(), v.clone())).collect();
                prior.insert_row(key.dataset, key.row, snapshot);
            }
        }
        prior
    }

    fn apply(inner: &mut Inner, operations: &[Operation]) {
        for op in operations {
            inner
                .rows
                .entry(op.row_ref())
                .or_default()
                .insert(op.column.clone(), op.value.clone());
        }
    }

    /// Apply `operations` as the mutation layer would: snapshot, write, then
    /// offer the batch to `manager`. Returns whether it was recorded.
    pub fn mutate(&self, manager: &UndoManager, operations: Vec<Operation>) -> bool {
        let prior = self.capture_prior(&operations);
        Self::apply(&mut self.inner(), &operations);
        manager.record_if_listening(operations, prior)
    }

    /// Make the next `count` submissions fail without touching the store.
    pub fn fail_next_submissions(&self, count: usize) {
        self.failures_pending.store(count, Ordering::Relaxed);
    }

    /// Operation lists received through [`Submitter::submit`], oldest first.
    #[must_use]
    pub fn submissions(&self) -> Vec<Vec<Operation>> {
        self.inner().submissions.clone()
    }

    #[must_use]
    pub fn last_submission(&self) -> Option<Vec<Operation>> {
        self.inner().submissions.last().cloned()
    }
}

#[async_trait]
impl Submitter for MemoryStore {
    async fn submit(&self, operations: Vec<Operation>) -> Result<(), SubmitError> {
        let failing = self
            .failures_pending
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            tracing::debug!(target: "ledgerline.harness", operations = operations.len(), "injected submission failure");
            return Err("injected submission failure".into());
        }
        let mut inner = self.inner();
        Self::apply(&mut inner, &operations);
        inner.submissions.push(operations);
        Ok(())
    }
}
