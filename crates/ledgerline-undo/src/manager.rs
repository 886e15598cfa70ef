#![forbid(unsafe_code)]

//! Undo/redo controller.
//!
//! [`UndoManager`] owns the [`TransactionLog`] and wires it to the ambient
//! [`Context`](crate::context::Context) and the external collaborators.
//!
//! # Flow
//!
//! ```text
//! run_transaction(annotation, f)
//!   ├─ log.begin_transaction(annotation)        marker appended or reused
//!   └─ scope({listening: true, tag}) { f() }
//!        └─ mutation layer applies ops, calls record_if_listening(ops, prior)
//!             └─ log.record_batch(...)
//!
//! undo()
//!   ├─ log.step_back()                          cursor moves first
//!   ├─ inverse::undo_operations(...)            latest operation first
//!   ├─ stamp with clock, submit with listening = false
//!   └─ announce "undo-event"
//! ```
//!
//! # Failure Modes
//!
//! - **Submission failure**: the cursor has already moved; the error is
//!   returned as [`UndoError::Submission`] and nothing is announced.
//! - **Nothing to traverse**: undo/redo at either end of history is a no-op.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ledgerline_core::{Operation, PriorState};
use tracing::Instrument;

use crate::annotation::Annotation;
use crate::collab::{Announcer, Clock, NullAnnouncer, Submitter};
use crate::config::UndoConfig;
use crate::context::{self, ContextOverride, TransactionTag};
use crate::error::{Result, UndoError};
use crate::event::{UndoEvent, UndoKind};
use crate::inverse;
use crate::log::{Begin, OperationBatch, TransactionLog, Traversal};
use crate::rules::RuleTable;

/// Records transactions and performs undo/redo against the store.
pub struct UndoManager {
    log: Mutex<TransactionLog>,
    rules: RuleTable,
    clock: Arc<dyn Clock>,
    submitter: Arc<dyn Submitter>,
    announcer: Arc<dyn Announcer>,
    record_history_moves: bool,
    next_tag: AtomicU64,
}

impl fmt::Debug for UndoManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoManager")
            .field("log", &*self.log())
            .field("record_history_moves", &self.record_history_moves)
            .finish_non_exhaustive()
    }
}

impl UndoManager {
    /// Create a manager with the standard rules and default history size.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, submitter: Arc<dyn Submitter>) -> Self {
        Self {
            log: Mutex::new(TransactionLog::default()),
            rules: RuleTable::standard(),
            clock,
            submitter,
            announcer: Arc::new(NullAnnouncer),
            record_history_moves: false,
            next_tag: AtomicU64::new(1),
        }
    }

    /// Set the notification channel for undo/redo events.
    #[must_use]
    pub fn with_announcer(mut self, announcer: Arc<dyn Announcer>) -> Self {
        self.announcer = announcer;
        self
    }

    /// Apply a configuration. Resets the log.
    #[must_use]
    pub fn with_config(mut self, config: &UndoConfig) -> Self {
        self.rules = config.to_rule_table();
        self.log = Mutex::new(TransactionLog::new(config.max_transactions));
        self
    }

    /// Replace the dataset rule table.
    #[must_use]
    pub fn with_rules(mut self, rules: RuleTable) -> Self {
        self.rules = rules;
        self
    }

    /// Submit undo/redo operations in the caller's context instead of a
    /// non-recording one, so a caller inside `run_transaction` records them.
    #[must_use]
    pub fn with_record_history_moves(mut self, record: bool) -> Self {
        self.record_history_moves = record;
        self
    }

    fn log(&self) -> MutexGuard<'_, TransactionLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fresh_tag(&self) -> TransactionTag {
        let n = self.next_tag.fetch_add(1, Ordering::Relaxed);
        TransactionTag::new(format!("tx-{n}"))
    }

    // ========================================================================
    // Recording
    // ========================================================================

    /// Run `f` as one undoable transaction.
    ///
    /// When the call tree is already recording, or recording is disabled,
    /// `f` runs as-is and its operations fold into the enclosing transaction
    /// (or are not recorded at all).
    pub async fn run_transaction<F, Fut>(
        &self,
        annotation: impl Into<Option<Annotation>>,
        f: F,
    ) -> Fut::Output
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        let ctx = context::current();
        if ctx.listening || ctx.disabled {
            return f().await;
        }
        let tag = ctx.tag.unwrap_or_else(|| self.fresh_tag());
        self.begin_and_run(tag, annotation.into(), f).await
    }

    /// Like [`run_transaction`](Self::run_transaction) with a caller-supplied
    /// correlation id.
    pub async fn run_tagged_transaction<F, Fut>(
        &self,
        tag: impl Into<TransactionTag>,
        annotation: impl Into<Option<Annotation>>,
        f: F,
    ) -> Fut::Output
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        let ctx = context::current();
        if ctx.listening || ctx.disabled {
            return f().await;
        }
        self.begin_and_run(tag.into(), annotation.into(), f).await
    }

    async fn begin_and_run<F, Fut>(
        &self,
        tag: TransactionTag,
        annotation: Option<Annotation>,
        f: F,
    ) -> Fut::Output
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        let begin = self.log().begin_transaction(annotation);
        tracing::debug!(
            target: "ledgerline.undo",
            tag = %tag,
            reused = begin == Begin::Reused,
            "transaction started"
        );
        context::scope(ContextOverride::recording(tag), async move { f().await }).await
    }

    /// Run `f` with recording disabled for its whole call tree.
    pub async fn without_undo<F, Fut>(&self, f: F) -> Fut::Output
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        context::scope(ContextOverride::new().with_disabled(true), async move {
            f().await
        })
        .await
    }

    /// Register operations the mutation layer just applied.
    ///
    /// Records only when the current call tree is listening and not disabled,
    /// and only non-empty batches. Returns `true` if a batch was recorded.
    pub fn record_if_listening(&self, operations: Vec<Operation>, prior_state: PriorState) -> bool {
        let ctx = context::current();
        if !ctx.is_recording() || operations.is_empty() {
            return false;
        }
        self.log()
            .record_batch(OperationBatch::new(operations, prior_state, ctx.tag))
    }

    // ========================================================================
    // History moves
    // ========================================================================

    /// Revert the most recent transaction.
    pub async fn undo(&self) -> Result<()> {
        let traversal = self.log().step_back();
        if traversal.is_empty() {
            tracing::debug!(target: "ledgerline.undo", "nothing to undo");
            return Ok(());
        }
        let tag = traversal.batches.first().and_then(|b| b.tag().cloned());
        let operations = inverse::undo_operations(&self.rules, &traversal.batches);
        self.apply(UndoKind::Undo, traversal, operations, tag).await
    }

    /// Replay the most recently undone transaction.
    pub async fn redo(&self) -> Result<()> {
        let traversal = self.log().step_forward();
        if traversal.is_empty() {
            tracing::debug!(target: "ledgerline.undo", "nothing to redo");
            return Ok(());
        }
        let tag = traversal.batches.last().and_then(|b| b.tag().cloned());
        let operations = inverse::redo_operations(&self.rules, &traversal.batches);
        self.apply(UndoKind::Redo, traversal, operations, tag).await
    }

    async fn apply(
        &self,
        kind: UndoKind,
        traversal: Traversal,
        operations: Vec<Operation>,
        tag: Option<TransactionTag>,
    ) -> Result<()> {
        let stamped: Vec<Operation> = operations
            .into_iter()
            .map(|op| op.stamped(self.clock.next_timestamp()))
            .collect();
        let count = stamped.len();

        if !stamped.is_empty() {
            let span = tracing::debug_span!(
                "undo.apply",
                kind = %kind,
                operations = count,
                from = traversal.from,
                to = traversal.to,
            );
            let submission = self.submitter.submit(stamped.clone());
            let result = if self.record_history_moves {
                submission.instrument(span).await
            } else {
                context::scope(ContextOverride::not_listening(), submission)
                    .instrument(span)
                    .await
            };
            if let Err(source) = result {
                tracing::warn!(
                    target: "ledgerline.undo",
                    kind = %kind,
                    operations = count,
                    error = %source,
                    "history move submission failed"
                );
                return Err(UndoError::Submission {
                    kind,
                    operations: count,
                    source,
                });
            }
        }

        tracing::info!(
            target: "ledgerline.undo",
            kind = %kind,
            operations = count,
            batches = traversal.batches.len(),
            tag = tag.as_ref().map(TransactionTag::as_str),
            "{kind} applied"
        );
        self.announcer
            .announce(&UndoEvent::new(kind, stamped, traversal.meta, tag));
        Ok(())
    }

    // ========================================================================
    // Maintenance & info
    // ========================================================================

    /// Clear all undo/redo state, e.g. when switching the active budget file.
    pub fn reset_history(&self) {
        self.log().reset();
        tracing::debug!(target: "ledgerline.undo", "history reset");
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.log().can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.log().can_redo()
    }

    /// Annotation of the transaction the next undo would revert.
    #[must_use]
    pub fn next_undo_annotation(&self) -> Option<Annotation> {
        self.log().next_undo_annotation().cloned()
    }

    /// Annotation of the transaction the next redo would replay.
    #[must_use]
    pub fn next_redo_annotation(&self) -> Option<Annotation> {
        self.log().next_redo_annotation().cloned()
    }

    /// Inspect the log without exposing the lock.
    pub fn with_log<R>(&self, f: impl FnOnce(&TransactionLog) -> R) -> R {
        f(&self.log())
    }

    #[must_use]
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Consume the manager and hand back its log.
    #[must_use]
    pub fn teardown(self) -> TransactionLog {
        self.log.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

// ============================================================================
// Tests
// ============================================================================
