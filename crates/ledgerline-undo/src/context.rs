#![forbid(unsafe_code)]

//! Ambient per-call-tree transaction context.
//!
//! Every mutating call needs to know whether it runs inside an undoable
//! transaction, whether recording is suppressed, and which transaction tag to
//! attach. Rather than threading those flags through every signature, they
//! live in a task-local [`Context`] that [`scope`] installs for the duration
//! of a future, including across `.await` points.
//!
//! # Invariants
//!
//! 1. Overrides are shallow-merged onto the caller's context; unset fields
//!    keep the caller's value.
//! 2. The caller's context is visible again as soon as the scoped future
//!    completes, fails, or panics (LIFO nesting).
//! 3. Two independently running tasks never observe each other's context.
//!    A task spawned with `tokio::spawn` starts from the default context
//!    unless its future was wrapped in [`bind`].
//!
//! ```text
//! scope({listening: true, tag: "tx-1"})
//! ├─ current() == {listening: true, disabled: false, tag: "tx-1"}
//! ├─ scope({disabled: true})
//! │  └─ current() == {listening: true, disabled: true, tag: "tx-1"}
//! └─ current() == {listening: true, disabled: false, tag: "tx-1"}
//! ```

use std::fmt;
use std::future::Future;

tokio::task_local! {
    static CONTEXT: Context;
}

/// Opaque correlation id for one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionTag(String);

impl TransactionTag {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TransactionTag {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for TransactionTag {
    fn from(tag: String) -> Self {
        Self(tag)
    }
}

/// Transaction state visible to the current call tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Context {
    /// Inside a transaction whose operations should be recorded.
    pub listening: bool,
    /// Recording is suppressed for this call tree.
    pub disabled: bool,
    /// Correlation id of the enclosing transaction.
    pub tag: Option<TransactionTag>,
}

impl Context {
    /// Returns `true` if operations performed now would be recorded.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.listening && !self.disabled
    }

    /// Apply `overrides` on top of this context.
    #[must_use]
    pub fn merge(&self, overrides: &ContextOverride) -> Self {
        Self {
            listening: overrides.listening.unwrap_or(self.listening),
            disabled: overrides.disabled.unwrap_or(self.disabled),
            tag: overrides.tag.clone().or_else(|| self.tag.clone()),
        }
    }
}

/// A partial [`Context`]; `None` fields inherit from the enclosing scope.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContextOverride {
    pub listening: Option<bool>,
    pub disabled: Option<bool>,
    pub tag: Option<TransactionTag>,
}

impl ContextOverride {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a recording scope for `tag`.
    #[must_use]
    pub fn recording(tag: TransactionTag) -> Self {
        Self {
            listening: Some(true),
            disabled: None,
            tag: Some(tag),
        }
    }

    /// Leave recording off for submissions that must not become undoable.
    #[must_use]
    pub fn not_listening() -> Self {
        Self {
            listening: Some(false),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_listening(mut self, listening: bool) -> Self {
        self.listening = Some(listening);
        self
    }

    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = Some(disabled);
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<TransactionTag>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// The context of the current call tree, or the default outside any scope.
#[must_use]
pub fn current() -> Context {
    CONTEXT.try_with(Clone::clone).unwrap_or_default()
}

/// Run `future` with `overrides` merged onto the current context.
pub async fn scope<F>(overrides: ContextOverride, future: F) -> F::Output
where
    F: Future,
{
    let ctx = current().merge(&overrides);
    CONTEXT.scope(ctx, future).await
}

/// Synchronous counterpart of [`scope`].
pub fn sync_scope<R>(overrides: ContextOverride, f: impl FnOnce() -> R) -> R {
    let ctx = current().merge(&overrides);
    CONTEXT.sync_scope(ctx, f)
}

/// Capture the current context so `future` keeps it when polled elsewhere,
/// e.g. after being handed to `tokio::spawn`.
pub fn bind<F>(future: F) -> impl Future<Output = F::Output>
where
    F: Future,
{
    CONTEXT.scope(current(), future)
}
