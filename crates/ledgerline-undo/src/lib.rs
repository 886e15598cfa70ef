#![forbid(unsafe_code)]

//! Ledgerline Undo
//!
//! Records every mutation issued against the column store as part of an
//! atomic transaction, and reverses or replays those transactions on request.
//!
//! # Key Components
//!
//! - [`UndoManager`] - Controller: records transactions, performs undo/redo
//! - [`TransactionLog`] - Cursor-addressed log of markers and batches
//! - [`context`] - Task-local recording context (`listening`, `disabled`, `tag`)
//! - [`RuleTable`] - Per-dataset reversal rules
//! - [`Clock`], [`Submitter`], [`Announcer`] - Collaborator seams
//! - [`UndoConfig`] - History size and rule overrides, loadable from TOML/JSON
//!
//! # Role in Ledgerline
//! The mutation layer applies operations to the store and hands each batch,
//! together with a snapshot of the touched rows, to
//! [`UndoManager::record_if_listening`]. Whether the batch is kept depends on
//! the ambient [`Context`]: only call trees running inside
//! [`UndoManager::run_transaction`] record anything.
//!
//! # Example
//!
//! ```rust,ignore
//! let manager = Arc::new(UndoManager::new(clock, submitter));
//!
//! manager
//!     .run_transaction(Annotation::new("Edit amount"), || async {
//!         store.apply(ops).await
//!     })
//!     .await?;
//!
//! manager.undo().await?;
//! manager.redo().await?;
//! ```

pub mod annotation;
pub mod collab;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod handler;
pub mod inverse;
pub mod log;
pub mod manager;
pub mod rules;

pub use annotation::{ActionSource, Annotation};
pub use collab::{Announcer, BroadcastAnnouncer, Clock, NullAnnouncer, Submitter};
pub use config::{ConfigError, UndoConfig};
pub use context::{Context, ContextOverride, TransactionTag};
pub use error::{Result, SubmitError, UndoError};
pub use event::{UndoEvent, UndoKind};
pub use handler::UndoableHandler;
pub use log::{
    Begin, DEFAULT_MAX_TRANSACTIONS, LogEntry, LogViolation, OperationBatch, TransactionLog,
    Traversal,
};
pub use manager::UndoManager;
pub use rules::{ColumnRedirect, CreationInverse, DatasetRule, RuleTable};
