#![forbid(unsafe_code)]

//! Caller-supplied metadata attached to transaction boundaries.
//!
//! An [`Annotation`] describes the user action a transaction performed
//! ("Delete transaction", "Set budget"). The log stores it on the boundary
//! marker that opens the transaction and hands it back on undo/redo so the
//! UI can say what was reverted.

use std::collections::BTreeMap;

use web_time::Instant;

/// Who or what triggered a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionSource {
    /// Direct user action (keyboard, mouse, form submit).
    #[default]
    User,
    /// Triggered programmatically by application code (rules, schedules).
    Programmatic,
    /// Replayed from an import or recorded macro.
    Macro,
    /// Triggered by an external system (bank sync, API).
    External,
}

/// Metadata describing one undoable action.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Human-readable description for UI (e.g., "Delete transaction").
    pub description: String,
    /// Who/what triggered the action.
    pub source: ActionSource,
    /// Free-form key/value details (ids, screen name, ...).
    pub details: BTreeMap<String, String>,
    /// When the annotation was created.
    pub created_at: Instant,
}

impl Annotation {
    /// Create a user-sourced annotation with the given description.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            source: ActionSource::User,
            details: BTreeMap::new(),
            created_at: Instant::now(),
        }
    }

    /// Set the action source.
    #[must_use]
    pub fn with_source(mut self, source: ActionSource) -> Self {
        self.source = source;
        self
    }

    /// Attach a detail entry.
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Look up a detail entry.
    #[must_use]
    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details.get(key).map(String::as_str)
    }

    /// Size in bytes for memory accounting.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.description.len()
            + self
                .details
                .iter()
                .map(|(k, v)| k.len() + v.len())
                .sum::<usize>()
    }
}

impl Default for Annotation {
    fn default() -> Self {
        Self::new("Unknown")
    }
}

impl From<&str> for Annotation {
    fn from(description: &str) -> Self {
        Self::new(description)
    }
}

impl From<String> for Annotation {
    fn from(description: String) -> Self {
        Self::new(description)
    }
}
