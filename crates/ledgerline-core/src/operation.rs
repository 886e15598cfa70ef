#![forbid(unsafe_code)]

//! Column-level writes.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Timestamp, Value};

/// Address of one row in one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RowRef {
    pub dataset: String,
    pub row: String,
}

impl RowRef {
    #[must_use]
    pub fn new(dataset: impl Into<String>, row: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            row: row.into(),
        }
    }
}

impl fmt::Display for RowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.dataset, self.row)
    }
}

/// A single column write against one row of one dataset.
///
/// Operations are values: deriving an inverse or a replay builds a new
/// operation rather than editing the recorded one. `timestamp` is `None`
/// until the operation is stamped by the clock service at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Operation {
    /// Table identifier.
    pub dataset: String,
    /// Row identifier.
    pub row: String,
    /// Field identifier.
    pub column: String,
    /// New value for the field.
    pub value: Value,
    /// Logical clock value assigned at submission.
    #[cfg_attr(feature = "serde", serde(default))]
    pub timestamp: Option<Timestamp>,
}

impl Operation {
    /// Create an unstamped operation.
    #[must_use]
    pub fn new(
        dataset: impl Into<String>,
        row: impl Into<String>,
        column: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            dataset: dataset.into(),
            row: row.into(),
            column: column.into(),
            value: value.into(),
            timestamp: None,
        }
    }

    /// Same target row and column, different value. The result is unstamped.
    #[must_use]
    pub fn with_value(&self, value: impl Into<Value>) -> Self {
        Self {
            dataset: self.dataset.clone(),
            row: self.row.clone(),
            column: self.column.clone(),
            value: value.into(),
            timestamp: None,
        }
    }

    /// Same target row, different column and value. The result is unstamped.
    #[must_use]
    pub fn with_column(&self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            dataset: self.dataset.clone(),
            row: self.row.clone(),
            column: column.into(),
            value: value.into(),
            timestamp: None,
        }
    }

    /// Attach a clock stamp, replacing any previous one.
    #[must_use]
    pub fn stamped(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// The row this operation targets.
    #[must_use]
    pub fn row_ref(&self) -> RowRef {
        RowRef::new(self.dataset.clone(), self.row.clone())
    }

    /// Returns `true` if this operation and `other` write the same cell with
    /// the same value, ignoring timestamps.
    #[must_use]
    pub fn same_write(&self, other: &Self) -> bool {
        self.dataset == other.dataset
            && self.row == other.row
            && self.column == other.column
            && self.value == other.value
    }

    /// Size in bytes for memory accounting.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        let payload = self.value.as_text().map_or(0, str::len);
        std::mem::size_of::<Self>() + self.dataset.len() + self.row.len() + self.column.len() + payload
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{} = {}",
            self.dataset, self.row, self.column, self.value
        )?;
        if let Some(ts) = &self.timestamp {
            write!(f, " @{ts}")?;
        }
        Ok(())
    }
}
