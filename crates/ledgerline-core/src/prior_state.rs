#![forbid(unsafe_code)]

//! Pre-write snapshots of touched rows.
//!
//! The mutation layer captures a [`PriorState`] for every row a batch is
//! about to write, *before* applying the batch. A row that is present in the
//! snapshot existed before the batch; a row that is absent was created by it.
//! That distinction drives both inverse derivation and redo resurrection.

use ahash::AHashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Operation, Value};

/// Column values of one row as it existed before a batch applied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PriorRow {
    columns: AHashMap<String, Value>,
}

impl PriorRow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style column insert.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.columns.insert(column.into(), value.into());
        self
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.insert(column.into(), value.into());
    }

    /// Value of `column`, if the snapshot captured it.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn size_bytes(&self) -> usize {
        self.columns
            .iter()
            .map(|(k, v)| k.len() + v.size_bytes())
            .sum()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for PriorRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Snapshot mapping `(dataset, row) → {column → value}`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PriorState {
    datasets: AHashMap<String, AHashMap<String, PriorRow>>,
}

impl PriorState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style row insert.
    #[must_use]
    pub fn with_row(
        mut self,
        dataset: impl Into<String>,
        row: impl Into<String>,
        columns: PriorRow,
    ) -> Self {
        self.insert_row(dataset, row, columns);
        self
    }

    /// Record the prior columns of a row. Replaces any earlier capture.
    pub fn insert_row(
        &mut self,
        dataset: impl Into<String>,
        row: impl Into<String>,
        columns: PriorRow,
    ) {
        self.datasets
            .entry(dataset.into())
            .or_default()
            .insert(row.into(), columns);
    }

    /// The captured row, or `None` if the row did not exist before the batch.
    #[must_use]
    pub fn row(&self, dataset: &str, row: &str) -> Option<&PriorRow> {
        self.datasets.get(dataset)?.get(row)
    }

    /// Returns `true` if the row existed before the batch.
    #[must_use]
    pub fn contains_row(&self, dataset: &str, row: &str) -> bool {
        self.row(dataset, row).is_some()
    }

    /// The row targeted by `op`, if it existed before the batch.
    #[must_use]
    pub fn row_for(&self, op: &Operation) -> Option<&PriorRow> {
        self.row(&op.dataset, &op.row)
    }

    /// Number of captured rows across all datasets.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.datasets.values().map(|rows| rows.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Approximate size in bytes for memory accounting.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.datasets
            .iter()
            .map(|(dataset, rows)| {
                dataset.len()
                    + rows
                        .iter()
                        .map(|(row, cols)| row.len() + cols.size_bytes())
                        .sum::<usize>()
            })
            .sum()
    }
}
