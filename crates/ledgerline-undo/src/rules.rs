#![forbid(unsafe_code)]

//! Per-dataset reversal rules.
//!
//! Most datasets are soft-delete tables: undoing the creation of a row sets
//! its tombstone, and redo revives it. A handful of datasets deviate, and
//! those deviations are data in a [`RuleTable`] rather than branches in the
//! derivation code.

use std::collections::{BTreeMap, BTreeSet};

/// Column used for soft deletion.
pub const DEFAULT_TOMBSTONE_COLUMN: &str = "tombstone";

/// What undoing a write to a row that did not previously exist should do.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(tag = "kind", rename_all = "snake_case"))]
pub enum CreationInverse {
    /// Soft-delete the row (`tombstone = 1`).
    #[default]
    Tombstone,
    /// Write `null` to the same column.
    ClearToNull,
    /// Write `null` to the placeholder column; writes to any other column
    /// are replayed unchanged.
    ClearPlaceholder,
    /// Never reversible; the inverse is dropped.
    Irreversible,
    /// Write `0` to the listed columns; all other columns are irreversible.
    ResetToZero { columns: BTreeSet<String> },
}

/// Placeholder column whose prior value lives under another column name.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnRedirect {
    /// Column the mutation layer writes.
    pub placeholder: String,
    /// Column the snapshot stores the value under.
    pub actual: String,
}

/// Reversal semantics for one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct DatasetRule {
    pub on_create: CreationInverse,
    /// Redo revives rows this dataset's creations soft-deleted on undo.
    pub resurrect: bool,
    pub placeholder: Option<ColumnRedirect>,
}

impl Default for DatasetRule {
    fn default() -> Self {
        Self::soft_delete()
    }
}

impl DatasetRule {
    /// Tombstone on undo, revive on redo.
    #[must_use]
    pub fn soft_delete() -> Self {
        Self {
            on_create: CreationInverse::Tombstone,
            resurrect: true,
            placeholder: None,
        }
    }

    /// Append-only table: creations are never undone nor revived.
    #[must_use]
    pub fn append_only() -> Self {
        Self {
            on_create: CreationInverse::Irreversible,
            resurrect: false,
            placeholder: None,
        }
    }

    /// Free-text table: creations are undone by clearing the field.
    #[must_use]
    pub fn clear_on_undo() -> Self {
        Self {
            on_create: CreationInverse::ClearToNull,
            resurrect: false,
            placeholder: None,
        }
    }

    /// Rollup table: only `columns` are reversible, back to zero.
    #[must_use]
    pub fn rollup<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            on_create: CreationInverse::ResetToZero {
                columns: columns.into_iter().map(Into::into).collect(),
            },
            resurrect: false,
            placeholder: None,
        }
    }

    #[must_use]
    pub fn with_on_create(mut self, on_create: CreationInverse) -> Self {
        self.on_create = on_create;
        self
    }

    #[must_use]
    pub fn with_resurrect(mut self, resurrect: bool) -> Self {
        self.resurrect = resurrect;
        self
    }

    #[must_use]
    pub fn with_placeholder(
        mut self,
        placeholder: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        self.placeholder = Some(ColumnRedirect {
            placeholder: placeholder.into(),
            actual: actual.into(),
        });
        self
    }

    /// Column to read from the prior snapshot for a write to `column`.
    #[must_use]
    pub fn snapshot_column<'a>(&'a self, column: &'a str) -> &'a str {
        match &self.placeholder {
            Some(redirect) if redirect.placeholder == column => &redirect.actual,
            _ => column,
        }
    }
}

/// Dataset → rule lookup with a soft-delete fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    rules: BTreeMap<String, DatasetRule>,
    fallback: DatasetRule,
    tombstone_column: String,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl RuleTable {
    /// A table where every dataset is soft-deleted.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
            fallback: DatasetRule::soft_delete(),
            tombstone_column: DEFAULT_TOMBSTONE_COLUMN.to_string(),
        }
    }

    /// The rules of the budgeting schema.
    #[must_use]
    pub fn standard() -> Self {
        let rollup_columns = ["buffered", "amount", "carryover"];
        Self::empty()
            .with_rule(
                "spreadsheet_cells",
                DatasetRule::soft_delete()
                    .with_placeholder("expr", "cached_value")
                    .with_on_create(CreationInverse::ClearPlaceholder),
            )
            // Mappings are never deleted, so leaving them in place on undo
            // is harmless.
            .with_rule("category_mapping", DatasetRule::append_only())
            .with_rule("payee_mapping", DatasetRule::append_only())
            .with_rule("zero_budget_months", DatasetRule::rollup(rollup_columns))
            .with_rule("zero_budgets", DatasetRule::rollup(rollup_columns))
            .with_rule("reflect_budgets", DatasetRule::rollup(rollup_columns))
            .with_rule("notes", DatasetRule::clear_on_undo())
    }

    /// Insert or replace the rule for `dataset`.
    #[must_use]
    pub fn with_rule(mut self, dataset: impl Into<String>, rule: DatasetRule) -> Self {
        self.insert(dataset, rule);
        self
    }

    pub fn insert(&mut self, dataset: impl Into<String>, rule: DatasetRule) {
        self.rules.insert(dataset.into(), rule);
    }

    #[must_use]
    pub fn with_tombstone_column(mut self, column: impl Into<String>) -> Self {
        self.tombstone_column = column.into();
        self
    }

    /// Rule for `dataset`, falling back to soft-delete.
    #[must_use]
    pub fn rule(&self, dataset: &str) -> &DatasetRule {
        self.rules.get(dataset).unwrap_or(&self.fallback)
    }

    #[must_use]
    pub fn tombstone_column(&self) -> &str {
        &self.tombstone_column
    }

    /// Datasets with an explicit rule.
    pub fn datasets(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }
}
