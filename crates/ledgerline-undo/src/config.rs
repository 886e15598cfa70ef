#![forbid(unsafe_code)]

//! Undo configuration.
//!
//! [`UndoConfig`] captures the tunables of the undo subsystem: how many
//! transactions the log retains, which column marks soft deletion, and
//! per-dataset overrides of the standard reversal rules. With the `config`
//! feature it can be loaded from TOML or JSON at startup.
//!
//! ```toml
//! # ledgerline-undo.toml
//! max_transactions = 50
//! tombstone_column = "tombstone"
//!
//! [datasets.custom_rollup]
//! resurrect = false
//! on_create = { kind = "reset_to_zero", columns = ["amount"] }
//! ```
//!
//! ```rust,ignore
//! let config = UndoConfig::from_toml_file("ledgerline-undo.toml")?;
//! let manager = UndoManager::new(clock, submitter).with_config(&config);
//! ```

use std::collections::BTreeMap;
#[cfg(feature = "config")]
use std::path::Path;

use thiserror::Error;

use crate::log::DEFAULT_MAX_TRANSACTIONS;
use crate::rules::{CreationInverse, DEFAULT_TOMBSTONE_COLUMN, DatasetRule, RuleTable};

/// Tunables of the undo subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct UndoConfig {
    /// Maximum number of transactions (boundary markers) retained.
    pub max_transactions: usize,
    /// Column that marks a row as soft-deleted.
    pub tombstone_column: String,
    /// Rules replacing or extending the standard table, keyed by dataset.
    pub datasets: BTreeMap<String, DatasetRule>,
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            max_transactions: DEFAULT_MAX_TRANSACTIONS,
            tombstone_column: DEFAULT_TOMBSTONE_COLUMN.to_string(),
            datasets: BTreeMap::new(),
        }
    }
}

impl UndoConfig {
    /// Set the transaction limit.
    #[must_use]
    pub fn with_max_transactions(mut self, max_transactions: usize) -> Self {
        self.max_transactions = max_transactions;
        self
    }

    /// Add a dataset rule override.
    #[must_use]
    pub fn with_dataset(mut self, dataset: impl Into<String>, rule: DatasetRule) -> Self {
        self.datasets.insert(dataset.into(), rule);
        self
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters.
    ///
    /// Returns a list of problems. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_transactions == 0 {
            errors.push("max_transactions must be > 0".into());
        }

        if self.tombstone_column.trim().is_empty() {
            errors.push("tombstone_column must not be empty".into());
        }

        for (dataset, rule) in &self.datasets {
            if dataset.trim().is_empty() {
                errors.push("dataset names must not be empty".into());
            }
            let blank_redirect = rule
                .placeholder
                .as_ref()
                .is_some_and(|r| r.placeholder.is_empty() || r.actual.is_empty());
            if blank_redirect {
                errors.push(format!(
                    "datasets.{dataset}.placeholder columns must not be empty"
                ));
            }
            if rule.on_create == CreationInverse::ClearPlaceholder && rule.placeholder.is_none() {
                errors.push(format!(
                    "datasets.{dataset}.on_create clear_placeholder requires a placeholder"
                ));
            }
        }

        errors
    }

    /// Validate, turning any problem into [`ConfigError::Validation`].
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Build the rule table: the standard rules with this config's overrides.
    #[must_use]
    pub fn to_rule_table(&self) -> RuleTable {
        self.datasets.iter().fold(
            RuleTable::standard().with_tombstone_column(self.tombstone_column.clone()),
            |table, (dataset, rule)| table.with_rule(dataset.clone(), rule.clone()),
        )
    }
}

/// Errors from loading or validating an [`UndoConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "config")]
    #[error("TOML parse error: {0}")]
    Toml(toml::de::Error),

    #[cfg(feature = "config")]
    #[error("JSON parse error: {0}")]
    Json(serde_json::Error),

    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}
