#![forbid(unsafe_code)]

//! Inverse and replay derivation.
//!
//! Pure functions over recorded batches; nothing here touches the log or the
//! store. Derived operations are unstamped: the controller stamps them with
//! fresh clock values at submission.
//!
//! # Rules
//!
//! - Row existed before the batch: restore the snapshot value on the written
//!   column (`null` if the snapshot did not capture that column).
//! - Row was created by the batch: consult the dataset's
//!   [`CreationInverse`](crate::rules::CreationInverse).
//! - Redo replays the originals, then clears the tombstone of every
//!   resurrectable row the batch created, once per row.

use std::sync::Arc;

use ahash::AHashSet;
use ledgerline_core::{Operation, PriorState, RowRef, Value};

use crate::log::OperationBatch;
use crate::rules::{CreationInverse, RuleTable};

/// Inverse of one recorded operation, or `None` if it is irreversible.
#[must_use]
pub fn derive_inverse(rules: &RuleTable, op: &Operation, prior: &PriorState) -> Option<Operation> {
    let rule = rules.rule(&op.dataset);

    if let Some(row) = prior.row_for(op) {
        let value = row
            .get(rule.snapshot_column(&op.column))
            .cloned()
            .unwrap_or(Value::Null);
        return Some(op.with_value(value));
    }

    match &rule.on_create {
        CreationInverse::Tombstone => Some(op.with_column(rules.tombstone_column(), 1)),
        CreationInverse::ClearToNull => Some(op.with_value(Value::Null)),
        CreationInverse::ClearPlaceholder => {
            let is_placeholder = rule
                .placeholder
                .as_ref()
                .is_some_and(|r| r.placeholder == op.column);
            if is_placeholder {
                Some(op.with_value(Value::Null))
            } else {
                Some(op.with_value(op.value.clone()))
            }
        }
        CreationInverse::Irreversible => None,
        CreationInverse::ResetToZero { columns } => columns
            .contains(&op.column)
            .then(|| op.with_value(0)),
    }
}

/// Operations that revert `batches`, latest operation first.
#[must_use]
pub fn undo_operations(rules: &RuleTable, batches: &[Arc<OperationBatch>]) -> Vec<Operation> {
    batches
        .iter()
        .rev()
        .flat_map(|batch| {
            batch
                .operations()
                .iter()
                .rev()
                .filter_map(|op| derive_inverse(rules, op, batch.prior_state()))
        })
        .collect()
}

/// Tombstone clears for rows created within `batches`, in first-seen order.
#[must_use]
pub fn resurrections(rules: &RuleTable, batches: &[Arc<OperationBatch>]) -> Vec<Operation> {
    let mut seen: AHashSet<RowRef> = AHashSet::new();
    let mut out = Vec::new();
    for batch in batches {
        for op in batch.operations() {
            if batch.prior_state().contains_row(&op.dataset, &op.row) {
                continue;
            }
            if !rules.rule(&op.dataset).resurrect {
                continue;
            }
            if seen.insert(op.row_ref()) {
                out.push(op.with_column(rules.tombstone_column(), 0));
            }
        }
    }
    out
}

/// Operations that replay `batches`: originals in order, then resurrections.
#[must_use]
pub fn redo_operations(rules: &RuleTable, batches: &[Arc<OperationBatch>]) -> Vec<Operation> {
    let mut ops: Vec<Operation> = batches
        .iter()
        .flat_map(|batch| batch.operations().iter())
        .map(|op| op.with_value(op.value.clone()))
        .collect();
    ops.extend(resurrections(rules, batches));
    ops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::DatasetRule;
    use ledgerline_core::PriorRow;

    fn rules() -> RuleTable {
        RuleTable::standard()
    }

    fn batch(ops: Vec<Operation>, prior: PriorState) -> Arc<OperationBatch> {
        Arc::new(OperationBatch::new(ops, prior, None))
    }

    #[test]
    fn created_row_is_tombstoned() {
        let op = Operation::new("transactions", "r1", "amount", 500);
        let inv = derive_inverse(&rules(), &op, &PriorState::new()).unwrap();
        assert_eq!(inv, Operation::new("transactions", "r1", "tombstone", 1));
    }

    #[test]
    fn existing_row_restores_prior_value() {
        let prior = PriorState::new().with_row(
            "transactions",
            "r1",
            PriorRow::new().with("amount", 300),
        );
        let op = Operation::new("transactions", "r1", "amount", 500);
        let inv = derive_inverse(&rules(), &op, &prior).unwrap();
        assert_eq!(inv, Operation::new("transactions", "r1", "amount", 300));
    }

    #[test]
    fn uncaptured_column_restores_null() {
        let prior = PriorState::new().with_row("accounts", "a1", PriorRow::new().with("name", "x"));
        let op = Operation::new("accounts", "a1", "offbudget", 1);
        let inv = derive_inverse(&rules(), &op, &prior).unwrap();
        assert_eq!(inv.value, Value::Null);
        assert_eq!(inv.column, "offbudget");
    }

    #[test]
    fn notes_clear_to_null() {
        let op = Operation::new("notes", "n1", "value", "hi");
        let inv = derive_inverse(&rules(), &op, &PriorState::new()).unwrap();
        assert_eq!(inv, Operation::new("notes", "n1", "value", Value::Null));
    }

    #[test]
    fn mappings_are_irreversible() {
        for ds in ["category_mapping", "payee_mapping"] {
            let op = Operation::new(ds, "m1", "transferId", "c1");
            assert!(derive_inverse(&rules(), &op, &PriorState::new()).is_none());
        }
    }

    #[test]
    fn rollup_allow_list_resets_to_zero() {
        let op = Operation::new("zero_budgets", "2024-01-c1", "amount", 5000);
        let inv = derive_inverse(&rules(), &op, &PriorState::new()).unwrap();
        assert_eq!(inv.value, Value::Integer(0));
        assert_eq!(inv.column, "amount");

        for column in ["buffered", "carryover"] {
            let op = Operation::new("reflect_budgets", "2024-01-c1", column, 7);
            let inv = derive_inverse(&rules(), &op, &PriorState::new()).unwrap();
            assert_eq!(inv.value, Value::Integer(0));
        }

        let op = Operation::new("zero_budgets", "2024-01-c1", "category", "c1");
        assert!(derive_inverse(&rules(), &op, &PriorState::new()).is_none());
    }

    #[test]
    fn rollup_with_prior_row_restores_any_column() {
        let prior = PriorState::new().with_row(
            "reflect_budgets",
            "b1",
            PriorRow::new().with("category", "c0"),
        );
        let op = Operation::new("reflect_budgets", "b1", "category", "c1");
        let inv = derive_inverse(&rules(), &op, &prior).unwrap();
        assert_eq!(inv.value, Value::from("c0"));
    }

    #[test]
    fn spreadsheet_placeholder_reads_cached_value() {
        let prior = PriorState::new().with_row(
            "spreadsheet_cells",
            "budget202401!sum",
            PriorRow::new().with("cached_value", 42).with("expr", "stale"),
        );
        let op = Operation::new("spreadsheet_cells", "budget202401!sum", "expr", 99);
        let inv = derive_inverse(&rules(), &op, &prior).unwrap();
        assert_eq!(inv.column, "expr");
        assert_eq!(inv.value, Value::Integer(42));
    }

    #[test]
    fn spreadsheet_created_cell_clears() {
        let op = Operation::new("spreadsheet_cells", "c", "expr", 99);
        let inv = derive_inverse(&rules(), &op, &PriorState::new()).unwrap();
        assert_eq!(inv.value, Value::Null);
        assert_eq!(inv.column, "expr");
    }

    #[test]
    fn spreadsheet_created_cell_replays_other_columns() {
        let op = Operation::new("spreadsheet_cells", "c", "cached_value", 99);
        let inv = derive_inverse(&rules(), &op, &PriorState::new()).unwrap();
        assert_eq!(inv, Operation::new("spreadsheet_cells", "c", "cached_value", 99));
    }

    #[test]
    fn clear_placeholder_without_redirect_replays() {
        let table = RuleTable::empty().with_rule(
            "cells",
            DatasetRule::soft_delete().with_on_create(CreationInverse::ClearPlaceholder),
        );
        let op = Operation::new("cells", "c", "expr", 1);
        assert_eq!(
            derive_inverse(&table, &op, &PriorState::new()),
            Some(Operation::new("cells", "c", "expr", 1))
        );
    }

    #[test]
    fn custom_tombstone_column() {
        let table = RuleTable::standard().with_tombstone_column("deleted");
        let op = Operation::new("payees", "p1", "name", "Shop");
        let inv = derive_inverse(&table, &op, &PriorState::new()).unwrap();
        assert_eq!(inv.column, "deleted");
    }

    #[test]
    fn undo_reverses_across_batches() {
        let b1 = batch(
            vec![
                Operation::new("accounts", "a1", "name", "A"),
                Operation::new("accounts", "a1", "balance", 10),
            ],
            PriorState::new().with_row("accounts", "a1", PriorRow::new().with("name", "old").with("balance", 0)),
        );
        let b2 = batch(
            vec![Operation::new("payees", "p1", "name", "Shop")],
            PriorState::new(),
        );
        let ops = undo_operations(&rules(), &[b1, b2]);
        assert_eq!(
            ops,
            vec![
                Operation::new("payees", "p1", "tombstone", 1),
                Operation::new("accounts", "a1", "balance", 0),
                Operation::new("accounts", "a1", "name", "old"),
            ]
        );
    }

    #[test]
    fn undo_drops_irreversible() {
        let b = batch(
            vec![
                Operation::new("payee_mapping", "m1", "targetId", "p1"),
                Operation::new("payees", "p1", "name", "Shop"),
            ],
            PriorState::new(),
        );
        let ops = undo_operations(&rules(), &[b]);
        assert_eq!(ops, vec![Operation::new("payees", "p1", "tombstone", 1)]);
    }

    #[test]
    fn redo_replays_and_resurrects_once_per_row() {
        let b = batch(
            vec![
                Operation::new("payees", "r2", "name", "Cafe"),
                Operation::new("payees", "r2", "category", "c1"),
                Operation::new("payee_mapping", "r2", "targetId", "r2"),
                Operation::new("notes", "n1", "value", "memo"),
            ],
            PriorState::new(),
        );
        let ops = redo_operations(&rules(), &[b]);
        assert_eq!(ops.len(), 5);
        assert_eq!(ops[0], Operation::new("payees", "r2", "name", "Cafe"));
        assert_eq!(ops[3], Operation::new("notes", "n1", "value", "memo"));
        assert_eq!(ops[4], Operation::new("payees", "r2", "tombstone", 0));
    }

    #[test]
    fn redo_replays_delete_then_clears_tombstone() {
        let b = batch(
            vec![
                Operation::new("payees", "p1", "name", "Cafe"),
                Operation::new("payees", "p1", "tombstone", 1),
            ],
            PriorState::new(),
        );
        assert_eq!(
            redo_operations(&rules(), &[b]),
            vec![
                Operation::new("payees", "p1", "name", "Cafe"),
                Operation::new("payees", "p1", "tombstone", 1),
                Operation::new("payees", "p1", "tombstone", 0),
            ]
        );
    }

    #[test]
    fn redo_of_existing_row_does_not_resurrect() {
        let b = batch(
            vec![Operation::new("payees", "p1", "name", "New")],
            PriorState::new().with_row("payees", "p1", PriorRow::new().with("name", "Old")),
        );
        assert!(resurrections(&rules(), &[b.clone()]).is_empty());
        assert_eq!(redo_operations(&rules(), &[b]).len(), 1);
    }

    #[test]
    fn resurrection_follows_rule_flag() {
        let table = RuleTable::standard().with_rule("payees", DatasetRule::soft_delete().with_resurrect(false));
        let b = batch(vec![Operation::new("payees", "p1", "name", "x")], PriorState::new());
        assert!(resurrections(&table, &[b]).is_empty());
    }

    #[test]
    fn redo_strips_original_timestamps() {
        let op = Operation::new("payees", "p1", "name", "x")
            .stamped(ledgerline_core::Timestamp::new(1, 0, 1));
        let b = batch(vec![op], PriorState::new());
        assert!(redo_operations(&rules(), &[b]).iter().all(|o| o.timestamp.is_none()));
    }
}
