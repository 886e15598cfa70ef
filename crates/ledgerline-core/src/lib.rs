#![forbid(unsafe_code)]

//! Core data model for the Ledgerline column store.
//!
//! # Role in Ledgerline
//! `ledgerline-core` owns the vocabulary every other crate speaks: a single
//! column-level write ([`Operation`]), the values it carries ([`Value`]), the
//! logical clock stamp attached at submission ([`Timestamp`]), and the
//! pre-write snapshot of touched rows ([`PriorState`]).
//!
//! # How it fits in the system
//! The mutation layer builds operations and captures prior state before it
//! applies them. `ledgerline-undo` records both so it can later derive the
//! operations that reverse or replay a transaction.

pub mod operation;
pub mod prior_state;
pub mod timestamp;
pub mod value;

pub use operation::{Operation, RowRef};
pub use prior_state::{PriorRow, PriorState};
pub use timestamp::Timestamp;
pub use value::Value;
