//! Seat-inventory and screening-scheduling domain logic.
//!
//! This crate has no internal dependencies and performs no I/O. The `db`
//! crate loads committed state inside a locking transaction, asks the
//! functions here for a decision, and writes the outcome.

pub mod error;
pub mod inventory;
pub mod overlap;
pub mod promo;
pub mod roles;
pub mod schedule;
pub mod seat_grid;
pub mod ticket_ledger;
pub mod types;
