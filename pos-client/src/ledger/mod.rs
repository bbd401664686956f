//! Room ledger - the billing state machine
//!
//! One entry per room; the ledger owns the roster and is the sole write
//! path. Every transition is a synchronous method on [`RoomLedger`] that
//! validates, mutates, bumps the room's version and ends with the uniform
//! [`recompute`] derivation, so minutes and totals can never diverge
//! between call sites.

mod checkout;
mod manager;
mod recompute;

pub use manager::RoomLedger;
pub use recompute::recompute;
