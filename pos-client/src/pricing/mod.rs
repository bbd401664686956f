//! Pricing engine
//!
//! Rule schedule matching and the time/price arithmetic behind room
//! billing. Everything here is pure; the ledger calls into it on every
//! clock tick.

mod arithmetic;
mod discount;
mod matcher;

pub use arithmetic::*;
pub use discount::*;
pub use matcher::*;
