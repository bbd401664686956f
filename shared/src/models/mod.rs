//! Data models for rooms, catalogs and bill payloads

mod bill;
mod dish;
mod price_rule;
mod room;

pub use bill::*;
pub use dish::*;
pub use price_rule::*;
pub use room::*;
