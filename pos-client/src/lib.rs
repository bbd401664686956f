//! Karaoke-box POS client core
//!
//! Tracks which boxes are occupied, meters elapsed time against tiered
//! hourly pricing, accumulates per-room orders, applies discounts and
//! drives the cash/transfer checkout flow. Billing state lives in a
//! single [`ledger::RoomLedger`] mutated only from the
//! [`service::LedgerService`] event loop; persistence is optimistic with
//! debounced outbound calls and reload-on-failure recovery.

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod ledger;
pub mod pricing;
pub mod realtime;
pub mod service;
pub mod sync;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, LedgerError, LedgerResult};
pub use events::UiEvent;
pub use ledger::RoomLedger;
pub use service::{LedgerCommand, LedgerHandle, LedgerService};
