//! Events emitted towards the presentation layer

use shared::message::ConnectionState;

/// Display-facing notification from the service loop
///
/// Warnings are advisory validation rejections (state unchanged, no
/// network call was made); errors are persistence failures that already
/// triggered a roster resync.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Roster state changed; re-render from the ledger
    RoomsChanged,
    Warning(String),
    Error(String),
    Connection(ConnectionState),
}
