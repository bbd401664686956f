//! Realtime channel payloads
//!
//! The realtime collaborator pushes a periodic authoritative clock tick
//! and payment-completion notifications. Delivery is at-least-once and
//! tolerant of reordering; the core subscribes to ticks and payment
//! statuses and ignores every other message type.

use serde::{Deserialize, Serialize};

/// Message pushed by the realtime channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RealtimeMessage {
    /// Authoritative clock value for synchronized elapsed-time computation
    MinuteTick { timestamp: i64 },
    /// Gateway completion signal for a room's transfer payment
    PaymentStatus { room_id: i64, success: bool },
    /// Heartbeat reply; connection bookkeeping only
    Pong { timestamp: i64 },
    /// Anything this client version does not understand
    #[serde(other)]
    Unknown,
}

impl RealtimeMessage {
    /// Parse a raw transport frame
    ///
    /// Transport adapters feed their wire payloads through this so every
    /// implementation tolerates new server-side message types the same
    /// way.
    pub fn parse(raw: &str) -> crate::error::AppResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Connection liveness as reported by the transport
///
/// The core may use this to suppress stale displays but never to mutate
/// billing state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Disconnected,
    Error(String),
}
