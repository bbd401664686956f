//! Client error types

use thiserror::Error;

/// HTTP/backend error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for backend calls
pub type ClientResult<T> = Result<T, ClientError>;

/// Room ledger transition error
///
/// `RoomNotInUse`, `NoActiveRule`, `RoomInMaintenance` and
/// `InvalidTransition` are advisory validation rejections: the operation
/// is refused with a user-facing warning, state stays unchanged and no
/// network call is made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Room not found: {0}")]
    RoomNotFound(i64),

    #[error("Room {0} has no running session")]
    RoomNotInUse(i64),

    #[error("Room {0} has no active price rule")]
    NoActiveRule(i64),

    #[error("Room {0} is under maintenance")]
    RoomInMaintenance(i64),

    #[error("Invalid transition for room {room_id}: {reason}")]
    InvalidTransition { room_id: i64, reason: String },
}

impl LedgerError {
    /// Advisory rejections surface as warnings, not errors
    pub fn is_advisory(&self) -> bool {
        !matches!(self, LedgerError::RoomNotFound(_))
    }
}

/// Result type for ledger transitions
pub type LedgerResult<T> = Result<T, LedgerError>;
