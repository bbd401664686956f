//! Shared error types

use thiserror::Error;

/// Application-level error for shared model and payload handling
#[derive(Debug, Error)]
pub enum AppError {
    /// A payload failed validation before leaving the client
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A referenced entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for shared operations
pub type AppResult<T> = Result<T, AppError>;
