//! Shared types for the karaoke-box POS client
//!
//! Common types used across the workspace: room and catalog models,
//! bill wire payloads, realtime message types, error types, and
//! small time utilities.

pub mod error;
pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult};
pub use message::{ConnectionState, RealtimeMessage};
