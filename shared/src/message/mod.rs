//! Realtime message types

mod payload;

pub use payload::*;
