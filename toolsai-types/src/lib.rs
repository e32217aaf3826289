//! Core type definitions for Tools-AI.
//!
//! This crate defines the small set of types shared by the credential and
//! licensing crates:
//! - Device and session identifiers
//! - An injectable wall clock (system or fixed, for simulated "now")
//! - Subscription day arithmetic

mod clock;
mod ids;

pub use clock::{days_remaining, Clock, FixedClock, SystemClock, MILLIS_PER_DAY};
pub use ids::{HardwareId, SessionId};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid identifier: {0}")]
    InvalidId(String),
}
