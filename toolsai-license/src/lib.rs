//! License gate and session management for Tools-AI.
//!
//! This crate handles:
//! - A stable per-device hardware identifier
//! - License key verification behind a pluggable [`LicenseVerifier`]
//! - The licensing backend handshake
//! - The session state machine gating access to the tool suite
//!
//! # Session lifecycle
//!
//! `Uninitialized → Initializing → {Unauthenticated, Authenticated}`
//!
//! [`SessionManager::initialize`] runs once per process. After a successful
//! handshake it tries to resume from the username and license key saved by a
//! previous run; a saved pair that no longer verifies is purged.
//! `Authenticated` only goes back to `Unauthenticated` through
//! [`SessionManager::logout`].
//!
//! Expected failures (empty input, unknown key, calling before init) come
//! back as [`LicenseError`] values carrying a message suitable for display.

mod backend;
mod device;
mod error;
mod session;
mod verifier;

pub use backend::{InitResponse, LicensingBackend, MockBackend};
pub use device::{DeviceInfo, HardwareIdProvider};
pub use error::{LicenseError, LicenseResult};
pub use session::{
    InitOutcome, SessionConfig, SessionInfo, SessionManager, SessionState, Subscription,
};
pub use verifier::{local_midnight, AllowListVerifier, LicenseVerifier, SubscriptionInfo};

#[cfg(feature = "online")]
pub use backend::{HttpBackend, HttpBackendConfig};
