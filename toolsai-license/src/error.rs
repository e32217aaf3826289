//! Error types for the licensing module.

use thiserror::Error;

/// Licensing-specific errors.
///
/// The `Display` text is meant to be shown to the user as-is.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// A session operation ran before `initialize` completed.
    #[error("not initialized, please wait or refresh")]
    NotInitialized,

    /// Username was empty after trimming.
    #[error("username cannot be empty")]
    EmptyUsername,

    /// License key was empty after trimming.
    #[error("license key cannot be empty")]
    EmptyLicenseKey,

    /// The verifier does not recognise the key.
    #[error("invalid license key provided")]
    InvalidLicenseKey,

    /// Saved credentials from a previous run no longer verify.
    #[error("your saved session is invalid, please log in again")]
    StaleSessionInvalid,

    /// An operation needs an authenticated session.
    #[error("no active session")]
    NotAuthenticated,

    /// Subscription has run out (only when expiry is enforced).
    #[error("license expired on {0}")]
    Expired(String),

    /// The licensing backend answered but refused the handshake.
    #[error("licensing handshake failed: {0}")]
    Handshake(String),

    /// The licensing backend could not be reached.
    #[error("network error: {0}")]
    Transport(String),

    /// Local storage error.
    #[error("storage error: {0}")]
    Storage(#[from] toolsai_store::StoreError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LicenseError {
    /// True for failures caused by what the user typed.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyUsername | Self::EmptyLicenseKey | Self::InvalidLicenseKey
        )
    }
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
