//! Error types for credential resolution.

use thiserror::Error;

/// Result type for credential operations.
pub type CredentialResult<T> = Result<T, CredentialError>;

/// Errors surfaced by the credential resolver.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// No source in the chain produced a credential.
    #[error("could not retrieve an API key; please set one manually")]
    Unavailable,

    /// Local storage failed while saving or clearing a credential.
    #[error("storage error: {0}")]
    Storage(#[from] toolsai_store::StoreError),

    /// HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// A single source failed to produce a value.
///
/// Internal to resolution: the resolver logs it and moves to the next source.
#[derive(Debug, Error)]
#[error("credential source unavailable: {0}")]
pub struct SourceUnavailable(pub String);

impl SourceUnavailable {
    pub(crate) fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}
