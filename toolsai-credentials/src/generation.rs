//! Seam between the credential resolver and the generation service.
//!
//! The generation service itself is opaque. All the resolver needs from it is
//! a distinguishable "credential rejected" failure, so that the cache can be
//! dropped and the next call re-walks the source chain.

use crate::error::CredentialError;
use crate::resolver::CredentialResolver;
use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

/// Failures from a generation call.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The service refused the credential.
    #[error("API key rejected: {0}")]
    CredentialRejected(String),

    /// Any other failure.
    #[error("generation failed: {0}")]
    Failed(String),

    /// No credential could be resolved.
    #[error(transparent)]
    Credential(#[from] CredentialError),
}

impl GenerationError {
    /// Classifies an HTTP failure from the generation backend.
    ///
    /// 401 and 403 always mean a bad key. The backend also answers 404
    /// ("Requested entity was not found") and 400 "API key not valid" for
    /// keys lacking access.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        let rejected = match status {
            401 | 403 | 404 => true,
            400 => body.contains("API key not valid") || body.contains("API_KEY_INVALID"),
            _ => false,
        };
        if rejected {
            Self::CredentialRejected(format!("status {status}"))
        } else {
            Self::Failed(format!("status {status}: {body}"))
        }
    }

    /// True for [`GenerationError::CredentialRejected`].
    #[must_use]
    pub fn is_credential_rejected(&self) -> bool {
        matches!(self, Self::CredentialRejected(_))
    }
}

/// A generation backend that consumes a resolved credential.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// What a tool asks for.
    type Request: Send;
    /// What the service returns.
    type Output: Send;

    /// Runs one generation with `credential`.
    async fn generate(
        &self,
        credential: &str,
        request: Self::Request,
    ) -> Result<Self::Output, GenerationError>;
}

/// Resolves a credential, runs `request`, and invalidates the cache if the
/// service rejects the credential.
///
/// There is no retry; the caller decides whether to try again.
pub async fn dispatch<S>(
    resolver: &CredentialResolver,
    service: &S,
    request: S::Request,
) -> Result<S::Output, GenerationError>
where
    S: GenerationService + ?Sized,
{
    let credential = resolver.resolve_credential().await?;
    match service.generate(credential.value(), request).await {
        Err(e) if e.is_credential_rejected() => {
            warn!(source = %credential.source(), "Generation service rejected API key");
            resolver.invalidate_cache().await;
            Err(e)
        }
        other => other,
    }
}
