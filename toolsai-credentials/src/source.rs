//! Credential source strategies.

use crate::error::SourceUnavailable;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use toolsai_store::{KeyValueStore, StorageKey};

/// Where a resolved credential came from. Diagnostic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSourceKind {
    /// Entered by the user during this process.
    UserProvided,
    /// Read back from local storage.
    Persisted,
    /// Fetched from the bootstrap endpoint.
    RemoteBootstrap,
    /// Built-in fallback value.
    Fallback,
}

impl fmt::Display for CredentialSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::UserProvided => "user-provided",
            Self::Persisted => "persisted",
            Self::RemoteBootstrap => "remote-bootstrap",
            Self::Fallback => "fallback",
        };
        f.write_str(s)
    }
}

/// One link of the resolution chain.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Provenance tag recorded on a credential from this source.
    fn kind(&self) -> CredentialSourceKind;

    /// Attempts to produce a credential.
    ///
    /// `Ok(None)` means the source has nothing to offer; `Err` means it
    /// failed. The resolver treats both as "try the next source".
    async fn try_get(&self) -> Result<Option<String>, SourceUnavailable>;
}

/// The value set explicitly through the resolver.
#[derive(Debug, Clone, Default)]
pub struct UserProvidedSource {
    slot: Arc<RwLock<Option<String>>>,
}

impl UserProvidedSource {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the held value.
    pub async fn set(&self, value: Option<String>) {
        *self.slot.write().await = value;
    }
}

#[async_trait]
impl CredentialSource for UserProvidedSource {
    fn kind(&self) -> CredentialSourceKind {
        CredentialSourceKind::UserProvided
    }

    async fn try_get(&self) -> Result<Option<String>, SourceUnavailable> {
        Ok(self.slot.read().await.clone())
    }
}

/// The credential saved in local storage.
pub struct PersistedSource {
    store: Arc<dyn KeyValueStore>,
}

impl PersistedSource {
    /// Reads from `store` under [`StorageKey::ApiKey`].
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CredentialSource for PersistedSource {
    fn kind(&self) -> CredentialSourceKind {
        CredentialSourceKind::Persisted
    }

    async fn try_get(&self) -> Result<Option<String>, SourceUnavailable> {
        self.store
            .get(StorageKey::ApiKey)
            .map_err(|e| SourceUnavailable::new(format!("local storage: {e}")))
    }
}

/// A fixed value chosen at build or configuration time.
#[derive(Debug, Clone, Default)]
pub struct FallbackSource {
    value: Option<String>,
}

impl FallbackSource {
    /// `None` leaves the chain without a fallback.
    #[must_use]
    pub fn new(value: Option<String>) -> Self {
        Self { value }
    }
}

#[async_trait]
impl CredentialSource for FallbackSource {
    fn kind(&self) -> CredentialSourceKind {
        CredentialSourceKind::Fallback
    }

    async fn try_get(&self) -> Result<Option<String>, SourceUnavailable> {
        Ok(self.value.clone())
    }
}
