//! The credential resolver and its cache.

use crate::bootstrap::BootstrapSource;
use crate::error::{CredentialError, CredentialResult};
use crate::source::{
    CredentialSource, CredentialSourceKind, FallbackSource, PersistedSource, UserProvidedSource,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use toolsai_store::{KeyValueStore, StorageKey};
use tracing::{debug, info, warn};

/// Resolver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialResolverConfig {
    /// Bootstrap endpoint. `None` skips the remote source.
    pub bootstrap_url: Option<String>,
    /// Last-resort credential. `None` means the chain can be exhausted.
    pub fallback: Option<String>,
    /// Transport timeout for the bootstrap request.
    pub bootstrap_timeout_secs: u64,
}

impl Default for CredentialResolverConfig {
    fn default() -> Self {
        Self {
            bootstrap_url: None,
            fallback: None,
            bootstrap_timeout_secs: 30,
        }
    }
}

/// A resolved credential and where it came from.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    value: String,
    source: CredentialSourceKind,
}

impl Credential {
    /// The bearer value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Provenance of the value.
    #[must_use]
    pub fn source(&self) -> CredentialSourceKind {
        self.source
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("value", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// Resolves and caches the generation-service credential.
///
/// The resolver is an ordinary value owned by the application shell and
/// shared by handle; it holds no global state.
pub struct CredentialResolver {
    store: Arc<dyn KeyValueStore>,
    user: UserProvidedSource,
    sources: Vec<Box<dyn CredentialSource>>,
    cache: RwLock<Option<Credential>>,
    epoch: AtomicU64,
}

impl CredentialResolver {
    /// Builds the standard chain: user-provided, persisted, bootstrap, fallback.
    pub fn new(
        config: &CredentialResolverConfig,
        store: Arc<dyn KeyValueStore>,
    ) -> CredentialResult<Self> {
        let mut remote: Vec<Box<dyn CredentialSource>> = Vec::new();
        if let Some(url) = &config.bootstrap_url {
            let timeout = Duration::from_secs(config.bootstrap_timeout_secs);
            remote.push(Box::new(BootstrapSource::new(url.clone(), timeout)?));
        }
        remote.push(Box::new(FallbackSource::new(config.fallback.clone())));
        Ok(Self::with_sources(store, remote))
    }

    /// Builds a chain of user-provided, persisted, then `remote` in order.
    ///
    /// The first two links are always present since the resolver owns the
    /// state behind them.
    pub fn with_sources(
        store: Arc<dyn KeyValueStore>,
        remote: Vec<Box<dyn CredentialSource>>,
    ) -> Self {
        let user = UserProvidedSource::new();
        let mut sources: Vec<Box<dyn CredentialSource>> = Vec::with_capacity(remote.len() + 2);
        sources.push(Box::new(user.clone()));
        sources.push(Box::new(PersistedSource::new(Arc::clone(&store))));
        sources.extend(remote);

        Self {
            store,
            user,
            sources,
            cache: RwLock::new(None),
            epoch: AtomicU64::new(0),
        }
    }

    /// Returns the active credential value, resolving it if needed.
    ///
    /// # Errors
    ///
    /// [`CredentialError::Unavailable`] when no source yields a value.
    pub async fn resolve(&self) -> CredentialResult<String> {
        self.resolve_credential().await.map(|c| c.value)
    }

    /// Like [`resolve`](Self::resolve) but also reports the source.
    pub async fn resolve_credential(&self) -> CredentialResult<Credential> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            return Ok(cached.clone());
        }

        for source in &self.sources {
            let kind = source.kind();
            match source.try_get().await {
                Ok(Some(value)) if !value.trim().is_empty() => {
                    let credential = Credential {
                        value: value.trim().to_string(),
                        source: kind,
                    };
                    info!(source = %kind, "Using API key");
                    if kind == CredentialSourceKind::Fallback {
                        warn!("Using the built-in fallback API key; set your own key for best results");
                    }
                    *self.cache.write().await = Some(credential.clone());
                    return Ok(credential);
                }
                Ok(_) => debug!(source = %kind, "Credential source empty"),
                Err(e) => warn!(source = %kind, error = %e, "Credential source failed, trying next"),
            }
        }

        Err(CredentialError::Unavailable)
    }

    /// Sets (non-empty) or removes (empty) the user's credential.
    ///
    /// A non-empty value is trimmed, persisted and becomes the highest
    /// priority source. Either way the cache and any state derived from the
    /// previous credential are reset.
    pub async fn set_credential(&self, value: &str) -> CredentialResult<()> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.store.remove(StorageKey::ApiKey)?;
            self.user.set(None).await;
            debug!("API key cleared");
        } else {
            self.store.set(StorageKey::ApiKey, trimmed)?;
            self.user.set(Some(trimmed.to_string())).await;
            debug!("API key saved");
        }
        self.reset().await;
        Ok(())
    }

    /// Removes the persisted credential and resets the cache.
    pub async fn clear_credential(&self) -> CredentialResult<()> {
        self.set_credential("").await
    }

    /// Drops the in-memory cache only; persisted storage is untouched.
    ///
    /// Call after the generation service rejects a credential.
    pub async fn invalidate_cache(&self) {
        self.reset().await;
    }

    /// The source of the cached credential, if one is cached.
    pub async fn cached_source(&self) -> Option<CredentialSourceKind> {
        self.cache.read().await.as_ref().map(Credential::source)
    }

    /// Counter bumped on every reset.
    ///
    /// Clients built from a credential record the epoch they were built at and
    /// rebuild once it moves.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    async fn reset(&self) {
        *self.cache.write().await = None;
        self.epoch.fetch_add(1, Ordering::AcqRel);
        debug!("Credential cache reset");
    }
}
