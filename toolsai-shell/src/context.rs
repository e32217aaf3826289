//! Application context and caller-side flows.

use anyhow::{Context, Result};
use std::sync::Arc;
use thiserror::Error;
use toolsai_credentials::{Credential, CredentialError, CredentialResolver};
use toolsai_license::{LicenseError, LicenseResult, SessionInfo, SessionManager};
use toolsai_store::{FileStore, KeyValueStore};
use toolsai_types::SystemClock;
use tracing::{info, warn};

use crate::ShellConfig;

/// Registration succeeded or failed, and if it succeeded, whether the
/// follow-up login did.
#[derive(Debug, Error)]
pub enum SignUpError {
    /// The key was refused before any session was created.
    #[error("registration failed: {0}")]
    Register(#[source] LicenseError),

    /// The key was accepted but the follow-up login was not.
    #[error("registration succeeded, but auto-login failed: {0}")]
    AutoLogin(#[source] LicenseError),
}

/// Why a tool could not obtain a credential.
#[derive(Debug, Error)]
pub enum GateError {
    /// No authorized session.
    #[error("a valid license is required to use the tools")]
    Unlicensed,

    /// Licensed, but no credential source produced a key.
    #[error(transparent)]
    Credential(#[from] CredentialError),
}

/// Everything the tools need, constructed once at startup.
pub struct AppContext {
    store: Arc<dyn KeyValueStore>,
    credentials: CredentialResolver,
    session: SessionManager,
}

impl AppContext {
    /// Builds the context with a file store in the configured data dir.
    pub fn open(config: &ShellConfig) -> Result<Self> {
        let dir = config.data_dir();
        let store = FileStore::in_dir(&dir)
            .with_context(|| format!("Failed to open data dir {}", dir.display()))?;
        Self::with_store(config, Arc::new(store))
    }

    /// Builds the context over an existing store.
    pub fn with_store(config: &ShellConfig, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let credentials = CredentialResolver::new(&config.credential_config(), Arc::clone(&store))
            .context("Failed to build credential resolver")?;
        let session = SessionManager::new(
            config.backend()?,
            config.verifier(),
            Arc::clone(&store),
            Arc::new(SystemClock),
            config.session.clone(),
        );
        Ok(Self::from_parts(store, credentials, session))
    }

    /// Assembles a context from pre-built parts.
    pub fn from_parts(
        store: Arc<dyn KeyValueStore>,
        credentials: CredentialResolver,
        session: SessionManager,
    ) -> Self {
        Self {
            store,
            credentials,
            session,
        }
    }

    /// Local persistent storage shared by the resolver and the session.
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// The credential resolver.
    pub fn credentials(&self) -> &CredentialResolver {
        &self.credentials
    }

    /// The license session manager.
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Logs in and saves the credentials for the next start.
    ///
    /// A save failure is logged; the session itself stays valid.
    pub async fn sign_in(&self, username: &str, license_key: &str) -> LicenseResult<SessionInfo> {
        let info = self.session.login(username, license_key).await?;
        if let Err(e) = self.session.persist_login().await {
            warn!(error = %e, "Failed to save login");
        }
        Ok(info)
    }

    /// Registers, then logs in with the same credentials.
    pub async fn register_and_sign_in(
        &self,
        username: &str,
        license_key: &str,
    ) -> Result<SessionInfo, SignUpError> {
        let subscription = self
            .session
            .register(username, license_key)
            .await
            .map_err(SignUpError::Register)?;
        info!(plan = %subscription.plan_name, "Registration accepted, logging in");
        self.sign_in(username, license_key)
            .await
            .map_err(SignUpError::AutoLogin)
    }

    /// Returns the credential a tool should use, if the session allows it.
    pub async fn tool_credential(&self) -> Result<Credential, GateError> {
        if !self.session.is_authorized().await {
            return Err(GateError::Unlicensed);
        }
        Ok(self.credentials.resolve_credential().await?)
    }
}

/// Masks all but the first four characters of a credential for display.
#[must_use]
pub fn mask_credential(value: &str) -> String {
    let visible: String = value.chars().take(4).collect();
    let hidden = value.chars().count().saturating_sub(4);
    format!("{visible}{}", "*".repeat(hidden.min(16)))
}
