//! The license session state machine.

use crate::backend::LicensingBackend;
use crate::device::{DeviceInfo, HardwareIdProvider};
use crate::error::{LicenseError, LicenseResult};
use crate::verifier::{LicenseVerifier, SubscriptionInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use toolsai_store::{KeyValueStore, StorageKey};
use toolsai_types::{days_remaining, Clock, HardwareId, SessionId};
use tracing::{debug, info, warn};

/// Behaviour switches for the session manager.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Refuse logins for expired subscriptions and stop reporting an expired
    /// session as authorized. Off by default: an established session stays
    /// authorized past its expiry.
    pub enforce_expiry: bool,
    /// Recompute `days_remaining` whenever session info is read. Off by
    /// default: the value is frozen at login.
    pub refresh_days_remaining: bool,
}

/// Where the session state machine currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// `initialize` has not been called.
    Uninitialized,
    /// The handshake or resume is in flight.
    Initializing,
    /// Ready, no license accepted.
    Unauthenticated,
    /// A license was accepted.
    Authenticated,
}

/// Subscription details of an established session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Display name of the plan.
    pub plan_name: String,
    /// Instant the subscription ends.
    pub expiry: DateTime<Utc>,
    /// `ceil((expiry - now) / 1 day)`; negative once expired.
    pub days_remaining: i64,
}

/// Everything known about the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Trimmed username.
    pub username: String,
    /// Trimmed license key.
    pub license_key: String,
    /// What the key grants.
    pub subscription: Subscription,
    /// Device the session was established on.
    pub hardware_id: HardwareId,
    /// Login time, seconds since epoch.
    pub last_login: i64,
    /// Device details for diagnostics.
    pub device: DeviceInfo,
}

/// How `initialize` ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// Handshake done, nothing saved to resume.
    Ready {
        /// Backend status message.
        message: String,
    },
    /// A saved session was restored.
    Resumed(SessionInfo),
    /// A saved session no longer verifies and has been purged.
    ResumeFailed,
    /// `initialize` had already completed; nothing changed.
    AlreadyInitialized,
}

impl InitOutcome {
    /// Status line suitable for display.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Ready { message } => message.clone(),
            Self::Resumed(info) => format!("Welcome back, {}!", info.username),
            Self::ResumeFailed => LicenseError::StaleSessionInvalid.to_string(),
            Self::AlreadyInitialized => "Session already initialized.".to_string(),
        }
    }

    /// True when the outcome leaves the session authenticated by resume.
    #[must_use]
    pub fn is_resumed(&self) -> bool {
        matches!(self, Self::Resumed(_))
    }
}

#[derive(Debug)]
struct Inner {
    state: SessionState,
    initialized: bool,
    backend_session: Option<SessionId>,
    session: Option<SessionInfo>,
}

/// Gates the tool suite behind a license check.
///
/// Owned by the application shell and shared by handle. Each call is expected
/// to finish before the next state-changing call is issued; only
/// `initialize` is serialised internally.
pub struct SessionManager {
    backend: Arc<dyn LicensingBackend>,
    verifier: Arc<dyn LicenseVerifier>,
    store: Arc<dyn KeyValueStore>,
    hwid: HardwareIdProvider,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
    inner: RwLock<Inner>,
    init_lock: Mutex<()>,
}

impl SessionManager {
    /// Wires the collaborators together. Nothing runs until `initialize`.
    pub fn new(
        backend: Arc<dyn LicensingBackend>,
        verifier: Arc<dyn LicenseVerifier>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        config: SessionConfig,
    ) -> Self {
        Self {
            backend,
            verifier,
            hwid: HardwareIdProvider::new(Arc::clone(&store)),
            store,
            clock,
            config,
            inner: RwLock::new(Inner {
                state: SessionState::Uninitialized,
                initialized: false,
                backend_session: None,
                session: None,
            }),
            init_lock: Mutex::new(()),
        }
    }

    /// Performs the handshake and resumes a saved session if there is one.
    ///
    /// Runs once; later calls return [`InitOutcome::AlreadyInitialized`]
    /// without touching the backend or the current session.
    ///
    /// # Errors
    ///
    /// [`LicenseError::Transport`] or [`LicenseError::Handshake`] when the
    /// backend cannot be reached or refuses. The manager is left
    /// `Unauthenticated` and `initialize` may be called again. Storage
    /// failures after the handshake are logged: an unreadable saved session
    /// counts as none.
    pub async fn initialize(&self) -> LicenseResult<InitOutcome> {
        let _guard = self.init_lock.lock().await;

        {
            let mut inner = self.inner.write().await;
            if inner.initialized {
                return Ok(InitOutcome::AlreadyInitialized);
            }
            inner.state = SessionState::Initializing;
        }

        let response = match self.backend.init().await {
            Ok(r) if r.success => r,
            Ok(r) => {
                warn!(message = %r.message, "Licensing handshake refused");
                self.set_state(SessionState::Unauthenticated).await;
                return Err(LicenseError::Handshake(r.message));
            }
            Err(e) => {
                warn!(error = %e, "Licensing handshake failed");
                self.set_state(SessionState::Unauthenticated).await;
                return Err(e);
            }
        };

        {
            let mut inner = self.inner.write().await;
            inner.initialized = true;
            inner.backend_session = response.session_id;
        }
        let hwid = self.hwid.get_id();
        debug!(%hwid, "Licensing initialized");

        // Past the handshake, storage trouble only costs the resume.
        let saved = self.saved_credentials().unwrap_or_else(|e| {
            warn!(error = %e, "Could not read saved session");
            None
        });

        let Some((username, license_key)) = saved else {
            self.set_state(SessionState::Unauthenticated).await;
            return Ok(InitOutcome::Ready {
                message: response.message,
            });
        };

        match self.login(&username, &license_key).await {
            Ok(info) => {
                info!(username = %info.username, "Resumed saved session");
                Ok(InitOutcome::Resumed(info))
            }
            Err(e) => {
                warn!(error = %e, "Saved session invalid, purging");
                {
                    let mut inner = self.inner.write().await;
                    inner.session = None;
                    inner.state = SessionState::Unauthenticated;
                }
                if let Err(e) = self.forget_credentials() {
                    warn!(error = %e, "Could not purge saved session");
                }
                Ok(InitOutcome::ResumeFailed)
            }
        }
    }

    /// Checks `license_key` and establishes a session on success.
    ///
    /// The session is not persisted; call [`persist_login`](Self::persist_login)
    /// once the caller has confirmed the login. A failed login leaves any
    /// current session untouched.
    pub async fn login(&self, username: &str, license_key: &str) -> LicenseResult<SessionInfo> {
        let (username, license_key) = self.validate(username, license_key).await?;

        let Some(subscription) = self.verifier.verify(&license_key).await else {
            debug!(%username, "License key rejected");
            return Err(LicenseError::InvalidLicenseKey);
        };

        let now = self.clock.now();
        let days = days_remaining(subscription.expiry, now);
        if self.config.enforce_expiry && days <= 0 {
            return Err(LicenseError::Expired(
                subscription.expiry.format("%Y-%m-%d").to_string(),
            ));
        }

        let info = SessionInfo {
            username,
            license_key,
            subscription: Subscription {
                plan_name: subscription.plan_name,
                expiry: subscription.expiry,
                days_remaining: days,
            },
            hardware_id: self.hwid.get_id(),
            last_login: now.timestamp(),
            device: DeviceInfo::collect(),
        };

        let mut inner = self.inner.write().await;
        inner.session = Some(info.clone());
        inner.state = SessionState::Authenticated;
        info!(username = %info.username, days_remaining = days, "Logged in");
        Ok(info)
    }

    /// Checks that `license_key` could be used to log in.
    ///
    /// Registration creates nothing; the caller logs in afterwards with the
    /// same credentials.
    pub async fn register(
        &self,
        username: &str,
        license_key: &str,
    ) -> LicenseResult<SubscriptionInfo> {
        let (username, license_key) = self.validate(username, license_key).await?;

        match self.verifier.verify(&license_key).await {
            Some(subscription) => {
                info!(%username, "Registered");
                Ok(subscription)
            }
            None => Err(LicenseError::InvalidLicenseKey),
        }
    }

    /// Ends the session and forgets the saved credentials.
    ///
    /// In-memory state is cleared even if storage fails.
    pub async fn logout(&self) -> LicenseResult<()> {
        {
            let mut inner = self.inner.write().await;
            inner.session = None;
            if inner.initialized {
                inner.state = SessionState::Unauthenticated;
            }
        }
        info!("Logged out");
        self.forget_credentials()
    }

    /// Saves the current session's username and key for the next start.
    pub async fn persist_login(&self) -> LicenseResult<()> {
        let inner = self.inner.read().await;
        let session = inner.session.as_ref().ok_or(LicenseError::NotAuthenticated)?;
        self.store.set(StorageKey::Username, &session.username)?;
        self.store.set(StorageKey::LicenseKey, &session.license_key)?;
        debug!(username = %session.username, "Session saved");
        Ok(())
    }

    /// Whether the tool suite should be unlocked.
    pub async fn is_authorized(&self) -> bool {
        let inner = self.inner.read().await;
        match (&inner.state, &inner.session) {
            (SessionState::Authenticated, Some(session)) => {
                !self.config.enforce_expiry
                    || days_remaining(session.subscription.expiry, self.clock.now()) > 0
            }
            _ => false,
        }
    }

    /// The current session, if authenticated.
    pub async fn session_info(&self) -> Option<SessionInfo> {
        let inner = self.inner.read().await;
        let mut info = inner.session.clone()?;
        if self.config.refresh_days_remaining {
            info.subscription.days_remaining =
                days_remaining(info.subscription.expiry, self.clock.now());
        }
        Some(info)
    }

    /// Current state.
    pub async fn state(&self) -> SessionState {
        self.inner.read().await.state
    }

    /// Session id issued by the backend handshake.
    pub async fn backend_session_id(&self) -> Option<SessionId> {
        self.inner.read().await.backend_session
    }

    /// This device's hardware id.
    #[must_use]
    pub fn hardware_id(&self) -> HardwareId {
        self.hwid.get_id()
    }

    async fn validate(&self, username: &str, license_key: &str) -> LicenseResult<(String, String)> {
        if !self.inner.read().await.initialized {
            return Err(LicenseError::NotInitialized);
        }
        let username = username.trim();
        let license_key = license_key.trim();
        if username.is_empty() {
            return Err(LicenseError::EmptyUsername);
        }
        if license_key.is_empty() {
            return Err(LicenseError::EmptyLicenseKey);
        }
        Ok((username.to_string(), license_key.to_string()))
    }

    async fn set_state(&self, state: SessionState) {
        self.inner.write().await.state = state;
    }

    fn saved_credentials(&self) -> LicenseResult<Option<(String, String)>> {
        let username = self.store.get(StorageKey::Username)?;
        let license_key = self.store.get(StorageKey::LicenseKey)?;
        Ok(match (username, license_key) {
            (Some(u), Some(k)) if !u.is_empty() && !k.is_empty() => Some((u, k)),
            _ => None,
        })
    }

    fn forget_credentials(&self) -> LicenseResult<()> {
        self.store.remove(StorageKey::Username)?;
        self.store.remove(StorageKey::LicenseKey)?;
        Ok(())
    }
}
