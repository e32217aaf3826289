//! Shared test helpers for license tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use toolsai_license::{
    AllowListVerifier, InitResponse, LicenseError, LicenseResult, LicenseVerifier,
    LicensingBackend, MockBackend, SessionConfig, SessionManager, SubscriptionInfo,
};
use toolsai_store::{KeyValueStore, MemoryStore, StorageKey, StoreError, StoreResult};
use toolsai_types::FixedClock;

pub const VALID_KEY: &str = "KEY-A";

/// 2099-03-20 00:00 UTC.
pub fn expiry() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2099, 3, 20, 0, 0, 0).unwrap()
}

/// 2024-01-01 00:00 UTC.
pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Allow-list verifier that counts calls.
pub struct CountingVerifier {
    inner: AllowListVerifier,
    pub calls: AtomicUsize,
}

impl CountingVerifier {
    pub fn new(keys: &[&str], expiry: DateTime<Utc>) -> Self {
        Self {
            inner: AllowListVerifier::new(keys.iter().copied(), "default", expiry),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LicenseVerifier for CountingVerifier {
    async fn verify(&self, key: &str) -> Option<SubscriptionInfo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.verify(key).await
    }
}

/// How a [`ScriptedBackend`] answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    Mock,
    Refuse,
    Unreachable,
}

/// Backend that counts handshakes and can be told to fail.
pub struct ScriptedBackend {
    mock: MockBackend,
    mode: std::sync::Mutex<BackendMode>,
    pub calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new(mode: BackendMode) -> Self {
        Self {
            mock: MockBackend::new(),
            mode: std::sync::Mutex::new(mode),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_mode(&self, mode: BackendMode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LicensingBackend for ScriptedBackend {
    async fn init(&self) -> LicenseResult<InitResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mode = *self.mode.lock().unwrap();
        match mode {
            BackendMode::Mock => self.mock.init().await,
            BackendMode::Refuse => Ok(InitResponse {
                success: false,
                message: "application disabled".to_string(),
                session_id: None,
            }),
            BackendMode::Unreachable => Err(LicenseError::Transport("connection refused".into())),
        }
    }
}

/// In-memory store whose reads and writes can be switched to fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }

    /// Reads and writes both fail.
    pub fn broken() -> Self {
        let store = Self::default();
        store.fail_reads.store(true, Ordering::SeqCst);
        store.fail_writes.store(true, Ordering::SeqCst);
        store
    }

    pub fn set_failing(&self, reads: bool, writes: bool) {
        self.fail_reads.store(reads, Ordering::SeqCst);
        self.fail_writes.store(writes, Ordering::SeqCst);
    }

    pub fn peek(&self, key: StorageKey) -> Option<String> {
        self.inner.get(key).unwrap()
    }

    fn check(flag: &AtomicBool) -> StoreResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::from(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "storage offline",
            )));
        }
        Ok(())
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: StorageKey) -> StoreResult<Option<String>> {
        Self::check(&self.fail_reads)?;
        self.inner.get(key)
    }

    fn set(&self, key: StorageKey, value: &str) -> StoreResult<()> {
        Self::check(&self.fail_writes)?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: StorageKey) -> StoreResult<()> {
        Self::check(&self.fail_writes)?;
        self.inner.remove(key)
    }
}

/// A manager over `store` with the mock backend and the test allow-list.
pub fn manager_over(store: Arc<dyn KeyValueStore>) -> SessionManager {
    SessionManager::new(
        Arc::new(MockBackend::new()),
        Arc::new(CountingVerifier::new(&[VALID_KEY], expiry())),
        store,
        Arc::new(FixedClock::new(start())),
        SessionConfig::default(),
    )
}

/// A session manager with in-memory collaborators.
pub struct Harness {
    pub manager: SessionManager,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<FixedClock>,
    pub verifier: Arc<CountingVerifier>,
    pub backend: Arc<ScriptedBackend>,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(MemoryStore::new(), BackendMode::Mock, SessionConfig::default())
    }

    pub fn with_store(store: MemoryStore) -> Self {
        Self::build(store, BackendMode::Mock, SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self::build(MemoryStore::new(), BackendMode::Mock, config)
    }

    pub fn with_backend(mode: BackendMode) -> Self {
        Self::build(MemoryStore::new(), mode, SessionConfig::default())
    }

    pub fn build(store: MemoryStore, mode: BackendMode, config: SessionConfig) -> Self {
        let store = Arc::new(store);
        let clock = Arc::new(FixedClock::new(start()));
        let verifier = Arc::new(CountingVerifier::new(&[VALID_KEY], expiry()));
        let backend = Arc::new(ScriptedBackend::new(mode));
        let manager = SessionManager::new(
            backend.clone(),
            verifier.clone(),
            store.clone(),
            clock.clone(),
            config,
        );
        Self {
            manager,
            store,
            clock,
            verifier,
            backend,
        }
    }

    /// A harness that has already completed `initialize`.
    pub async fn initialized() -> Self {
        let h = Self::new();
        h.manager.initialize().await.unwrap();
        h
    }
}
