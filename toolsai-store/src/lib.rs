//! Local persistent key/value storage for Tools-AI.
//!
//! Both the credential resolver and the license session manager keep a few
//! strings across restarts (API key, hardware id, saved username and license
//! key). They share one [`KeyValueStore`] under the fixed, non-overlapping
//! keys of [`StorageKey`].
//!
//! Two implementations ship:
//! - [`MemoryStore`]: process-local, used by tests and ephemeral runs
//! - [`FileStore`]: a single JSON document on disk

mod error;
mod file;
mod memory;

pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::MemoryStore;

/// The persisted keys. Each component owns its own subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// Raw credential for the generation service.
    ApiKey,
    /// Generated device token.
    HardwareId,
    /// Last successful license username.
    Username,
    /// Last successful license key.
    LicenseKey,
}

impl StorageKey {
    /// Every key, in a stable order.
    pub const ALL: [StorageKey; 4] = [
        StorageKey::ApiKey,
        StorageKey::HardwareId,
        StorageKey::Username,
        StorageKey::LicenseKey,
    ];

    /// The on-disk name of this key.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ApiKey => "gemini_api_key",
            Self::HardwareId => "keyauth_hwid",
            Self::Username => "username",
            Self::LicenseKey => "license_key",
        }
    }
}

/// Synchronous string key/value storage.
///
/// Implementations must be safe to share between the credential resolver and
/// the session manager.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` if absent.
    fn get(&self, key: StorageKey) -> StoreResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: StorageKey, value: &str) -> StoreResult<()>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: StorageKey) -> StoreResult<()>;
}
