//! Device identity.
//!
//! The hardware id is a random token minted on first use and kept in local
//! storage. It is never recomputed from the machine; clearing storage is the
//! only way to get a new one.

use serde::{Deserialize, Serialize};
use std::env;
use std::sync::{Arc, OnceLock};
use toolsai_store::{KeyValueStore, StorageKey};
use toolsai_types::HardwareId;
use tracing::{debug, warn};

/// Information about the current device, shown alongside the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Operating system name.
    pub os_name: String,
    /// Operating system version.
    pub os_version: String,
    /// Hostname.
    pub hostname: String,
    /// CPU architecture.
    pub arch: String,
}

impl DeviceInfo {
    /// Collects information about the current device.
    #[must_use]
    pub fn collect() -> Self {
        Self {
            os_name: env::consts::OS.to_string(),
            os_version: get_os_version(),
            hostname: get_hostname(),
            arch: env::consts::ARCH.to_string(),
        }
    }
}

/// Supplies the stable per-device identifier.
///
/// Clones share the id minted while storage was unusable, so every handle
/// in the process reports the same value.
#[derive(Clone)]
pub struct HardwareIdProvider {
    store: Arc<dyn KeyValueStore>,
    unsaved: Arc<OnceLock<HardwareId>>,
}

impl HardwareIdProvider {
    /// Reads and writes the id under [`StorageKey::HardwareId`] in `store`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            unsaved: Arc::new(OnceLock::new()),
        }
    }

    /// Returns the persisted id, generating and saving one on first use.
    ///
    /// Never fails. If storage cannot be read or written, the first id minted
    /// is kept in memory and returned for the rest of the process; it is
    /// saved once storage accepts writes again.
    #[must_use]
    pub fn get_id(&self) -> HardwareId {
        match self.store.get(StorageKey::HardwareId) {
            Ok(Some(raw)) => match HardwareId::parse(&raw) {
                Ok(id) => return id,
                Err(e) => warn!(error = %e, "Stored hardware id unusable, regenerating"),
            },
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "Could not read hardware id");
                return self.unsaved.get_or_init(HardwareId::generate).clone();
            }
        }

        let id = self
            .unsaved
            .get()
            .cloned()
            .unwrap_or_else(HardwareId::generate);
        match self.store.set(StorageKey::HardwareId, id.as_str()) {
            Ok(()) => {
                debug!(hwid = %id, "Generated hardware id");
                id
            }
            Err(e) => {
                warn!(error = %e, "Could not persist hardware id");
                self.unsaved.get_or_init(|| id).clone()
            }
        }
    }
}

/// Gets the machine hostname.
fn get_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Gets the OS version string.
fn get_os_version() -> String {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("sw_vers")
            .arg("-productVersion")
            .output()
            .ok()
            .and_then(|o| String::from_utf8(o.stdout).ok())
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    #[cfg(target_os = "linux")]
    {
        std::fs::read_to_string("/etc/os-release")
            .ok()
            .and_then(|content| {
                content
                    .lines()
                    .find(|l| l.starts_with("VERSION_ID="))
                    .map(|l| {
                        l.trim_start_matches("VERSION_ID=")
                            .trim_matches('"')
                            .to_string()
                    })
            })
            .unwrap_or_else(|| "unknown".to_string())
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        "unknown".to_string()
    }
}
