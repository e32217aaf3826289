//! Shell configuration.
//!
//! Read from an optional JSON file; every field has a default so an empty
//! object (or no file at all) is a valid configuration.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use toolsai_credentials::CredentialResolverConfig;
use toolsai_license::{
    local_midnight, AllowListVerifier, HttpBackend, HttpBackendConfig, LicenseVerifier,
    LicensingBackend, MockBackend, SessionConfig,
};
use tracing::debug;

/// Name of the config file looked up in the data directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Subscription end date granted by allow-listed keys.
pub const DEFAULT_LICENSE_EXPIRY: (i32, u32, u32) = (2099, 3, 20);

/// Keys accepted by the built-in allow-list.
const DEFAULT_LICENSE_KEYS: [&str; 2] = [
    "zQYy8g-MQDckq-isQUoM-mjBTEO-BpsZgl-KhvP8K",
    "zQYy8g-MQDckq-isQUoM-mjBTEO-BpsZgl-KhvP8I",
];

/// Everything the shell needs to build an [`AppContext`](crate::AppContext).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Where local state lives. Defaults to the platform data dir.
    pub data_dir: Option<PathBuf>,
    /// Credential bootstrap endpoint.
    pub bootstrap_url: Option<String>,
    /// Built-in credential used when every other source is empty.
    pub fallback_credential: Option<String>,
    /// Remote licensing service. `None` uses the local mock.
    pub licensing_backend: Option<HttpBackendConfig>,
    /// Allow-listed license keys.
    pub license_keys: Vec<String>,
    /// Expiry date (local midnight) of allow-listed keys.
    pub license_expiry: NaiveDate,
    /// Plan name reported for allow-listed keys.
    pub plan_name: String,
    /// Session behaviour switches.
    pub session: SessionConfig,
}

impl Default for ShellConfig {
    fn default() -> Self {
        let (y, m, d) = DEFAULT_LICENSE_EXPIRY;
        Self {
            data_dir: None,
            bootstrap_url: None,
            fallback_credential: option_env!("TOOLSAI_FALLBACK_API_KEY").map(String::from),
            licensing_backend: None,
            license_keys: DEFAULT_LICENSE_KEYS.iter().map(|k| k.to_string()).collect(),
            license_expiry: NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MAX),
            plan_name: "default".to_string(),
            session: SessionConfig::default(),
        }
    }
}

impl ShellConfig {
    /// Reads a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Reads `path` if given, else `config.json` in the default data dir if it
    /// exists, else the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let candidate = default_data_dir().join(CONFIG_FILE_NAME);
        if candidate.exists() {
            debug!(path = %candidate.display(), "Loading config");
            return Self::load(&candidate);
        }
        Ok(Self::default())
    }

    /// The effective data directory.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    /// Resolver settings derived from this config.
    #[must_use]
    pub fn credential_config(&self) -> CredentialResolverConfig {
        CredentialResolverConfig {
            bootstrap_url: self.bootstrap_url.clone(),
            fallback: self.fallback_credential.clone(),
            ..Default::default()
        }
    }

    /// The allow-list verifier described by this config.
    #[must_use]
    pub fn verifier(&self) -> Arc<dyn LicenseVerifier> {
        Arc::new(AllowListVerifier::new(
            &self.license_keys,
            self.plan_name.clone(),
            local_midnight(self.license_expiry),
        ))
    }

    /// The licensing backend selected by this config.
    pub fn backend(&self) -> Result<Arc<dyn LicensingBackend>> {
        match &self.licensing_backend {
            Some(cfg) => Ok(Arc::new(
                HttpBackend::new(cfg.clone()).context("Failed to create licensing backend")?,
            )),
            None => Ok(Arc::new(MockBackend::new())),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("toolsai"))
        .unwrap_or_else(|| PathBuf::from(".toolsai"))
}
