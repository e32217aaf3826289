//! Licensing backend handshake.
//!
//! Before any login the client performs an init handshake with the licensing
//! service. The answer is `{ success, message, sessionId? }`.

use crate::error::LicenseResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use toolsai_types::SessionId;
use tracing::debug;

/// Answer to the init handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitResponse {
    /// Whether the backend accepted the handshake.
    pub success: bool,
    /// Human-readable status.
    pub message: String,
    /// Session handle, when one was issued.
    #[serde(rename = "sessionId", alias = "sessionid", default)]
    pub session_id: Option<SessionId>,
}

/// The remote (or mocked) licensing service.
#[async_trait]
pub trait LicensingBackend: Send + Sync {
    /// Performs the init handshake.
    ///
    /// A transport failure is `Err(LicenseError::Transport)`; a refusal is an
    /// `Ok` response with `success == false`.
    async fn init(&self) -> LicenseResult<InitResponse>;
}

/// Local stand-in for the licensing service.
///
/// The first handshake mints a session id; later ones report that the
/// session already exists.
#[derive(Debug, Default)]
pub struct MockBackend {
    initialized: AtomicBool,
}

impl MockBackend {
    /// Creates an uninitialized mock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LicensingBackend for MockBackend {
    async fn init(&self) -> LicenseResult<InitResponse> {
        if self.initialized.swap(true, Ordering::AcqRel) {
            return Ok(InitResponse {
                success: true,
                message: "Session already initialized.".to_string(),
                session_id: None,
            });
        }

        let session_id = SessionId::new();
        debug!(%session_id, "Mock licensing session created");
        Ok(InitResponse {
            success: true,
            message: "Session has been initialized.".to_string(),
            session_id: Some(session_id),
        })
    }
}

#[cfg(feature = "online")]
mod http {
    use super::{InitResponse, LicensingBackend};
    use crate::error::{LicenseError, LicenseResult};
    use async_trait::async_trait;
    use reqwest::Client;
    use serde::{Deserialize, Serialize};
    use std::time::Duration;
    use tracing::debug;

    /// Where and as whom to perform the handshake.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct HttpBackendConfig {
        /// Endpoint receiving the form-encoded init request.
        pub url: String,
        /// Application name registered with the licensing service.
        pub app_name: String,
        /// Owner id registered with the licensing service.
        pub owner_id: String,
        /// Application version.
        pub version: String,
        /// Request timeout.
        pub timeout_secs: u64,
    }

    impl Default for HttpBackendConfig {
        fn default() -> Self {
            Self {
                url: String::new(),
                app_name: "Tools-AI".to_string(),
                owner_id: String::new(),
                version: "1.0".to_string(),
                timeout_secs: 30,
            }
        }
    }

    /// Licensing service reached over HTTP.
    pub struct HttpBackend {
        config: HttpBackendConfig,
        client: Client,
    }

    impl HttpBackend {
        /// Creates a backend with its own HTTP client.
        pub fn new(config: HttpBackendConfig) -> LicenseResult<Self> {
            let client = Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .map_err(|e| LicenseError::Transport(format!("failed to create HTTP client: {e}")))?;
            Ok(Self { config, client })
        }
    }

    #[async_trait]
    impl LicensingBackend for HttpBackend {
        async fn init(&self) -> LicenseResult<InitResponse> {
            debug!(url = %self.config.url, "Licensing init handshake");

            let response = self
                .client
                .post(&self.config.url)
                .form(&[
                    ("type", "init"),
                    ("name", self.config.app_name.as_str()),
                    ("ownerid", self.config.owner_id.as_str()),
                    ("ver", self.config.version.as_str()),
                ])
                .send()
                .await
                .map_err(|e| LicenseError::Transport(format!("init request failed: {e}")))?;

            let status = response.status();
            if !status.is_success() {
                return Err(LicenseError::Transport(format!(
                    "licensing backend returned {status}"
                )));
            }

            response
                .json::<InitResponse>()
                .await
                .map_err(|e| LicenseError::Transport(format!("malformed init response: {e}")))
        }
    }
}

#[cfg(feature = "online")]
pub use http::{HttpBackend, HttpBackendConfig};
