//! Remote bootstrap endpoint source.
//!
//! Deployments can hand out a shared credential from a tiny serverless
//! function. The endpoint is `GET` with no body and answers
//! `{ "apiKey": "..." }`. Any transport error, non-2xx status, malformed body
//! or empty key makes the source unavailable.

use crate::error::SourceUnavailable;
use crate::source::{CredentialSource, CredentialSourceKind};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Body returned by the bootstrap endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapResponse {
    /// The credential. May be missing or empty on a misconfigured deployment.
    #[serde(rename = "apiKey", default)]
    pub api_key: Option<String>,
}

/// Fetches a credential from a bootstrap URL.
#[derive(Debug, Clone)]
pub struct BootstrapSource {
    client: Client,
    url: String,
}

impl BootstrapSource {
    /// Creates a source for `url` with its own HTTP client.
    pub fn new(url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, url))
    }

    /// Creates a source sharing an existing client.
    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// The endpoint this source queries.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CredentialSource for BootstrapSource {
    fn kind(&self) -> CredentialSourceKind {
        CredentialSourceKind::RemoteBootstrap
    }

    async fn try_get(&self) -> Result<Option<String>, SourceUnavailable> {
        debug!(url = %self.url, "Requesting credential from bootstrap endpoint");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SourceUnavailable::new(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceUnavailable::new(format!(
                "bootstrap endpoint returned {status}: {body}"
            )));
        }

        let parsed: BootstrapResponse = response
            .json()
            .await
            .map_err(|e| SourceUnavailable::new(format!("malformed response: {e}")))?;

        match parsed.api_key {
            Some(key) if !key.trim().is_empty() => Ok(Some(key)),
            _ => Err(SourceUnavailable::new("API key is missing from response")),
        }
    }
}
