//! HTTP access to the package registry

use crate::config::NetworkConfig;
use crate::error::{AuditError, Result};
use reqwest::Client;
use tracing::debug;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const SERVICE: &str = "NuGet";

/// Fetches registry documents as text.
///
/// Every registry request goes through [`RegistryClient::fetch_json`]. The
/// underlying client is built with reqwest's `gzip` and `deflate` decoders,
/// which read `Content-Encoding` and inflate the body before it is handed
/// back; bodies with any other encoding are read as-is.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: Client,
}

impl RegistryClient {
    /// Build a registry client with the configured timeout
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .gzip(true)
            .deflate(true)
            .build()
            .map_err(|e| AuditError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// GET `url` and return the (decompressed) body text.
    ///
    /// Non-success statuses and undecodable bodies are errors; nothing is retried.
    pub async fn fetch_json(&self, url: &str) -> Result<String> {
        debug!("Fetching registry document {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AuditError::network(format!("{} request failed: {}", SERVICE, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuditError::http_status(SERVICE, status.as_u16(), url));
        }

        let body = response.text().await?;
        Ok(body)
    }
}
