//! Configuration for the audit run: credentials, endpoints and paging

use crate::error::{AuditError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_HOSTING_API: &str = "https://api.github.com";
const DEFAULT_REGISTRY_API: &str = "https://api.nuget.org/v3/registration5-gz-semver2";

/// Main configuration for the audit process
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// GitHub API token used as `Authorization: token <value>`
    pub github_token: Option<String>,
    /// Base URL of the source hosting API
    pub hosting_api_base: String,
    /// Base URL of the NuGet registration API
    pub registry_api_base: String,
    /// Repositories requested per page from `/user/repos`
    pub page_size: u32,
    /// File name suffix identifying project descriptors (case-insensitive)
    pub descriptor_extension: String,
    /// Network configuration
    pub network: NetworkConfig,
}

/// Network configuration for API calls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            github_token: std::env::var("GITHUB_TOKEN").ok(),
            hosting_api_base: DEFAULT_HOSTING_API.to_string(),
            registry_api_base: DEFAULT_REGISTRY_API.to_string(),
            page_size: 100,
            descriptor_extension: ".csproj".to_string(),
            network: NetworkConfig::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl NetworkConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AuditConfig {
    /// Create a new builder for AuditConfig
    pub fn builder() -> AuditConfigBuilder {
        AuditConfigBuilder::default()
    }

    /// Load configuration from a TOML file; absent keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AuditConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Check that the configuration can drive a run
    pub fn validate(&self) -> Result<()> {
        if matches!(self.github_token.as_deref(), None | Some("")) {
            return Err(AuditError::config(
                "no GitHub token configured (set GITHUB_TOKEN or github_token)",
            ));
        }
        if self.page_size == 0 {
            return Err(AuditError::config("page_size must be greater than zero"));
        }
        if self.hosting_api_base.trim().is_empty() || self.registry_api_base.trim().is_empty() {
            return Err(AuditError::config("API base URLs must not be empty"));
        }
        if self.descriptor_extension.is_empty() {
            return Err(AuditError::config("descriptor_extension must not be empty"));
        }
        Ok(())
    }
}

/// Builder for AuditConfig
#[derive(Default)]
pub struct AuditConfigBuilder {
    github_token: Option<String>,
    hosting_api_base: Option<String>,
    registry_api_base: Option<String>,
    page_size: Option<u32>,
    descriptor_extension: Option<String>,
    network: Option<NetworkConfig>,
}

impl AuditConfigBuilder {
    pub fn github_token(mut self, token: impl Into<String>) -> Self {
        self.github_token = Some(token.into());
        self
    }

    pub fn hosting_api_base(mut self, base: impl Into<String>) -> Self {
        self.hosting_api_base = Some(base.into());
        self
    }

    pub fn registry_api_base(mut self, base: impl Into<String>) -> Self {
        self.registry_api_base = Some(base.into());
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn descriptor_extension(mut self, extension: impl Into<String>) -> Self {
        self.descriptor_extension = Some(extension.into());
        self
    }

    pub fn network(mut self, network: NetworkConfig) -> Self {
        self.network = Some(network);
        self
    }

    pub fn build(self) -> AuditConfig {
        let defaults = AuditConfig::default();
        AuditConfig {
            github_token: self.github_token.or(defaults.github_token),
            hosting_api_base: self.hosting_api_base.unwrap_or(defaults.hosting_api_base),
            registry_api_base: self.registry_api_base.unwrap_or(defaults.registry_api_base),
            page_size: self.page_size.unwrap_or(defaults.page_size),
            descriptor_extension: self
                .descriptor_extension
                .unwrap_or(defaults.descriptor_extension),
            network: self.network.unwrap_or(defaults.network),
        }
    }
}
