//! Deprecation lookups against the NuGet registration API
//!
//! A lookup is two requests. The registration index for a package lists pages,
//! each covering a `lower`..`upper` version range; the page covering the target
//! version is then fetched and its leaves are checked for `deprecation` metadata.

use crate::config::AuditConfig;
use crate::error::{AuditError, Result};
use crate::registry::client::RegistryClient;
use semver::Version;
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct RegistrationIndex {
    #[serde(default)]
    items: Vec<IndexPage>,
}

#[derive(Debug, Deserialize)]
struct IndexPage {
    #[serde(rename = "@id")]
    id: Option<String>,
    lower: Option<String>,
    upper: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RegistrationPage {
    #[serde(default)]
    items: Vec<PageLeaf>,
}

#[derive(Debug, Deserialize)]
struct PageLeaf {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "@id", default)]
    at_id: Option<String>,
    #[serde(rename = "catalogEntry", default)]
    catalog_entry: Option<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    deprecation: Option<serde_json::Value>,
}

/// `lower < version < upper`; both bounds are exclusive.
pub fn contains_version(lower: &Version, upper: &Version, version: &Version) -> bool {
    lower < version && version < upper
}

/// Registry lookups for a single package version
#[derive(Debug, Clone)]
pub struct NuGetRegistry {
    client: RegistryClient,
    base_url: String,
}

impl NuGetRegistry {
    pub fn new(config: &AuditConfig) -> Result<Self> {
        Ok(Self {
            client: RegistryClient::new(&config.network)?,
            base_url: config.registry_api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Registration index address for a package
    pub fn index_url(&self, package: &str) -> String {
        format!("{}/{}/index.json", self.base_url, package.to_lowercase())
    }

    /// Whether `package` at `version` is marked deprecated.
    ///
    /// Unknown is reported as `false`. The page lookup is skipped entirely when
    /// no index page covers the version.
    pub async fn check_deprecation(&self, package: &str, version: &str) -> bool {
        let version = version.trim();
        let parsed = match Version::parse(version) {
            Ok(v) => v,
            Err(e) => {
                debug!("Not checking {} {}: {}", package, version, e);
                return false;
            }
        };

        match self.resolve_catalog_page(package, &parsed).await {
            Some(page) => self.is_deprecated(&page, version).await,
            None => false,
        }
    }

    /// Address of the index page whose range contains `version`.
    ///
    /// When several ranges match, the last one in the index wins.
    pub async fn resolve_catalog_page(&self, package: &str, version: &Version) -> Option<String> {
        let url = self.index_url(package);
        match self.try_resolve_catalog_page(&url, version).await {
            Ok(Some(page)) => {
                debug!("{} {} is covered by {}", package, version, page);
                Some(page)
            }
            Ok(None) => {
                debug!("No index page of {} covers {}", package, version);
                None
            }
            Err(e) => {
                warn!("Failed to resolve index page for {} {}: {}", package, version, e);
                None
            }
        }
    }

    async fn try_resolve_catalog_page(&self, url: &str, version: &Version) -> Result<Option<String>> {
        let body = self.client.fetch_json(url).await?;
        let index: RegistrationIndex = serde_json::from_str(&body)?;
        select_catalog_page(index, version, url)
    }

    /// Whether the page at `page_url` has a deprecated leaf for `version`.
    pub async fn is_deprecated(&self, page_url: &str, version: &str) -> bool {
        match self.try_is_deprecated(page_url, version).await {
            Ok(deprecated) => deprecated,
            Err(e) => {
                warn!("Failed to read registry page {}: {}", page_url, e);
                false
            }
        }
    }

    async fn try_is_deprecated(&self, page_url: &str, version: &str) -> Result<bool> {
        let body = self.client.fetch_json(page_url).await?;
        let page: RegistrationPage = serde_json::from_str(&body)?;
        Ok(page_marks_deprecated(&page, version))
    }
}

fn select_catalog_page(
    index: RegistrationIndex,
    version: &Version,
    index_url: &str,
) -> Result<Option<String>> {
    let selected = index
        .items
        .into_iter()
        .filter(|page| {
            match (
                page.lower.as_deref().map(Version::parse),
                page.upper.as_deref().map(Version::parse),
            ) {
                (Some(Ok(lower)), Some(Ok(upper))) => contains_version(&lower, &upper, version),
                _ => false,
            }
        })
        .last();

    match selected {
        Some(page) => page
            .id
            .map(Some)
            .ok_or_else(|| AuditError::missing_field(index_url, "@id")),
        None => Ok(None),
    }
}

// Leaves are matched by substring on their id, so "1.0" also matches "1.0.1".
fn page_marks_deprecated(page: &RegistrationPage, version: &str) -> bool {
    page.items.iter().any(|leaf| {
        let id_matches = [leaf.id.as_deref(), leaf.at_id.as_deref()]
            .into_iter()
            .flatten()
            .any(|id| id.contains(version));
        let deprecated = leaf
            .catalog_entry
            .as_ref()
            .is_some_and(|entry| entry.deprecation.is_some());
        id_matches && deprecated
    })
}
