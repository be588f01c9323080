//! Core data types for repository scanning and deprecation reporting

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A repository owned by (or visible to) the authenticated account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Login of the owning user or organisation
    pub owner: String,
    /// Repository name
    pub name: String,
    /// `owner/name`
    pub full_name: String,
}

impl Repository {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        let owner = owner.into();
        let name = name.into();
        let full_name = format!("{}/{}", owner, name);
        Self {
            owner,
            name,
            full_name,
        }
    }
}

/// Kind of an entry in a repository directory listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Submodule,
    #[serde(other)]
    Other,
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Raw content address, present for files
    #[serde(default)]
    pub download_url: Option<String>,
}

impl TreeEntry {
    pub fn file(name: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
            download_url: Some(download_url.into()),
        }
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Dir,
            download_url: None,
        }
    }
}

/// A project descriptor found while walking a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorLocation {
    /// Path relative to the repository root
    pub path: String,
    /// File name
    pub name: String,
    pub download_url: Option<String>,
}

/// A `(package, version)` pair declared by a descriptor.
///
/// Either field is empty when the descriptor omitted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyDeclaration {
    pub name: String,
    pub version: String,
}

impl DependencyDeclaration {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Parse the declared version as a semantic version
    pub fn parsed_version(&self) -> crate::Result<semver::Version> {
        semver::Version::parse(self.version.trim())
            .map_err(|e| crate::AuditError::version(self.version.clone(), e))
    }
}

/// Complete audit report for an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    /// Timestamp when audit was performed
    pub timestamp: DateTime<Utc>,
    /// Repositories that contained at least one descriptor
    pub repositories: Vec<RepositoryReport>,
    /// Summary statistics
    pub summary: AuditSummary,
}

/// Summary statistics for an audit report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub repositories: usize,
    pub descriptors: usize,
    pub unreadable_descriptors: usize,
    pub dependencies: usize,
    pub deprecated: usize,
    pub skipped: usize,
}

/// Results for one repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryReport {
    pub repository: Repository,
    pub descriptors: Vec<DescriptorReport>,
}

/// Results for one descriptor file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptorReport {
    pub path: String,
    /// Dependencies that were checked against the registry
    pub dependencies: Vec<DependencyVerdict>,
    /// Declarations with an empty name or a non-semver version
    pub skipped: Vec<DependencyDeclaration>,
    /// Set when the descriptor could not be fetched or parsed
    pub error: Option<String>,
}

impl DescriptorReport {
    pub fn failed(path: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            dependencies: Vec::new(),
            skipped: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// Deprecation verdict for a single dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyVerdict {
    pub name: String,
    pub version: String,
    pub deprecated: bool,
}

impl std::fmt::Display for DependencyVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.deprecated {
            write!(f, "Deprecated")
        } else {
            write!(f, "Not Deprecated")
        }
    }
}

impl AuditReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self {
            timestamp: Utc::now(),
            repositories: Vec::new(),
            summary: AuditSummary::default(),
        }
    }

    /// Compute summary statistics from repository results
    pub fn compute_summary(&mut self) {
        let mut summary = AuditSummary {
            repositories: self.repositories.len(),
            ..AuditSummary::default()
        };

        for descriptor in self.repositories.iter().flat_map(|r| &r.descriptors) {
            summary.descriptors += 1;
            if descriptor.error.is_some() {
                summary.unreadable_descriptors += 1;
            }
            summary.dependencies += descriptor.dependencies.len();
            summary.deprecated += descriptor
                .dependencies
                .iter()
                .filter(|d| d.deprecated)
                .count();
            summary.skipped += descriptor.skipped.len();
        }

        self.summary = summary;
    }
}

impl Default for AuditReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_kind_from_contents_api() {
        let entries: Vec<TreeEntry> = serde_json::from_str(
            r#"[
                {"name": "src", "type": "dir", "download_url": null},
                {"name": "App.csproj", "type": "file", "download_url": "https://raw/App.csproj"},
                {"name": "weird", "type": "something-new"}
            ]"#,
        )
        .unwrap();

        assert_eq!(entries[0], TreeEntry::dir("src"));
        assert_eq!(entries[1], TreeEntry::file("App.csproj", "https://raw/App.csproj"));
        assert_eq!(entries[2].kind, EntryKind::Other);
    }

    #[test]
    fn test_parsed_version() {
        assert!(DependencyDeclaration::new("A", "13.0.1").parsed_version().is_ok());
        assert!(DependencyDeclaration::new("A", "13.0").parsed_version().is_err());
        assert!(DependencyDeclaration::new("A", "").parsed_version().is_err());
    }

    #[test]
    fn test_compute_summary() {
        let mut report = AuditReport::new();
        report.repositories.push(RepositoryReport {
            repository: Repository::new("acme", "widgets"),
            descriptors: vec![
                DescriptorReport {
                    path: "src/widgets.csproj".into(),
                    dependencies: vec![
                        DependencyVerdict {
                            name: "Newtonsoft.Json".into(),
                            version: "13.0.1".into(),
                            deprecated: true,
                        },
                        DependencyVerdict {
                            name: "Serilog".into(),
                            version: "3.1.1".into(),
                            deprecated: false,
                        },
                    ],
                    skipped: vec![DependencyDeclaration::new("Legacy", "1.0")],
                    error: None,
                },
                DescriptorReport::failed("broken.csproj", "bad xml"),
            ],
        });

        report.compute_summary();

        assert_eq!(
            report.summary,
            AuditSummary {
                repositories: 1,
                descriptors: 2,
                unreadable_descriptors: 1,
                dependencies: 2,
                deprecated: 1,
                skipped: 1,
            }
        );
    }
}
