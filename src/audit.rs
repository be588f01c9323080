//! Main audit orchestration logic

use crate::config::AuditConfig;
use crate::error::Result;
use crate::hosting::GitHubClient;
use crate::parser::extract_dependencies;
use crate::registry::NuGetRegistry;
use crate::types::{
    AuditReport, DependencyVerdict, DescriptorLocation, DescriptorReport, Repository,
    RepositoryReport,
};
use crate::walker::DescriptorWalk;
use tracing::{debug, info, warn};

/// Audit every repository of the configured account.
///
/// Only a failure to list the repositories is returned as an error; problems
/// inside a repository are recorded in (or left out of) its report.
pub async fn audit_account(config: &AuditConfig) -> Result<AuditReport> {
    let auditor = Auditor::new(config)?;
    let repositories = auditor.repositories().await?;

    let report = auditor.audit_repositories(&repositories, |_| {}).await;
    Ok(report)
}

/// Runs the scan one repository at a time
pub struct Auditor {
    config: AuditConfig,
    github: GitHubClient,
    registry: NuGetRegistry,
}

impl Auditor {
    pub fn new(config: &AuditConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            github: GitHubClient::new(config)?,
            registry: NuGetRegistry::new(config)?,
        })
    }

    /// All repositories of the account
    pub async fn repositories(&self) -> Result<Vec<Repository>> {
        let repositories = self.github.list_repositories(self.config.page_size).await?;
        info!("Found {} repositories", repositories.len());
        Ok(repositories)
    }

    /// Audit one repository; `None` when it has no descriptors
    pub async fn audit_repository(&self, repository: &Repository) -> Option<RepositoryReport> {
        debug!("Scanning {}", repository.full_name);

        let mut walk = DescriptorWalk::new(
            &self.github,
            repository,
            "",
            self.config.descriptor_extension.as_str(),
        );

        let mut descriptors = Vec::new();
        while let Some(location) = walk.next().await {
            descriptors.push(self.audit_descriptor(repository, &location).await);
        }

        if descriptors.is_empty() {
            debug!("No descriptors in {}", repository.full_name);
            return None;
        }

        Some(RepositoryReport {
            repository: repository.clone(),
            descriptors,
        })
    }

    /// Audit `repositories` in order and summarize the result.
    ///
    /// `on_report` sees each repository report as soon as it is complete.
    pub async fn audit_repositories(
        &self,
        repositories: &[Repository],
        mut on_report: impl FnMut(&RepositoryReport),
    ) -> AuditReport {
        let mut report = AuditReport::new();
        for repository in repositories {
            if let Some(repo_report) = self.audit_repository(repository).await {
                on_report(&repo_report);
                report.repositories.push(repo_report);
            }
        }

        report.compute_summary();

        info!(
            "Audit complete: {} deprecated of {} dependencies in {} repositories",
            report.summary.deprecated, report.summary.dependencies, report.summary.repositories
        );

        report
    }

    async fn audit_descriptor(
        &self,
        repository: &Repository,
        location: &DescriptorLocation,
    ) -> DescriptorReport {
        let Some(url) = location.download_url.as_deref() else {
            warn!("{}:/{} has no download URL", repository.full_name, location.path);
            return DescriptorReport::failed(&location.path, "no download URL");
        };

        let declarations = match self.github.fetch_file(url).await {
            Ok(text) => extract_dependencies(&text),
            Err(e) => Err(e),
        };
        let declarations = match declarations {
            Ok(declarations) => declarations,
            Err(e) => {
                warn!("Failed to read {}:/{}: {}", repository.full_name, location.path, e);
                return DescriptorReport::failed(&location.path, e.to_string());
            }
        };

        let mut report = DescriptorReport {
            path: location.path.clone(),
            dependencies: Vec::new(),
            skipped: Vec::new(),
            error: None,
        };

        for declaration in declarations {
            if declaration.name.is_empty() {
                report.skipped.push(declaration);
                continue;
            }
            if let Err(e) = declaration.parsed_version() {
                debug!("Skipping {}: {}", declaration.name, e);
                report.skipped.push(declaration);
                continue;
            }

            let deprecated = self
                .registry
                .check_deprecation(&declaration.name, &declaration.version)
                .await;

            report.dependencies.push(DependencyVerdict {
                name: declaration.name,
                version: declaration.version,
                deprecated,
            });
        }

        report
    }
}
