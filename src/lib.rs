//! # repo_deprecation_audit
//!
//! Scans every repository of a GitHub account for .NET project files and
//! reports which pinned NuGet package versions the registry marks deprecated:
//! - **Tree walking**: lazy depth-first discovery of `.csproj` descriptors
//! - **Descriptor parsing**: `PackageReference` name/version extraction
//! - **Registry lookups**: index page resolution followed by a deprecation check
//!
//! ## Quick Start
//!
//! ```no_run
//! use repo_deprecation_audit::{audit_account, AuditConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = AuditConfig::builder().github_token("ghp_example").build();
//! let report = audit_account(&config).await?;
//!
//! for repo in &report.repositories {
//!     for descriptor in &repo.descriptors {
//!         for dep in &descriptor.dependencies {
//!             println!("{} {}: {}", dep.name, dep.version, dep);
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Every request is made sequentially. Failures below the repository list
//! (an unreadable directory, a malformed project file, a registry miss) only
//! narrow the results; they never abort the run.

mod audit;
mod config;
mod error;
mod hosting;
mod parser;
mod registry;
mod types;
mod walker;

// Re-export public API
pub use audit::{audit_account, Auditor};
pub use config::{AuditConfig, AuditConfigBuilder, NetworkConfig};
pub use error::{AuditError, Result};
pub use hosting::GitHubClient;
pub use parser::extract_dependencies;
pub use registry::{contains_version, NuGetRegistry, RegistryClient};
pub use types::{
    AuditReport, AuditSummary, DependencyDeclaration, DependencyVerdict, DescriptorLocation,
    DescriptorReport, EntryKind, Repository, RepositoryReport, TreeEntry,
};
pub use walker::{DescriptorWalk, DirectoryLister};
