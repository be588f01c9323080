//! Basic example of using the audit API

use repo_deprecation_audit::{audit_account, AuditConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Token comes from GITHUB_TOKEN
    let config = AuditConfig::default();

    println!("Auditing repositories visible to the configured token...");
    let report = audit_account(&config).await?;

    println!("\n=== Audit Results ===");
    println!("Repositories with project files: {}", report.summary.repositories);
    println!("Dependencies checked: {}", report.summary.dependencies);
    println!();

    let deprecated: Vec<_> = report
        .repositories
        .iter()
        .flat_map(|repo| {
            repo.descriptors.iter().flat_map(move |descriptor| {
                descriptor
                    .dependencies
                    .iter()
                    .filter(|dep| dep.deprecated)
                    .map(move |dep| (repo, descriptor, dep))
            })
        })
        .collect();

    if !deprecated.is_empty() {
        println!("Deprecated Dependencies:");
        for (repo, descriptor, dep) in deprecated {
            println!(
                "  - {} v{} ({}:/{})",
                dep.name, dep.version, repo.repository.full_name, descriptor.path
            );
        }
    } else {
        println!("✓ No deprecated dependencies found!");
    }

    Ok(())
}
