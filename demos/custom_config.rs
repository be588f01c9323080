//! Example showing custom configuration and a single-repository walk

use repo_deprecation_audit::{
    extract_dependencies, AuditConfig, DescriptorWalk, GitHubClient, NetworkConfig,
    NuGetRegistry, Repository,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AuditConfig::builder()
        .github_token(std::env::var("GITHUB_TOKEN")?)
        .page_size(50)
        .descriptor_extension(".csproj")
        .network(NetworkConfig { timeout_secs: 10 })
        .build();
    config.validate()?;

    let github = GitHubClient::new(&config)?;
    let registry = NuGetRegistry::new(&config)?;
    let repository = Repository::new("acme", "widgets");

    println!("Walking {}...\n", repository.full_name);

    let mut walk = DescriptorWalk::new(&github, &repository, "", ".csproj");
    while let Some(location) = walk.next().await {
        println!("{}", location.path);

        let Some(url) = location.download_url.as_deref() else {
            continue;
        };
        for dep in extract_dependencies(&github.fetch_file(url).await?)? {
            if dep.parsed_version().is_err() {
                println!("  {} {} (skipped)", dep.name, dep.version);
                continue;
            }
            let deprecated = registry.check_deprecation(&dep.name, &dep.version).await;
            println!(
                "  {} {}: {}",
                dep.name,
                dep.version,
                if deprecated { "Deprecated" } else { "Not Deprecated" }
            );
        }
    }

    Ok(())
}
