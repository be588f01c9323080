//! CLI tool for finding deprecated NuGet packages across a GitHub account

use anyhow::Context;
use clap::Parser;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use repo_deprecation_audit::{AuditConfig, AuditReport, Auditor, RepositoryReport};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "deprecation-audit")]
#[command(about = "Scan every repository of a GitHub account for deprecated NuGet package versions", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a configuration file (TOML); defaults plus GITHUB_TOKEN otherwise
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{} Failed to load config: {:#}", "Error:".red().bold(), e);
                process::exit(1);
            }
        },
        None => AuditConfig::default(),
    };

    let auditor = match Auditor::new(&config) {
        Ok(auditor) => auditor,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            process::exit(1);
        }
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Listing repositories...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let repositories = match auditor.repositories().await {
        Ok(repositories) => repositories,
        Err(e) => {
            spinner.finish_and_clear();
            eprintln!("{} Failed to list repositories: {}", "Error:".red().bold(), e);
            process::exit(1);
        }
    };

    spinner.set_message(format!("Scanning {} repositories...", repositories.len()));
    let report = auditor
        .audit_repositories(&repositories, |repo_report| {
            spinner.suspend(|| display_repository(repo_report))
        })
        .await;

    spinner.finish_and_clear();

    display_summary(&report);
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: &Path) -> anyhow::Result<AuditConfig> {
    AuditConfig::from_file(path).with_context(|| format!("reading {}", path.display()))
}

fn display_repository(report: &RepositoryReport) {
    println!("\n{} {}", "Repository:".bold(), report.repository.full_name.cyan());

    for descriptor in &report.descriptors {
        println!("  {}", descriptor.path.bold());

        if let Some(error) = &descriptor.error {
            println!("    {} {}", "Unreadable:".red(), error);
            continue;
        }

        if descriptor.dependencies.is_empty() && descriptor.skipped.is_empty() {
            println!("    {}", "No package references".dimmed());
        }

        for dep in &descriptor.dependencies {
            let verdict = if dep.deprecated {
                dep.to_string().red().bold()
            } else {
                dep.to_string().green()
            };
            println!("    {} {}: {}", dep.name, dep.version, verdict);
        }

        for skipped in &descriptor.skipped {
            let name = if skipped.name.is_empty() { "<unnamed>" } else { skipped.name.as_str() };
            let version = if skipped.version.is_empty() { "<no version>" } else { skipped.version.as_str() };
            println!("    {} {}: {}", name, version, "Skipped".dimmed());
        }
    }
}

fn display_summary(report: &AuditReport) {
    println!("\n{}", "=== Audit Summary ===".bold());
    println!("Repositories with project files: {}", report.summary.repositories);
    println!("Project files: {}", report.summary.descriptors);
    if report.summary.unreadable_descriptors > 0 {
        println!(
            "Unreadable project files: {}",
            report.summary.unreadable_descriptors.to_string().red()
        );
    }
    println!("Dependencies checked: {}", report.summary.dependencies);
    println!("Skipped declarations: {}", report.summary.skipped);

    let deprecated = report.summary.deprecated.to_string();
    if report.summary.deprecated > 0 {
        println!("Deprecated: {}", deprecated.red().bold());
    } else {
        println!("Deprecated: {}", deprecated.green());
    }
}
