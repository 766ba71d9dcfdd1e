mod config;
mod engine;
mod github;
mod links;
mod report;
#[cfg(test)]
mod testutil;
mod tracker;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::engine::Walker;
use crate::github::{CodeHost, GitHubHost};
use crate::tracker::{IssueTracker, JiraTracker};

/// backport-tracker — reports which upstream pull requests referenced by a
/// tree of tracked work items have matching back-ports in a downstream fork
/// organization.
#[derive(Parser, Debug)]
#[command(name = "backport-tracker", version, about)]
struct Cli {
    /// Work item keys to audit (e.g., PROJ-1234)
    #[arg(required = true)]
    items: Vec<String>,

    /// Configuration file path (defaults to .backport-tracker.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Optional output file path for a markdown report
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let config = config::Config::load(cli.config.as_deref())?;
    debug!(downstream_org = %config.downstream_org, "configuration resolved");

    let tracker: Arc<dyn IssueTracker> = Arc::new(JiraTracker::new(
        &config.jira.url,
        &config.jira.user,
        &config.jira.password,
    ));
    let host: Arc<dyn CodeHost> = Arc::new(GitHubHost::new(
        &config.github.api_url,
        &config.github.token,
    ));
    let walker = Walker::new(tracker, host, &config.downstream_org);

    info!(items = cli.items.len(), "walking work item trees");
    let results = walker.walk_all(&cli.items).await;
    info!(roots = results.len(), "assembled result trees");

    report::output(
        &results,
        &config.jira.url,
        &config.downstream_org,
        cli.output.as_deref(),
    )?;

    Ok(())
}
