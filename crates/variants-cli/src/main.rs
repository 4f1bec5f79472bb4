//! variants CLI tool.
//!
//! Resolves build-variant flavors from the labels of a pull/merge request
//! (or the one associated with a commit) and exports the expanded variant
//! patterns as environment variables. Designed to run as a CI step, so
//! every flag also reads from an environment variable.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use url::Url;

mod commands;
mod description;
mod export;

#[derive(Parser)]
#[command(name = "variants")]
#[command(about = "Resolve build variants from PR/MR labels", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch labels, resolve flavors and export environment variables
    Resolve(ResolveArgs),
    /// Check the specification strings without fetching or exporting
    Validate {
        #[command(flatten)]
        specs: SpecArgs,
    },
}

#[derive(Args)]
struct SpecArgs {
    /// Flavor dimension specification, e.g. "free,!paid|phone,tablet"
    #[arg(long, env = "VARIANT_LABELS")]
    variant_labels: String,

    /// Variant pattern specifications, e.g. "FLAVOR=#1#2|TASK=assemble#1#2;,"
    #[arg(long, env = "VARIANT_PATTERNS")]
    variant_patterns: String,

    /// Label-to-env specifications, e.g. "skip_build,dist_*=distribute"
    #[arg(long, env = "LABELS2ENV")]
    labels2env: Option<String>,
}

#[derive(Args)]
struct ResolveArgs {
    #[command(flatten)]
    specs: SpecArgs,

    /// Source-control provider hosting the repository
    #[arg(long, env = "PROVIDER", value_enum, default_value_t = Provider::Github)]
    provider: Provider,

    /// Repository owner (github)
    #[arg(long, env = "REPO_OWNER")]
    repo_owner: Option<String>,

    /// Repository name (github)
    #[arg(long, env = "REPO_NAME")]
    repo_name: Option<String>,

    /// Full project path (gitlab), e.g. "group/project"
    #[arg(long, env = "PROJECT_PATH")]
    project_path: Option<String>,

    /// Numeric project id (gitlab); enables commit-message labels
    #[arg(long, env = "PROJECT_ID")]
    project_id: Option<String>,

    /// API bearer token
    #[arg(long, env = "AUTH_TOKEN", hide_env_values = true)]
    auth_token: Option<String>,

    /// Pull/merge request number
    #[arg(long, env = "PULL_REQUEST")]
    pull_request: Option<u64>,

    /// Commit hash, resolved through its merged PR/MR
    #[arg(long, env = "COMMIT_HASH")]
    commit_hash: Option<String>,

    /// Override the provider API base URL (self-hosted installs)
    #[arg(long, env = "API_URL")]
    api_url: Option<Url>,

    /// Export the merge-request description to this path (gitlab)
    #[arg(long, env = "EXPORT_DESCRIPTION")]
    export_description: Option<PathBuf>,

    /// Append KEY=VALUE lines to this file instead of calling envman
    #[arg(long, env = "ENV_FILE")]
    env_file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Provider {
    Github,
    Gitlab,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve(args) => commands::resolve::run(args).await,
        Commands::Validate { specs } => commands::validate(&specs),
    }
}
