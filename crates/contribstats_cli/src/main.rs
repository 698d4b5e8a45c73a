//! Contribstats CLI - aggregates contribution statistics into JSON artifacts.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{Duration, Utc};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use contribstats::report::{log_summary, AggregateReport};
use contribstats::{azdo, github, identity, Pager};

#[derive(Parser)]
#[command(name = "contribstats")]
#[command(version)]
#[command(about = "Aggregates per-day code contribution statistics from hosted Git platforms")]
#[command(
    long_about = "Contribstats polls hosted-Git REST APIs and folds commits and pull \
requests into per-day contribution totals, written as a JSON artifact for a \
static site to consume. Runs are one-shot and best-effort: partial upstream \
failures are logged and whatever was collected is still written."
)]
#[command(after_long_help = r#"EXAMPLES
    Aggregate Azure DevOps contributions:
        $ contribstats azdo --out public/data/azdo-contributions.json

    Aggregate GitHub contributions with a shorter look-back:
        $ contribstats github --lookback-days 90

ENVIRONMENT VARIABLES
    CONTRIBSTATS_AZDO_ORG           Primary Azure DevOps organization
    CONTRIBSTATS_AZDO_TOKEN         Personal access token for the primary org
    CONTRIBSTATS_AZDO_EMAIL         Author email attributing commits and PRs
    CONTRIBSTATS_AZDO_EXTRA_ORGS    Comma-separated secondary org names, each
                                    with CONTRIBSTATS_AZDO_<ORG>_TOKEN and
                                    CONTRIBSTATS_AZDO_<ORG>_EMAIL
    CONTRIBSTATS_GITHUB_TOKEN       GitHub personal access token
    CONTRIBSTATS_GITHUB_USER        Primary GitHub username
    CONTRIBSTATS_GITHUB_EXTRA_USERS Comma-separated additional usernames

    Variables may also be provided via a .env file in the current directory.
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by both pipelines.
#[derive(Debug, Clone, Args)]
struct RunOptions {
    /// How many days of history to consider
    #[arg(long, default_value_t = 365)]
    lookback_days: i64,

    /// Upper bound on pages fetched per listing (100 items per page)
    #[arg(long, default_value_t = contribstats::page::DEFAULT_MAX_PAGES)]
    max_pages: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate commits and merged pull requests across Azure DevOps
    /// organizations
    Azdo {
        /// Output path for the JSON artifact
        #[arg(short, long, default_value = "public/data/azdo-contributions.json")]
        out: PathBuf,

        #[command(flatten)]
        opts: RunOptions,
    },
    /// Aggregate commit line changes and per-extension stats across GitHub
    /// users
    Github {
        /// Output path for the JSON artifact
        #[arg(short, long, default_value = "public/data/github-contributions.json")]
        out: PathBuf,

        #[command(flatten)]
        opts: RunOptions,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("contribstats=info,contribstats_cli=info"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Azdo { out, opts } => run_azdo(&out, &opts).await,
        Commands::Github { out, opts } => run_github(&out, &opts).await,
    }
}

fn pager(opts: &RunOptions) -> Pager {
    Pager::with_max_pages(opts.max_pages)
}

async fn run_azdo(out: &std::path::Path, opts: &RunOptions) -> ExitCode {
    let identities = identity::resolve_azdo_from_env();
    if identities.is_empty() {
        tracing::error!(
            "no usable Azure DevOps identities configured; set {} / {} / {}",
            identity::AZDO_ORG,
            identity::AZDO_TOKEN,
            identity::AZDO_EMAIL
        );
        return ExitCode::FAILURE;
    }

    let since = Utc::now() - Duration::days(opts.lookback_days);
    tracing::info!(
        identities = identities.len(),
        lookback_days = opts.lookback_days,
        "aggregating repository-host contributions"
    );

    let totals = azdo::aggregate_identities(&identities, since, pager(opts)).await;
    log_summary("azdo", &totals);

    let report = AggregateReport::from_repo_host(&totals, Utc::now());
    if let Err(e) = report.write_to(out) {
        tracing::error!(path = %out.display(), error = %e, "failed to write artifact");
        return ExitCode::FAILURE;
    }
    tracing::info!(path = %out.display(), "artifact written");
    ExitCode::SUCCESS
}

async fn run_github(out: &std::path::Path, opts: &RunOptions) -> ExitCode {
    let identities = identity::resolve_github_from_env();
    if identities.is_empty() {
        tracing::error!(
            "no usable GitHub identities configured; set {} and {}",
            identity::GITHUB_TOKEN,
            identity::GITHUB_USER
        );
        return ExitCode::FAILURE;
    }

    let since = Utc::now() - Duration::days(opts.lookback_days);
    tracing::info!(
        identities = identities.len(),
        lookback_days = opts.lookback_days,
        "aggregating source-host contributions"
    );

    let (totals, extensions) = github::aggregate_identities(&identities, since, pager(opts)).await;
    log_summary("github", &totals);

    let report = AggregateReport::from_source_host(&totals, extensions, Utc::now());
    if let Err(e) = report.write_to(out) {
        tracing::error!(path = %out.display(), error = %e, "failed to write artifact");
        return ExitCode::FAILURE;
    }
    tracing::info!(path = %out.display(), "artifact written");
    ExitCode::SUCCESS
}
