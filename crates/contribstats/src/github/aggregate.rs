//! Traversal and accumulation for the source-host pipeline.
//!
//! Walks repositories → commits → commit detail for one username. Every
//! changed file feeds the global extension table; the per-day line totals
//! additionally pass through an exclusion filter that keeps generated,
//! lock, and minified files out.

use chrono::{DateTime, Utc};

use super::client::GithubClient;
use super::error::{short_error_message, GithubError};
use crate::identity::GithubIdentity;
use crate::page::Pager;
use crate::stats::{DailyTotals, ExtensionTable};

/// What one identity's traversal actually covered.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TraversalSummary {
    pub repos: usize,
    pub repos_skipped: usize,
    pub commits: u64,
    /// Commits whose detail could not be fetched; they contribute nothing.
    pub details_failed: u64,
}

/// Filenames whose line counts are excluded from the per-day totals
/// (they still feed the extension table). Matched on the lower-cased
/// basename.
fn is_excluded_filename(filename: &str) -> bool {
    let basename = filename
        .rsplit('/')
        .next()
        .unwrap_or(filename)
        .to_ascii_lowercase();

    const SUFFIXES: [&str; 5] = [".json", ".lock", ".map", ".min.js", ".min.css"];
    const NAMES: [&str; 2] = ["pnpm-lock.yaml", "go.sum"];

    SUFFIXES.iter().any(|s| basename.ends_with(s)) || NAMES.contains(&basename.as_str())
}

/// Aggregate one identity's contributions into `totals` and `extensions`.
///
/// Only a failure to list the user's repositories is returned as an error;
/// everything deeper is logged and skipped.
pub async fn aggregate_identity(
    client: &GithubClient,
    identity: &GithubIdentity,
    since: DateTime<Utc>,
    totals: &mut DailyTotals,
    extensions: &mut ExtensionTable,
) -> Result<TraversalSummary, GithubError> {
    let mut summary = TraversalSummary::default();
    let user = identity.username.as_str();

    let repos = client.list_user_repos(user).await?;

    for repo in repos.iter().filter(|r| !r.fork) {
        let commits = match client.list_commits(user, &repo.name, since).await {
            Ok(commits) => commits,
            Err(e) => {
                summary.repos_skipped += 1;
                tracing::warn!(
                    username = user,
                    repo = %repo.name,
                    error = %short_error_message(&e),
                    "skipping repository commits"
                );
                continue;
            }
        };
        summary.repos += 1;

        for item in &commits {
            let Some(author) = &item.commit.author else {
                tracing::debug!(
                    username = user,
                    repo = %repo.name,
                    commit = %item.sha,
                    "commit has no author date"
                );
                continue;
            };
            let date = author.date.date_naive();
            summary.commits += 1;
            totals.add_commit(date);

            let detail = match client.get_commit(user, &repo.name, &item.sha).await {
                Ok(Some(detail)) => detail,
                Ok(None) => {
                    summary.details_failed += 1;
                    continue;
                }
                Err(e) => {
                    summary.details_failed += 1;
                    tracing::debug!(
                        username = user,
                        repo = %repo.name,
                        commit = %item.sha,
                        error = %short_error_message(&e),
                        "commit detail unavailable"
                    );
                    continue;
                }
            };

            match detail.files.as_deref() {
                Some(files) if !files.is_empty() => {
                    for file in files {
                        extensions.add_file(&file.filename, file.additions, file.deletions);
                        if !is_excluded_filename(&file.filename) {
                            totals.add_lines(date, file.additions, file.deletions);
                        }
                    }
                }
                // No per-file list: fall back to the aggregate counts with
                // no extension attribution.
                _ => {
                    if let Some(stats) = detail.stats {
                        totals.add_lines(date, stats.additions, stats.deletions);
                    }
                }
            }
        }
    }

    Ok(summary)
}

/// Run the full source-host pipeline across every identity, merging day
/// totals and extension tables additively. A failing identity is logged
/// and skipped.
pub async fn aggregate_identities(
    identities: &[GithubIdentity],
    since: DateTime<Utc>,
    pager: Pager,
) -> (DailyTotals, ExtensionTable) {
    let mut totals = DailyTotals::new();
    let mut extensions = ExtensionTable::new();

    for identity in identities {
        let client = match GithubClient::new(&identity.token, pager) {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(
                    username = %identity.username,
                    error = %e,
                    "skipping user: client construction failed"
                );
                continue;
            }
        };

        match aggregate_identity(&client, identity, since, &mut totals, &mut extensions).await {
            Ok(summary) => {
                tracing::info!(
                    username = %identity.username,
                    repos = summary.repos,
                    repos_skipped = summary.repos_skipped,
                    commits = summary.commits,
                    "user aggregated"
                );
            }
            Err(e) => {
                tracing::warn!(
                    username = %identity.username,
                    error = %short_error_message(&e),
                    "skipping user"
                );
            }
        }
    }

    (totals, extensions)
}
