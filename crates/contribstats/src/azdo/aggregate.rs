//! Traversal and accumulation for the repository-host pipeline.
//!
//! Walks projects → repositories → commits/pull requests for one identity,
//! folding into a caller-owned [`DailyTotals`]. Failures are caught at the
//! narrowest feasible scope: a failed project or repository listing skips
//! that subtree, a failed commit-detail fetch still counts the commit, and
//! nothing propagates past the identity boundary except a failure to list
//! projects at all.

use chrono::{DateTime, Utc};

use super::client::AzdoClient;
use super::error::{short_error_message, AzdoError};
use super::types::ChangeCounts;
use crate::identity::AzdoIdentity;
use crate::page::Pager;
use crate::stats::{ChangeSummary, DailyTotals};

/// What one identity's traversal actually covered, so callers can tell a
/// skipped repository apart from one that counted zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TraversalSummary {
    pub projects: usize,
    pub repos: usize,
    pub repos_skipped: usize,
    pub commits: u64,
    pub prs: u64,
    /// Commits whose change summary could not be fetched; they still count.
    pub details_failed: u64,
}

impl From<ChangeCounts> for ChangeSummary {
    fn from(counts: ChangeCounts) -> Self {
        Self {
            add: counts.add,
            edit: counts.edit,
            delete: counts.delete,
        }
    }
}

/// Aggregate one identity's contributions into `totals`.
///
/// Only a failure to list the organization's projects is returned as an
/// error; everything deeper is logged and skipped.
pub async fn aggregate_identity(
    client: &AzdoClient,
    identity: &AzdoIdentity,
    since: DateTime<Utc>,
    totals: &mut DailyTotals,
) -> Result<TraversalSummary, AzdoError> {
    let mut summary = TraversalSummary::default();
    let org = identity.organization.as_str();

    let projects = client.list_projects().await?;

    for project in &projects {
        let repos = match client.list_repositories(&project.id).await {
            Ok(repos) => repos,
            Err(e) => {
                tracing::warn!(
                    organization = org,
                    project = %project.name,
                    error = %short_error_message(&e),
                    "skipping project: repository listing failed"
                );
                continue;
            }
        };
        summary.projects += 1;

        for repo in &repos {
            match client
                .list_commits(&project.id, &repo.id, &identity.author_email, since)
                .await
            {
                Ok(commits) => {
                    summary.repos += 1;
                    summary.commits += commits.len() as u64;
                    for commit in &commits {
                        let date = commit.author.date.date_naive();
                        totals.add_commit(date);

                        match client
                            .get_commit_changes(&project.id, &repo.id, &commit.commit_id)
                            .await
                        {
                            Ok(counts) => totals.add_change_summary(date, counts.into()),
                            Err(e) => {
                                // Best-effort enrichment; the commit already counted.
                                summary.details_failed += 1;
                                tracing::debug!(
                                    organization = org,
                                    repo = %repo.name,
                                    commit = %commit.commit_id,
                                    error = %short_error_message(&e),
                                    "commit change summary unavailable"
                                );
                            }
                        }
                    }
                }
                Err(e) => {
                    summary.repos_skipped += 1;
                    tracing::warn!(
                        organization = org,
                        project = %project.name,
                        repo = %repo.name,
                        error = %short_error_message(&e),
                        "skipping repository commits"
                    );
                }
            }

            // PRs are a best-effort addition on top of the commit signal.
            match client.list_completed_pull_requests(&project.id, &repo.id).await {
                Ok(prs) => {
                    for pr in &prs {
                        if pr.creation_date < since {
                            continue;
                        }
                        if pr.status != "completed" {
                            continue;
                        }
                        if pr.merge_status.as_deref() != Some("succeeded") {
                            continue;
                        }
                        let authored = pr
                            .created_by
                            .unique_name
                            .as_deref()
                            .is_some_and(|name| name.eq_ignore_ascii_case(&identity.author_email));
                        if !authored {
                            continue;
                        }
                        let Some(closed) = pr.closed_date else {
                            tracing::debug!(
                                organization = org,
                                repo = %repo.name,
                                pull_request = pr.pull_request_id,
                                "completed pull request has no closed date"
                            );
                            continue;
                        };
                        totals.add_pr(closed.date_naive());
                        summary.prs += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        organization = org,
                        project = %project.name,
                        repo = %repo.name,
                        error = %short_error_message(&e),
                        "skipping repository pull requests"
                    );
                }
            }
        }
    }

    Ok(summary)
}

/// Run the full repository-host pipeline across every identity, merging by
/// date. A failing identity is logged and skipped; whatever accumulated so
/// far is kept.
pub async fn aggregate_identities(
    identities: &[AzdoIdentity],
    since: DateTime<Utc>,
    pager: Pager,
) -> DailyTotals {
    let mut totals = DailyTotals::new();

    for identity in identities {
        let client = match AzdoClient::new(&identity.organization, &identity.token, pager) {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(
                    organization = %identity.organization,
                    error = %e,
                    "skipping organization: client construction failed"
                );
                continue;
            }
        };

        match aggregate_identity(&client, identity, since, &mut totals).await {
            Ok(summary) => {
                tracing::info!(
                    organization = %identity.organization,
                    projects = summary.projects,
                    repos = summary.repos,
                    repos_skipped = summary.repos_skipped,
                    commits = summary.commits,
                    prs = summary.prs,
                    "organization aggregated"
                );
            }
            Err(e) => {
                tracing::warn!(
                    organization = %identity.organization,
                    error = %short_error_message(&e),
                    "skipping organization"
                );
            }
        }
    }

    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockTransport;
    use chrono::NaiveDate;
    use std::sync::Arc;

    const EMAIL: &str = "dev@acme.test";

    fn identity() -> AzdoIdentity {
        AzdoIdentity {
            organization: "acme".to_string(),
            token: "pat".to_string(),
            author_email: EMAIL.to_string(),
        }
    }

    fn client(transport: &MockTransport) -> AzdoClient {
        AzdoClient::with_transport("acme", "pat", Pager::default(), Arc::new(transport.clone()))
    }

    fn since() -> DateTime<Utc> {
        "2024-01-01T00:00:00Z".parse().unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn commit_json(id: &str, when: &str) -> String {
        format!(
            r#"{{"commitId": "{id}", "author": {{"email": "{EMAIL}", "date": "{when}"}}}}"#
        )
    }

    fn envelope(items: &[String]) -> String {
        format!(r#"{{"count": {}, "value": [{}]}}"#, items.len(), items.join(","))
    }

    fn push_single_project_repo(transport: &MockTransport, client: &AzdoClient) {
        transport.push_json(
            client.projects_url(),
            r#"{"count": 1, "value": [{"id": "p1", "name": "Main"}]}"#,
        );
        transport.push_json(
            client.repositories_url("p1"),
            r#"{"count": 1, "value": [{"id": "r1", "name": "site"}]}"#,
        );
    }

    fn changes_json(add: u64, edit: u64, delete: u64) -> String {
        format!(
            r#"{{"changeCounts": {{"Add": {add}, "Edit": {edit}, "Delete": {delete}}}}}"#
        )
    }

    #[tokio::test]
    async fn commits_and_merged_prs_fold_into_one_day() {
        let transport = MockTransport::new();
        let client = client(&transport);
        push_single_project_repo(&transport, &client);

        transport.push_json(
            client.commits_url("p1", "r1", EMAIL, since(), 1),
            &envelope(&[
                commit_json("c1", "2024-03-01T09:00:00Z"),
                commit_json("c2", "2024-03-01T17:00:00Z"),
            ]),
        );
        transport.push_json(
            client.commit_changes_url("p1", "r1", "c1"),
            &changes_json(10, 1, 2),
        );
        transport.push_json(
            client.commit_changes_url("p1", "r1", "c2"),
            &changes_json(5, 0, 0),
        );
        transport.push_json(
            client.pull_requests_url("p1", "r1", 1),
            &envelope(&[format!(
                r#"{{"pullRequestId": 9, "status": "completed", "mergeStatus": "succeeded",
                    "createdBy": {{"uniqueName": "DEV@ACME.TEST"}},
                    "creationDate": "2024-02-20T10:00:00Z",
                    "closedDate": "2024-03-01T18:00:00Z"}}"#
            )]),
        );

        let mut totals = DailyTotals::new();
        let summary = aggregate_identity(&client, &identity(), since(), &mut totals)
            .await
            .unwrap();

        let day = totals.get(&date("2024-03-01")).unwrap();
        assert_eq!(day.count, 3);
        assert_eq!(day.prs, 1);
        assert_eq!(day.lines_added, 16);
        assert_eq!(day.lines_deleted, 3);

        assert_eq!(summary.commits, 2);
        assert_eq!(summary.prs, 1);
        assert_eq!(summary.repos, 1);
        assert_eq!(summary.repos_skipped, 0);
    }

    #[tokio::test]
    async fn non_merged_or_foreign_completed_prs_are_excluded() {
        let transport = MockTransport::new();
        let client = client(&transport);
        push_single_project_repo(&transport, &client);

        transport.push_json(
            client.commits_url("p1", "r1", EMAIL, since(), 1),
            &envelope(&[]),
        );
        transport.push_json(
            client.pull_requests_url("p1", "r1", 1),
            &envelope(&[
                // Completed but the merge did not succeed.
                format!(
                    r#"{{"pullRequestId": 1, "status": "completed", "mergeStatus": "conflicts",
                        "createdBy": {{"uniqueName": "{EMAIL}"}},
                        "creationDate": "2024-02-01T00:00:00Z",
                        "closedDate": "2024-02-02T00:00:00Z"}}"#
                ),
                // Merged, but by someone else.
                format!(
                    r#"{{"pullRequestId": 2, "status": "completed", "mergeStatus": "succeeded",
                        "createdBy": {{"uniqueName": "other@acme.test"}},
                        "creationDate": "2024-02-01T00:00:00Z",
                        "closedDate": "2024-02-02T00:00:00Z"}}"#
                ),
                // Created before the look-back window.
                format!(
                    r#"{{"pullRequestId": 3, "status": "completed", "mergeStatus": "succeeded",
                        "createdBy": {{"uniqueName": "{EMAIL}"}},
                        "creationDate": "2023-06-01T00:00:00Z",
                        "closedDate": "2024-02-02T00:00:00Z"}}"#
                ),
            ]),
        );

        let mut totals = DailyTotals::new();
        let summary = aggregate_identity(&client, &identity(), since(), &mut totals)
            .await
            .unwrap();

        assert!(totals.is_empty());
        assert_eq!(summary.prs, 0);
    }

    #[tokio::test]
    async fn failed_commit_detail_still_counts_the_commit_and_continues() {
        let transport = MockTransport::new();
        let client = client(&transport);
        push_single_project_repo(&transport, &client);

        transport.push_json(
            client.commits_url("p1", "r1", EMAIL, since(), 1),
            &envelope(&[
                commit_json("c1", "2024-04-10T09:00:00Z"),
                commit_json("c2", "2024-04-10T10:00:00Z"),
            ]),
        );
        // c1's detail fetch fails server-side; c2's succeeds.
        transport.push_status(client.commit_changes_url("p1", "r1", "c1"), 500);
        transport.push_json(
            client.commit_changes_url("p1", "r1", "c2"),
            &changes_json(4, 0, 1),
        );
        transport.push_json(client.pull_requests_url("p1", "r1", 1), &envelope(&[]));

        let mut totals = DailyTotals::new();
        let summary = aggregate_identity(&client, &identity(), since(), &mut totals)
            .await
            .unwrap();

        let day = totals.get(&date("2024-04-10")).unwrap();
        assert_eq!(day.count, 2);
        assert_eq!(day.lines_added, 4);
        assert_eq!(day.lines_deleted, 1);
        assert_eq!(summary.details_failed, 1);
    }

    #[tokio::test]
    async fn failed_repo_commit_listing_is_skipped_and_siblings_proceed() {
        let transport = MockTransport::new();
        let client = client(&transport);

        transport.push_json(
            client.projects_url(),
            r#"{"count": 1, "value": [{"id": "p1", "name": "Main"}]}"#,
        );
        transport.push_json(
            client.repositories_url("p1"),
            r#"{"count": 2, "value": [
                {"id": "r1", "name": "broken"},
                {"id": "r2", "name": "healthy"}
            ]}"#,
        );

        transport.push_status(client.commits_url("p1", "r1", EMAIL, since(), 1), 503);
        transport.push_json(client.pull_requests_url("p1", "r1", 1), &envelope(&[]));

        transport.push_json(
            client.commits_url("p1", "r2", EMAIL, since(), 1),
            &envelope(&[commit_json("c9", "2024-05-05T12:00:00Z")]),
        );
        transport.push_json(
            client.commit_changes_url("p1", "r2", "c9"),
            &changes_json(1, 0, 0),
        );
        transport.push_json(client.pull_requests_url("p1", "r2", 1), &envelope(&[]));

        let mut totals = DailyTotals::new();
        let summary = aggregate_identity(&client, &identity(), since(), &mut totals)
            .await
            .unwrap();

        assert_eq!(summary.repos_skipped, 1);
        assert_eq!(summary.repos, 1);
        assert_eq!(totals.get(&date("2024-05-05")).unwrap().count, 1);
    }

    #[tokio::test]
    async fn failed_pr_listing_is_swallowed() {
        let transport = MockTransport::new();
        let client = client(&transport);
        push_single_project_repo(&transport, &client);

        transport.push_json(
            client.commits_url("p1", "r1", EMAIL, since(), 1),
            &envelope(&[commit_json("c1", "2024-06-01T08:00:00Z")]),
        );
        transport.push_json(
            client.commit_changes_url("p1", "r1", "c1"),
            &changes_json(2, 0, 0),
        );
        transport.push_status(client.pull_requests_url("p1", "r1", 1), 500);

        let mut totals = DailyTotals::new();
        let summary = aggregate_identity(&client, &identity(), since(), &mut totals)
            .await
            .unwrap();

        assert_eq!(totals.get(&date("2024-06-01")).unwrap().count, 1);
        assert_eq!(summary.prs, 0);
    }

    #[tokio::test]
    async fn project_listing_failure_aborts_the_identity() {
        let transport = MockTransport::new();
        let client = client(&transport);
        transport.push_status(client.projects_url(), 401);

        let mut totals = DailyTotals::new();
        let err = aggregate_identity(&client, &identity(), since(), &mut totals)
            .await
            .unwrap_err();

        assert!(matches!(err, AzdoError::Api { status: 401, .. }));
        assert!(totals.is_empty());
    }
}
