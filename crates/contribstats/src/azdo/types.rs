//! Repository-host API data types.
//!
//! Deserialize-only structs carrying just the fields the aggregation needs,
//! which keeps the code resilient to API additions.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Standard list envelope: `{ "count": N, "value": [...] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListEnvelope<T> {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

/// A project within an organization.
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

/// A Git repository within a project.
#[derive(Debug, Clone, Deserialize)]
pub struct GitRepository {
    pub id: String,
    pub name: String,
}

/// A commit as returned by the commit-listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GitCommit {
    #[serde(rename = "commitId")]
    pub commit_id: String,
    pub author: GitUserDate,
}

/// Author attribution on a commit.
#[derive(Debug, Clone, Deserialize)]
pub struct GitUserDate {
    #[serde(default)]
    pub email: Option<String>,
    pub date: DateTime<Utc>,
}

/// Line-change counts for one commit, as reported by the changes endpoint.
///
/// The API reports edits as a single undifferentiated count; the
/// accumulator treats each edit as one addition plus one deletion.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct ChangeCounts {
    #[serde(rename = "Add", default)]
    pub add: u64,
    #[serde(rename = "Edit", default)]
    pub edit: u64,
    #[serde(rename = "Delete", default)]
    pub delete: u64,
}

/// Response of the commit changes endpoint; only the summary counts are
/// used.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitChanges {
    #[serde(rename = "changeCounts", default)]
    pub change_counts: Option<ChangeCounts>,
}

/// A pull request as returned by the PR-listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    #[serde(rename = "pullRequestId")]
    pub pull_request_id: u64,
    pub status: String,
    /// "succeeded" for merged PRs; completed-but-abandoned merges report
    /// other values and must be filtered out.
    #[serde(rename = "mergeStatus", default)]
    pub merge_status: Option<String>,
    #[serde(rename = "createdBy")]
    pub created_by: IdentityRef,
    #[serde(rename = "creationDate")]
    pub creation_date: DateTime<Utc>,
    #[serde(rename = "closedDate", default)]
    pub closed_date: Option<DateTime<Utc>>,
}

/// Minimal author reference on a pull request.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityRef {
    #[serde(rename = "uniqueName", default)]
    pub unique_name: Option<String>,
}
