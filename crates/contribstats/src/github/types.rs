//! Source-host API data types.
//!
//! Deserialize-only structs carrying just the fields the aggregation needs.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A repository owned by a user.
#[derive(Debug, Clone, Deserialize)]
pub struct Repo {
    pub name: String,
    #[serde(default)]
    pub fork: bool,
}

/// One entry of the commit-listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitListItem {
    pub sha: String,
    pub commit: CommitMeta,
}

/// Git-level metadata nested under a listed commit.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitMeta {
    #[serde(default)]
    pub author: Option<CommitAuthor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitAuthor {
    pub date: DateTime<Utc>,
}

/// Full commit detail, including per-file changes when the API exposes
/// them.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    pub sha: String,
    #[serde(default)]
    pub stats: Option<CommitStats>,
    #[serde(default)]
    pub files: Option<Vec<CommitFile>>,
}

/// Aggregate line counts for a whole commit.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct CommitStats {
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}

/// One changed file within a commit.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitFile {
    pub filename: String,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}
