//! Final aggregation artifact and JSON writer.
//!
//! The artifact is rebuilt from scratch on every run and fully overwrites
//! the previous file. Field names are camelCase because the file is read
//! directly by a JavaScript frontend.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::stats::{DailyTotals, ExtensionStat, ExtensionTable};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// One serialized contribution day.
///
/// `count` and `prs` are only present in the repository-host artifact; the
/// source-host artifact carries line totals only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionDay {
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prs: Option<u64>,
    pub lines_added: u64,
    pub lines_deleted: u64,
}

/// The final aggregation result written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    pub updated_at: DateTime<Utc>,
    pub total_lines_added: u64,
    pub total_lines_deleted: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension_stats: Option<BTreeMap<String, ExtensionStat>>,
    pub contributions: Vec<ContributionDay>,
}

impl AggregateReport {
    /// Build the repository-host artifact: per-day commit/PR counts plus
    /// line totals.
    #[must_use]
    pub fn from_repo_host(totals: &DailyTotals, updated_at: DateTime<Utc>) -> Self {
        let (_, _, added, deleted) = totals.totals();
        Self {
            updated_at,
            total_lines_added: added,
            total_lines_deleted: deleted,
            extension_stats: None,
            contributions: totals
                .iter()
                .map(|(date, stat)| ContributionDay {
                    date: *date,
                    count: Some(stat.count),
                    prs: Some(stat.prs),
                    lines_added: stat.lines_added,
                    lines_deleted: stat.lines_deleted,
                })
                .collect(),
        }
    }

    /// Build the source-host artifact: per-day line totals plus the global
    /// extension breakdown.
    #[must_use]
    pub fn from_source_host(
        totals: &DailyTotals,
        extensions: ExtensionTable,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let (_, _, added, deleted) = totals.totals();
        Self {
            updated_at,
            total_lines_added: added,
            total_lines_deleted: deleted,
            extension_stats: Some(extensions.into_map()),
            contributions: totals
                .iter()
                .map(|(date, stat)| ContributionDay {
                    date: *date,
                    count: None,
                    prs: None,
                    lines_added: stat.lines_added,
                    lines_deleted: stat.lines_deleted,
                })
                .collect(),
        }
    }

    /// Pretty-print the report as JSON and write it to `path`, creating
    /// parent directories and replacing any previous artifact.
    pub fn write_to(&self, path: &Path) -> Result<(), ReportError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_vec_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Log a one-line summary of what a run accumulated.
pub fn log_summary(label: &str, totals: &DailyTotals) {
    let (count, prs, added, deleted) = totals.totals();
    tracing::info!(
        pipeline = label,
        days = totals.len(),
        contributions = count,
        prs,
        lines_added = added,
        lines_deleted = deleted,
        "aggregation complete"
    );
}
