//! Date-keyed contribution accumulators.
//!
//! All accumulation is additive and commutative: folding the same items in
//! any order, or merging per-identity accumulators in any order, produces
//! the same totals. Day keys are derived from the upstream timestamp's
//! reported offset converted to UTC, then truncated to the calendar date.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

/// Per-day contribution totals.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DayStat {
    /// Commits plus merged pull requests.
    pub count: u64,
    /// Merged pull requests only.
    pub prs: u64,
    pub lines_added: u64,
    pub lines_deleted: u64,
}

/// A commit's line-change summary as reported by the upstream API.
///
/// An `edit` is an in-place modification the API does not split into an
/// addition and a deletion, so it contributes to both totals.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChangeSummary {
    pub add: u64,
    pub edit: u64,
    pub delete: u64,
}

/// Date-keyed accumulator for one run.
///
/// Backed by a `BTreeMap` so iteration (and therefore the serialized
/// contribution list) is date-ascending.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DailyTotals {
    days: BTreeMap<NaiveDate, DayStat>,
}

impl DailyTotals {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn day_mut(&mut self, date: NaiveDate) -> &mut DayStat {
        self.days.entry(date).or_default()
    }

    /// Record one commit on `date`.
    pub fn add_commit(&mut self, date: NaiveDate) {
        self.day_mut(date).count += 1;
    }

    /// Record one merged pull request closed on `date`.
    pub fn add_pr(&mut self, date: NaiveDate) {
        let day = self.day_mut(date);
        day.count += 1;
        day.prs += 1;
    }

    /// Add raw line counts to `date`.
    pub fn add_lines(&mut self, date: NaiveDate, added: u64, deleted: u64) {
        let day = self.day_mut(date);
        day.lines_added += added;
        day.lines_deleted += deleted;
    }

    /// Add a commit's change summary to `date`, counting each edit as one
    /// addition and one deletion.
    pub fn add_change_summary(&mut self, date: NaiveDate, changes: ChangeSummary) {
        self.add_lines(date, changes.add + changes.edit, changes.delete + changes.edit);
    }

    /// Merge another accumulator into this one, summing per-day stats.
    pub fn merge(&mut self, other: DailyTotals) {
        for (date, stat) in other.days {
            let day = self.day_mut(date);
            day.count += stat.count;
            day.prs += stat.prs;
            day.lines_added += stat.lines_added;
            day.lines_deleted += stat.lines_deleted;
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &DayStat)> {
        self.days.iter()
    }

    #[must_use]
    pub fn get(&self, date: &NaiveDate) -> Option<&DayStat> {
        self.days.get(date)
    }

    /// Summed `(commits_and_prs, prs, lines_added, lines_deleted)` across
    /// all days.
    #[must_use]
    pub fn totals(&self) -> (u64, u64, u64, u64) {
        self.days.values().fold((0, 0, 0, 0), |acc, s| {
            (
                acc.0 + s.count,
                acc.1 + s.prs,
                acc.2 + s.lines_added,
                acc.3 + s.lines_deleted,
            )
        })
    }
}

/// Key used for files without an extension.
pub const NO_EXTENSION: &str = "none";

/// Per-extension line totals.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtensionStat {
    pub added: u64,
    pub deleted: u64,
}

/// Global breakdown of line changes by file extension.
///
/// Every processed file feeds this table, including files the per-day
/// exclusion filter keeps out of the date totals.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtensionTable {
    exts: BTreeMap<String, ExtensionStat>,
}

impl ExtensionTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute a file's line counts to its extension.
    pub fn add_file(&mut self, filename: &str, added: u64, deleted: u64) {
        let stat = self.exts.entry(extension_of(filename)).or_default();
        stat.added += added;
        stat.deleted += deleted;
    }

    /// Merge another table into this one, summing per-extension stats.
    pub fn merge(&mut self, other: ExtensionTable) {
        for (ext, stat) in other.exts {
            let entry = self.exts.entry(ext).or_default();
            entry.added += stat.added;
            entry.deleted += stat.deleted;
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exts.is_empty()
    }

    #[must_use]
    pub fn get(&self, ext: &str) -> Option<&ExtensionStat> {
        self.exts.get(ext)
    }

    #[must_use]
    pub fn into_map(self) -> BTreeMap<String, ExtensionStat> {
        self.exts
    }
}

/// Lower-cased extension of `filename`, or [`NO_EXTENSION`] when there is
/// none. The extension is everything after the last `.` in the final path
/// segment, so `.gitignore` maps to `gitignore`.
fn extension_of(filename: &str) -> String {
    let basename = filename.rsplit('/').next().unwrap_or(filename);
    match basename.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext.to_ascii_lowercase(),
        _ => NO_EXTENSION.to_string(),
    }
}
