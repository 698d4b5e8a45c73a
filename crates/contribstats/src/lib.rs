//! Contribstats - per-day code-contribution aggregation.
//!
//! Two independent, structurally identical pipelines poll hosted-Git REST
//! APIs and fold the results into a date-keyed accumulator, then write a
//! JSON artifact:
//!
//! - [`azdo`] walks organizations → projects → repositories → commits and
//!   completed pull requests, accumulating per-day counts and line totals.
//! - [`github`] walks usernames → non-fork repositories → commits →
//!   commit detail, accumulating per-day line totals plus a global
//!   per-file-extension breakdown.
//!
//! Both are best-effort one-shot collectors: sequential requests, no
//! retries, no caching, and failures caught at the narrowest feasible
//! scope so a run always writes whatever it managed to accumulate.
//!
//! # Example
//!
//! ```ignore
//! use chrono::{Duration, Utc};
//! use contribstats::{identity, azdo, report::AggregateReport, page::Pager};
//!
//! let identities = identity::resolve_azdo_from_env();
//! let since = Utc::now() - Duration::days(365);
//! let totals = azdo::aggregate_identities(&identities, since, Pager::default()).await;
//! let report = AggregateReport::from_repo_host(&totals, Utc::now());
//! report.write_to("public/data/azdo-contributions.json".as_ref())?;
//! ```

pub mod azdo;
pub mod github;
pub mod http;
pub mod identity;
pub mod page;
pub mod report;
pub mod stats;

pub use identity::{AzdoIdentity, GithubIdentity};
pub use page::Pager;
pub use report::{AggregateReport, ContributionDay, ReportError};
pub use stats::{ChangeSummary, DailyTotals, DayStat, ExtensionStat, ExtensionTable};
