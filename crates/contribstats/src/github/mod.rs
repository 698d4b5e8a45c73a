//! Source-host pipeline: usernames → non-fork repositories → commits →
//! commit detail, with a global per-extension breakdown.
//!
//! # Module Structure
//!
//! - [`error`] - Error types for the source-host API
//! - [`types`] - API response data structures
//! - [`client`] - Authenticated client and endpoint routes
//! - [`aggregate`] - Traversal and per-day accumulation

mod aggregate;
mod client;
mod error;
mod types;

pub use aggregate::{aggregate_identities, aggregate_identity, TraversalSummary};
pub use client::{GithubClient, API_VERSION, DEFAULT_HOST};
pub use error::{short_error_message, GithubError};
pub use types::{CommitAuthor, CommitDetail, CommitFile, CommitListItem, CommitMeta, CommitStats, Repo};
