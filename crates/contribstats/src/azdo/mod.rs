//! Repository-host pipeline: organizations → projects → repositories →
//! commits and completed pull requests.
//!
//! # Module Structure
//!
//! - [`error`] - Error types for the repository-host API
//! - [`types`] - API response data structures
//! - [`client`] - Authenticated client and endpoint routes
//! - [`aggregate`] - Traversal and per-day accumulation

mod aggregate;
mod client;
mod error;
mod types;

pub use aggregate::{aggregate_identities, aggregate_identity, TraversalSummary};
pub use client::{AzdoClient, API_VERSION, DEFAULT_HOST};
pub use error::{short_error_message, AzdoError};
pub use types::{
    ChangeCounts, CommitChanges, GitCommit, GitRepository, GitUserDate, IdentityRef, ListEnvelope,
    Project, PullRequest,
};
