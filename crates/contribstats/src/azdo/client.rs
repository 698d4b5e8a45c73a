//! Repository-host API client.
//!
//! Authenticates with basic auth: empty username, personal access token as
//! the password. All listing endpoints return the `{count, value}` envelope.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use super::error::AzdoError;
use super::types::{
    ChangeCounts, CommitChanges, GitCommit, GitRepository, ListEnvelope, Project, PullRequest,
};
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpRequest, HttpTransport};
use crate::page::Pager;

/// API version sent with every request.
pub const API_VERSION: &str = "7.0";

/// Base host for organization APIs.
pub const DEFAULT_HOST: &str = "https://dev.azure.com";

const USER_AGENT: &str = "contribstats";

/// Client scoped to one organization and one access token.
#[derive(Clone)]
pub struct AzdoClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    auth_header: String,
    pager: Pager,
}

impl AzdoClient {
    /// Create a client with the default reqwest transport.
    pub fn new(organization: &str, token: &str, pager: Pager) -> Result<Self, AzdoError> {
        let transport = ReqwestTransport::with_timeout(StdDuration::from_secs(30))?;
        Ok(Self::with_transport(
            organization,
            token,
            pager,
            Arc::new(transport),
        ))
    }

    pub fn with_transport(
        organization: &str,
        token: &str,
        pager: Pager,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(format!(":{token}"));
        Self {
            transport,
            base_url: format!("{DEFAULT_HOST}/{organization}"),
            auth_header: format!("Basic {encoded}"),
            pager,
        }
    }

    /// Make an authenticated GET request and decode the JSON body.
    async fn get<T: DeserializeOwned>(&self, url: String) -> Result<T, AzdoError> {
        let request = HttpRequest {
            url,
            headers: vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("User-Agent".to_string(), USER_AGENT.to_string()),
                ("Authorization".to_string(), self.auth_header.clone()),
            ],
        };

        let response = self.transport.get(request).await?;

        if !(200..300).contains(&response.status) {
            let message = String::from_utf8_lossy(&response.body).to_string();
            return Err(AzdoError::Api {
                status: response.status,
                message,
            });
        }

        serde_json::from_slice(&response.body).map_err(AzdoError::Json)
    }

    pub(crate) fn projects_url(&self) -> String {
        format!("{}/_apis/projects?api-version={API_VERSION}", self.base_url)
    }

    pub(crate) fn repositories_url(&self, project_id: &str) -> String {
        format!(
            "{}/{project_id}/_apis/git/repositories?api-version={API_VERSION}",
            self.base_url
        )
    }

    pub(crate) fn commits_url(
        &self,
        project_id: &str,
        repo_id: &str,
        author_email: &str,
        since: DateTime<Utc>,
        page: u32,
    ) -> String {
        let skip = (page - 1) * self.pager.page_size;
        format!(
            "{}/{project_id}/_apis/git/repositories/{repo_id}/commits\
             ?searchCriteria.author={author_email}\
             &searchCriteria.fromDate={}\
             &searchCriteria.$top={}\
             &searchCriteria.$skip={skip}\
             &api-version={API_VERSION}",
            self.base_url,
            since.format("%Y-%m-%dT%H:%M:%SZ"),
            self.pager.page_size,
        )
    }

    pub(crate) fn commit_changes_url(
        &self,
        project_id: &str,
        repo_id: &str,
        commit_id: &str,
    ) -> String {
        format!(
            "{}/{project_id}/_apis/git/repositories/{repo_id}/commits/{commit_id}/changes\
             ?api-version={API_VERSION}",
            self.base_url
        )
    }

    pub(crate) fn pull_requests_url(&self, project_id: &str, repo_id: &str, page: u32) -> String {
        let skip = (page - 1) * self.pager.page_size;
        format!(
            "{}/{project_id}/_apis/git/repositories/{repo_id}/pullrequests\
             ?searchCriteria.status=completed\
             &$top={}\
             &$skip={skip}\
             &api-version={API_VERSION}",
            self.base_url, self.pager.page_size,
        )
    }

    /// List the organization's projects.
    pub async fn list_projects(&self) -> Result<Vec<Project>, AzdoError> {
        let envelope: ListEnvelope<Project> = self.get(self.projects_url()).await?;
        Ok(envelope.value)
    }

    /// List a project's Git repositories.
    pub async fn list_repositories(&self, project_id: &str) -> Result<Vec<GitRepository>, AzdoError> {
        let envelope: ListEnvelope<GitRepository> =
            self.get(self.repositories_url(project_id)).await?;
        Ok(envelope.value)
    }

    /// List commits authored by `author_email` since `since`, walking pages
    /// up to the configured ceiling.
    pub async fn list_commits(
        &self,
        project_id: &str,
        repo_id: &str,
        author_email: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<GitCommit>, AzdoError> {
        self.pager
            .collect(|page| {
                let url = self.commits_url(project_id, repo_id, author_email, since, page);
                async move {
                    let envelope: ListEnvelope<GitCommit> = self.get(url).await?;
                    Ok(envelope.value)
                }
            })
            .await
    }

    /// Fetch the line-change summary for one commit.
    pub async fn get_commit_changes(
        &self,
        project_id: &str,
        repo_id: &str,
        commit_id: &str,
    ) -> Result<ChangeCounts, AzdoError> {
        let changes: CommitChanges = self
            .get(self.commit_changes_url(project_id, repo_id, commit_id))
            .await?;
        Ok(changes.change_counts.unwrap_or_default())
    }

    /// List completed pull requests, walking pages up to the configured
    /// ceiling. Author and merge-status filtering happens in the caller;
    /// the completed-status filter alone still includes abandoned merges.
    pub async fn list_completed_pull_requests(
        &self,
        project_id: &str,
        repo_id: &str,
    ) -> Result<Vec<PullRequest>, AzdoError> {
        self.pager
            .collect(|page| {
                let url = self.pull_requests_url(project_id, repo_id, page);
                async move {
                    let envelope: ListEnvelope<PullRequest> = self.get(url).await?;
                    Ok(envelope.value)
                }
            })
            .await
    }
}
