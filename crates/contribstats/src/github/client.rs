//! Source-host API client.
//!
//! Authenticates with a bearer token and pins the API version via headers.
//! 404 responses resolve to `None` because the traversal probes optional
//! resources (an unknown username is "no data", not a failure).

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use super::error::GithubError;
use super::types::{CommitDetail, CommitListItem, Repo};
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpRequest, HttpTransport};
use crate::page::Pager;

/// Base host for the REST API.
pub const DEFAULT_HOST: &str = "https://api.github.com";

/// API version pinned on every request.
pub const API_VERSION: &str = "2022-11-28";

const ACCEPT: &str = "application/vnd.github+json";
const USER_AGENT: &str = "contribstats";

/// Client scoped to one access token.
#[derive(Clone)]
pub struct GithubClient {
    transport: Arc<dyn HttpTransport>,
    token: String,
    pager: Pager,
}

impl GithubClient {
    /// Create a client with the default reqwest transport.
    pub fn new(token: &str, pager: Pager) -> Result<Self, GithubError> {
        let transport = ReqwestTransport::with_timeout(StdDuration::from_secs(30))?;
        Ok(Self::with_transport(token, pager, Arc::new(transport)))
    }

    pub fn with_transport(token: &str, pager: Pager, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            token: token.to_string(),
            pager,
        }
    }

    /// Make an authenticated GET request. 404 resolves to `Ok(None)`.
    async fn get_opt<T: DeserializeOwned>(&self, url: String) -> Result<Option<T>, GithubError> {
        let request = HttpRequest {
            url,
            headers: vec![
                ("Accept".to_string(), ACCEPT.to_string()),
                ("User-Agent".to_string(), USER_AGENT.to_string()),
                ("X-GitHub-Api-Version".to_string(), API_VERSION.to_string()),
                ("Authorization".to_string(), format!("Bearer {}", self.token)),
            ],
        };

        let response = self.transport.get(request).await?;

        match response.status {
            404 => Ok(None),
            s if (200..300).contains(&s) => {
                let data: T = serde_json::from_slice(&response.body)?;
                Ok(Some(data))
            }
            s => {
                let message = String::from_utf8_lossy(&response.body).to_string();
                Err(GithubError::Api { status: s, message })
            }
        }
    }

    pub(crate) fn user_repos_url(&self, username: &str, page: u32) -> String {
        format!(
            "{DEFAULT_HOST}/users/{username}/repos?type=owner&per_page={}&page={page}",
            self.pager.page_size
        )
    }

    pub(crate) fn commits_url(
        &self,
        username: &str,
        repo: &str,
        since: DateTime<Utc>,
        page: u32,
    ) -> String {
        format!(
            "{DEFAULT_HOST}/repos/{username}/{repo}/commits\
             ?author={username}\
             &since={}\
             &per_page={}\
             &page={page}",
            since.format("%Y-%m-%dT%H:%M:%SZ"),
            self.pager.page_size,
        )
    }

    pub(crate) fn commit_detail_url(&self, username: &str, repo: &str, sha: &str) -> String {
        format!("{DEFAULT_HOST}/repos/{username}/{repo}/commits/{sha}")
    }

    /// List repositories owned by `username`, forks included (callers
    /// filter). An unknown username resolves to an empty list.
    pub async fn list_user_repos(&self, username: &str) -> Result<Vec<Repo>, GithubError> {
        self.pager
            .collect(|page| {
                let url = self.user_repos_url(username, page);
                async move {
                    let repos: Option<Vec<Repo>> = self.get_opt(url).await?;
                    Ok(repos.unwrap_or_default())
                }
            })
            .await
    }

    /// List commits authored by `username` in `repo` since `since`.
    pub async fn list_commits(
        &self,
        username: &str,
        repo: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<CommitListItem>, GithubError> {
        self.pager
            .collect(|page| {
                let url = self.commits_url(username, repo, since, page);
                async move {
                    let commits: Option<Vec<CommitListItem>> = self.get_opt(url).await?;
                    Ok(commits.unwrap_or_default())
                }
            })
            .await
    }

    /// Fetch one commit's detail, including per-file changes when exposed.
    pub async fn get_commit(
        &self,
        username: &str,
        repo: &str,
        sha: &str,
    ) -> Result<Option<CommitDetail>, GithubError> {
        self.get_opt(self.commit_detail_url(username, repo, sha)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockTransport;

    fn client(transport: &MockTransport) -> GithubClient {
        GithubClient::with_transport("ghp_token", Pager::default(), Arc::new(transport.clone()))
    }

    #[tokio::test]
    async fn sends_bearer_token_and_api_version_headers() {
        let transport = MockTransport::new();
        let client = client(&transport);
        transport.push_json(client.user_repos_url("octocat", 1), "[]");

        client.list_user_repos("octocat").await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let header = |name: &str| {
            requests[0]
                .headers
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        };
        assert_eq!(header("Authorization"), Some("Bearer ghp_token".to_string()));
        assert_eq!(header("X-GitHub-Api-Version"), Some(API_VERSION.to_string()));
        assert_eq!(header("Accept"), Some(ACCEPT.to_string()));
    }

    #[tokio::test]
    async fn unknown_user_resolves_to_empty_not_error() {
        let transport = MockTransport::new();
        let client = client(&transport);
        transport.push_status(client.user_repos_url("ghost", 1), 404);

        let repos = client.list_user_repos("ghost").await.unwrap();
        assert!(repos.is_empty());
    }

    #[tokio::test]
    async fn missing_commit_detail_resolves_to_none() {
        let transport = MockTransport::new();
        let client = client(&transport);
        transport.push_status(client.commit_detail_url("u", "r", "dead"), 404);

        let detail = client.get_commit("u", "r", "dead").await.unwrap();
        assert!(detail.is_none());
    }

    #[tokio::test]
    async fn server_errors_carry_status_and_body() {
        let transport = MockTransport::new();
        let client = client(&transport);
        transport.push_response(
            client.user_repos_url("octocat", 1),
            crate::http::HttpResponse {
                status: 500,
                headers: Vec::new(),
                body: b"oops".to_vec(),
            },
        );

        let err = client.list_user_repos("octocat").await.unwrap_err();
        assert!(matches!(err, GithubError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn malformed_json_is_an_error() {
        let transport = MockTransport::new();
        let client = client(&transport);
        transport.push_json(client.user_repos_url("octocat", 1), "[{");

        let err = client.list_user_repos("octocat").await.unwrap_err();
        assert!(matches!(err, GithubError::Json(_)));
    }

    #[tokio::test]
    async fn commit_listing_stops_at_the_page_ceiling() {
        let transport = MockTransport::new();
        let client = GithubClient::with_transport(
            "t",
            Pager {
                page_size: 1,
                max_pages: 3,
            },
            Arc::new(transport.clone()),
        );
        let since = "2024-01-01T00:00:00Z".parse().unwrap();

        for page in 1..=3 {
            transport.push_json(
                client.commits_url("u", "r", since, page),
                &format!(r#"[{{"sha": "s{page}", "commit": {{}}}}]"#),
            );
        }

        let commits = client.list_commits("u", "r", since).await.unwrap();
        assert_eq!(commits.len(), 3);
        // Every page was full, but page 4 was never requested.
        assert_eq!(transport.requests().len(), 3);
    }
}
