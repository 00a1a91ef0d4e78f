//! Live adapter for the `GithubApi` port using the GitHub REST v3 API.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::ports::github::{
    CommitSummary, Comparison, GithubApi, GithubFuture, RefObject, RepoId,
};
use crate::version::Commit;

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("goodmod/", env!("CARGO_PKG_VERSION"));
const ACCEPT: &str = "application/vnd.github+json";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the hosting API.
///
/// Built once by the command layer; the adapter never consults the
/// environment itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubConfig {
    /// Base URL, without trailing slash.
    pub api_url: String,
    /// Access token; `None` means unauthenticated requests with the lower
    /// anonymous rate limit.
    pub token: Option<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self { api_url: DEFAULT_API_URL.to_string(), token: None }
    }
}

impl GithubConfig {
    /// Whether requests will be authenticated.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Live GitHub client.
pub struct LiveGithubApi {
    client: Client,
    config: GithubConfig,
}

impl LiveGithubApi {
    /// Creates a client for the given settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: GithubConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(USER_AGENT).timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    fn request(&self, path: &str, query: &[(&str, &str)]) -> RequestBuilder {
        let url = format!("{}/{path}", self.config.api_url.trim_end_matches('/'));
        let builder = self.client.get(url).query(query).header("Accept", ACCEPT);
        match self.config.token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: String,
    ) -> Result<T, Box<dyn std::error::Error + Send + Sync>> {
        self.get_json_with(path, &[]).await
    }

    async fn get_json_with<T: DeserializeOwned>(
        &self,
        path: String,
        query: &[(&str, &str)],
    ) -> Result<T, Box<dyn std::error::Error + Send + Sync>> {
        let response = self.request(&path, query).send().await.map_err(
            |e| -> Box<dyn std::error::Error + Send + Sync> {
                format!("GitHub API request {path} failed: {e}").into()
            },
        )?;

        let status = response.status();
        let body = response.text().await.map_err(
            |e| -> Box<dyn std::error::Error + Send + Sync> {
                format!("Failed to read GitHub API response for {path}: {e}").into()
            },
        )?;

        if !status.is_success() {
            let msg = serde_json::from_str::<ApiError>(&body).map(|e| e.message).unwrap_or(body);
            return Err(format!("GitHub API error ({}) for {path}: {msg}", status.as_u16()).into());
        }

        serde_json::from_str(&body).map_err(|e| -> Box<dyn std::error::Error + Send + Sync> {
            format!("Failed to parse GitHub API response for {path}: {e}").into()
        })
    }
}

/// Error body returned by the API.
#[derive(Deserialize)]
struct ApiError {
    message: String,
}

/// `GET /repos/{o}/{r}/branches/{b}`.
#[derive(Deserialize)]
struct BranchResponse {
    commit: ShaOnly,
}

#[derive(Deserialize)]
struct ShaOnly {
    sha: String,
}

/// `GET /repos/{o}/{r}/git/ref/tags/{t}` and `GET /repos/{o}/{r}/git/tags/{sha}`.
#[derive(Deserialize)]
struct ObjectResponse {
    object: ApiObject,
}

#[derive(Deserialize)]
struct ApiObject {
    #[serde(rename = "type")]
    kind: String,
    sha: String,
}

/// `GET /repos/{o}/{r}/commits/{ref}`; accepts abbreviated hashes.
#[derive(Deserialize)]
struct CommitResponse {
    sha: String,
    commit: CommitDetail,
}

#[derive(Deserialize)]
struct CommitDetail {
    committer: Signature,
}

#[derive(Deserialize)]
struct Signature {
    date: DateTime<Utc>,
}

/// `GET /repos/{o}/{r}/compare/{base}...{head}`.
#[derive(Deserialize)]
struct CompareResponse {
    ahead_by: u64,
    behind_by: u64,
}

/// An element of `GET /repos/{o}/{r}/commits`.
#[derive(Deserialize)]
struct ListedCommit {
    sha: String,
    commit: ListedCommitDetail,
}

#[derive(Deserialize)]
struct ListedCommitDetail {
    message: String,
}

impl GithubApi for LiveGithubApi {
    fn branch_head<'a>(&'a self, repo: &'a RepoId, branch: &'a str) -> GithubFuture<'a, String> {
        Box::pin(async move {
            let path = format!("repos/{}/{}/branches/{branch}", repo.owner, repo.repo);
            let response: BranchResponse = self.get_json(path).await?;
            Ok(response.commit.sha)
        })
    }

    fn tag_ref<'a>(&'a self, repo: &'a RepoId, tag: &'a str) -> GithubFuture<'a, RefObject> {
        Box::pin(async move {
            let path = format!("repos/{}/{}/git/ref/tags/{tag}", repo.owner, repo.repo);
            let response: ObjectResponse = self.get_json(path).await?;
            Ok(RefObject { kind: response.object.kind, sha: response.object.sha })
        })
    }

    fn tag_object<'a>(&'a self, repo: &'a RepoId, sha: &'a str) -> GithubFuture<'a, RefObject> {
        Box::pin(async move {
            let path = format!("repos/{}/{}/git/tags/{sha}", repo.owner, repo.repo);
            let response: ObjectResponse = self.get_json(path).await?;
            Ok(RefObject { kind: response.object.kind, sha: response.object.sha })
        })
    }

    fn commit<'a>(&'a self, repo: &'a RepoId, sha: &'a str) -> GithubFuture<'a, Commit> {
        Box::pin(async move {
            let path = format!("repos/{}/{}/commits/{sha}", repo.owner, repo.repo);
            let response: CommitResponse = self.get_json(path).await?;
            Ok(Commit::new(response.sha, response.commit.committer.date)?)
        })
    }

    fn compare<'a>(
        &'a self,
        repo: &'a RepoId,
        base: &'a str,
        head: &'a str,
    ) -> GithubFuture<'a, Comparison> {
        Box::pin(async move {
            let path = format!("repos/{}/{}/compare/{base}...{head}", repo.owner, repo.repo);
            let response: CompareResponse = self.get_json(path).await?;
            Ok(Comparison { ahead_by: response.ahead_by, behind_by: response.behind_by })
        })
    }

    fn list_commits<'a>(
        &'a self,
        repo: &'a RepoId,
        from: &'a str,
    ) -> GithubFuture<'a, Vec<CommitSummary>> {
        Box::pin(async move {
            let path = format!("repos/{}/{}/commits", repo.owner, repo.repo);
            let response: Vec<ListedCommit> = self.get_json_with(path, &[("sha", from)]).await?;
            Ok(response
                .into_iter()
                .map(|c| CommitSummary { sha: c.sha, message: c.commit.message })
                .collect())
        })
    }
}
