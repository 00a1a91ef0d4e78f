//! Repository hosting API port (GitHub REST v3).

use std::error::Error;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::version::Commit;

/// Boxed future type alias used by [`GithubApi`] to keep the trait dyn-compatible.
pub type GithubFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, Box<dyn Error + Send + Sync>>> + Send + 'a>>;

/// Coordinates of a repository on the hosting service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    /// Organization or user.
    pub owner: String,
    /// Repository name.
    pub repo: String,
}

impl RepoId {
    /// Creates a repository id.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self { owner: owner.into(), repo: repo.into() }
    }
}

/// Object a git ref points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefObject {
    /// Object type as reported by the API: `commit` or `tag`.
    pub kind: String,
    /// Object hash.
    pub sha: String,
}

impl RefObject {
    /// Whether the ref points at an annotated tag object that must be peeled.
    #[must_use]
    pub fn is_annotated_tag(&self) -> bool {
        self.kind == "tag"
    }
}

/// Result of comparing two refs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    /// Commits reachable from head but not from base.
    pub ahead_by: u64,
    /// Commits reachable from base but not from head.
    pub behind_by: u64,
}

/// One entry of a commit listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    /// Full commit hash.
    pub sha: String,
    /// Full commit message.
    pub message: String,
}

/// Read-only queries against the repository hosting API.
///
/// Each method maps to a single API call; composition (peeling tags,
/// following branch heads) happens in the resolvers.
pub trait GithubApi: Send + Sync {
    /// Hash of the commit at the head of `branch`.
    ///
    /// # Errors
    ///
    /// Returns an error when the branch does not exist or the request fails.
    fn branch_head<'a>(&'a self, repo: &'a RepoId, branch: &'a str) -> GithubFuture<'a, String>;

    /// Object the tag ref `refs/tags/<tag>` points at.
    ///
    /// # Errors
    ///
    /// Returns an error when the tag does not exist or the request fails.
    fn tag_ref<'a>(&'a self, repo: &'a RepoId, tag: &'a str) -> GithubFuture<'a, RefObject>;

    /// Object an annotated tag object points at.
    ///
    /// # Errors
    ///
    /// Returns an error when the tag object does not exist or the request fails.
    fn tag_object<'a>(&'a self, repo: &'a RepoId, sha: &'a str) -> GithubFuture<'a, RefObject>;

    /// The commit `sha` names, with its full hash and committer time.
    ///
    /// `sha` may be abbreviated.
    ///
    /// # Errors
    ///
    /// Returns an error when the commit does not exist or the request fails.
    fn commit<'a>(&'a self, repo: &'a RepoId, sha: &'a str) -> GithubFuture<'a, Commit>;

    /// Compares `base...head`.
    ///
    /// # Errors
    ///
    /// Returns an error when either ref is unknown, histories are unrelated,
    /// or the request fails.
    fn compare<'a>(
        &'a self,
        repo: &'a RepoId,
        base: &'a str,
        head: &'a str,
    ) -> GithubFuture<'a, Comparison>;

    /// First page of commits reachable from `from`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error when the ref is unknown or the request fails.
    fn list_commits<'a>(
        &'a self,
        repo: &'a RepoId,
        from: &'a str,
    ) -> GithubFuture<'a, Vec<CommitSummary>>;
}
