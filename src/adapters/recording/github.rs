//! Recording adapter for the `GithubApi` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::adapters::github_input;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::github::{
    CommitSummary, Comparison, GithubApi, GithubFuture, RefObject, RepoId,
};
use crate::version::Commit;

const PORT: &str = "github";

/// Records hosting API interactions while delegating to an inner implementation.
pub struct RecordingGithubApi {
    inner: Box<dyn GithubApi>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingGithubApi {
    /// Creates a new recording client wrapping the given implementation.
    pub fn new(inner: Box<dyn GithubApi>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl GithubApi for RecordingGithubApi {
    fn branch_head<'a>(&'a self, repo: &'a RepoId, branch: &'a str) -> GithubFuture<'a, String> {
        Box::pin(async move {
            let result = self.inner.branch_head(repo, branch).await;
            let input = github_input(repo, &[("branch", branch)]);
            record_result(&self.recorder, PORT, "branch_head", input, &result);
            result
        })
    }

    fn tag_ref<'a>(&'a self, repo: &'a RepoId, tag: &'a str) -> GithubFuture<'a, RefObject> {
        Box::pin(async move {
            let result = self.inner.tag_ref(repo, tag).await;
            let input = github_input(repo, &[("tag", tag)]);
            record_result(&self.recorder, PORT, "tag_ref", input, &result);
            result
        })
    }

    fn tag_object<'a>(&'a self, repo: &'a RepoId, sha: &'a str) -> GithubFuture<'a, RefObject> {
        Box::pin(async move {
            let result = self.inner.tag_object(repo, sha).await;
            let input = github_input(repo, &[("sha", sha)]);
            record_result(&self.recorder, PORT, "tag_object", input, &result);
            result
        })
    }

    fn commit<'a>(&'a self, repo: &'a RepoId, sha: &'a str) -> GithubFuture<'a, Commit> {
        Box::pin(async move {
            let result = self.inner.commit(repo, sha).await;
            let input = github_input(repo, &[("sha", sha)]);
            record_result(&self.recorder, PORT, "commit", input, &result);
            result
        })
    }

    fn compare<'a>(
        &'a self,
        repo: &'a RepoId,
        base: &'a str,
        head: &'a str,
    ) -> GithubFuture<'a, Comparison> {
        Box::pin(async move {
            let result = self.inner.compare(repo, base, head).await;
            let input = github_input(repo, &[("base", base), ("head", head)]);
            record_result(&self.recorder, PORT, "compare", input, &result);
            result
        })
    }

    fn list_commits<'a>(
        &'a self,
        repo: &'a RepoId,
        from: &'a str,
    ) -> GithubFuture<'a, Vec<CommitSummary>> {
        Box::pin(async move {
            let result = self.inner.list_commits(repo, from).await;
            let input = github_input(repo, &[("from", from)]);
            record_result(&self.recorder, PORT, "list_commits", input, &result);
            result
        })
    }
}
