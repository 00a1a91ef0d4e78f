//! Replaying adapter for the `GithubApi` port.

use std::sync::{Arc, Mutex};

use super::{next_output, replay_result};
use crate::adapters::github_input;
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::github::{
    CommitSummary, Comparison, GithubApi, GithubFuture, RefObject, RepoId,
};
use crate::version::Commit;

const PORT: &str = "github";

/// Replays recorded hosting API responses from a cassette.
pub struct ReplayingGithubApi {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingGithubApi {
    /// Creates a replaying client sharing the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }

    fn replay<'a, T>(
        &self,
        method: &'static str,
        repo: &RepoId,
        args: &[(&str, &str)],
    ) -> GithubFuture<'a, T>
    where
        T: serde::de::DeserializeOwned + Send + 'a,
    {
        let output = next_output(&self.replayer, PORT, method, &github_input(repo, args));
        Box::pin(async move { replay_result(&output, &format!("{PORT}::{method}")) })
    }
}

impl GithubApi for ReplayingGithubApi {
    fn branch_head<'a>(&'a self, repo: &'a RepoId, branch: &'a str) -> GithubFuture<'a, String> {
        self.replay("branch_head", repo, &[("branch", branch)])
    }

    fn tag_ref<'a>(&'a self, repo: &'a RepoId, tag: &'a str) -> GithubFuture<'a, RefObject> {
        self.replay("tag_ref", repo, &[("tag", tag)])
    }

    fn tag_object<'a>(&'a self, repo: &'a RepoId, sha: &'a str) -> GithubFuture<'a, RefObject> {
        self.replay("tag_object", repo, &[("sha", sha)])
    }

    fn commit<'a>(&'a self, repo: &'a RepoId, sha: &'a str) -> GithubFuture<'a, Commit> {
        self.replay("commit", repo, &[("sha", sha)])
    }

    fn compare<'a>(
        &'a self,
        repo: &'a RepoId,
        base: &'a str,
        head: &'a str,
    ) -> GithubFuture<'a, Comparison> {
        self.replay("compare", repo, &[("base", base), ("head", head)])
    }

    fn list_commits<'a>(
        &'a self,
        repo: &'a RepoId,
        from: &'a str,
    ) -> GithubFuture<'a, Vec<CommitSummary>> {
        self.replay("list_commits", repo, &[("from", from)])
    }
}
