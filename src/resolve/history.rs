//! Commit ranges between two refs of a module, for reports and bump messages.

use crate::ports::github::{CommitSummary, GithubApi, RepoId};
use crate::repository::module_owner_and_repo;

use super::ResolveError;

const MERGE_PREFIX: &str = "Merge pull request";
const SUMMARY_SHA_LEN: usize = 8;

fn repo_for(module_path: &str) -> Result<RepoId, ResolveError> {
    let (owner, repo) = module_owner_and_repo(module_path)?;
    Ok(RepoId::new(owner, repo))
}

/// How many commits `to` has that `from` does not; `0` means up to date.
///
/// # Errors
///
/// Returns an error when the module is not on GitHub or the comparison
/// cannot be computed (unknown ref, unrelated histories, rate limit).
pub async fn count_commits_between(
    api: &dyn GithubApi,
    module_path: &str,
    from: &str,
    to: &str,
) -> Result<u64, ResolveError> {
    let repo = repo_for(module_path)?;
    let comparison = api.compare(&repo, from, to).await.map_err(ResolveError::transport)?;
    Ok(comparison.ahead_by)
}

/// Commits reachable from `newest`, newest first, up to but excluding the
/// first commit whose hash starts with `oldest`. Pull request merge commits
/// are left out. Only the first page of the listing is inspected.
///
/// # Errors
///
/// Returns an error when the module is not on GitHub or the listing fails.
pub async fn commits_since(
    api: &dyn GithubApi,
    module_path: &str,
    newest: &str,
    oldest: &str,
) -> Result<Vec<CommitSummary>, ResolveError> {
    let repo = repo_for(module_path)?;
    let listing = api.list_commits(&repo, newest).await.map_err(ResolveError::transport)?;
    Ok(listing
        .into_iter()
        .take_while(|c| !c.sha.starts_with(oldest))
        .filter(|c| !c.message.starts_with(MERGE_PREFIX))
        .collect())
}

/// `<sha8>: <first message line>`.
#[must_use]
pub fn summary_line(commit: &CommitSummary) -> String {
    let sha = commit.sha.get(..SUMMARY_SHA_LEN).unwrap_or(&commit.sha);
    let subject = commit.message.lines().next().unwrap_or_default().trim();
    format!("{sha}: {subject}")
}
