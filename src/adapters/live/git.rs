//! Live git adapter using shallow fetches into a throwaway bare repository.

use std::path::Path;

use chrono::{DateTime, Utc};
use tokio::process::Command;
use tracing::debug;

use crate::ports::git::{FetchFuture, GitRemote, RemoteRef};
use crate::version::Commit;

/// Live git transport that shells out to the `git` CLI.
///
/// Every fetch initializes a bare repository in a fresh temporary directory,
/// fetches a single ref with `--depth=1`, reads the commit and removes the
/// directory again.
pub struct LiveGitRemote;

async fn git(
    dir: &Path,
    args: &[&str],
) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .kill_on_drop(true)
        .output()
        .await?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("git {} failed: {}", args.join(" "), stderr.trim()).into());
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parses `<sha> <committer date, strict ISO 8601>` as printed by
/// `git log -1 --format='%H %cI'`.
fn parse_log_line(line: &str) -> Result<Commit, Box<dyn std::error::Error + Send + Sync>> {
    let (sha, date) =
        line.trim().split_once(' ').ok_or_else(|| format!("unexpected git log output {line:?}"))?;
    let timestamp = DateTime::parse_from_rfc3339(date.trim())
        .map_err(|e| format!("invalid commit date {date:?}: {e}"))?
        .with_timezone(&Utc);
    Ok(Commit::new(sha, timestamp)?)
}

impl GitRemote for LiveGitRemote {
    fn fetch_commit<'a>(&'a self, url: &'a str, reference: &'a RemoteRef) -> FetchFuture<'a> {
        Box::pin(async move {
            let scratch = tempfile::Builder::new().prefix("goodmod-").tempdir()?;
            let dir = scratch.path();
            debug!(url, refspec = %reference.refspec(), dir = %dir.display(), "fetching");

            git(dir, &["init", "--bare", "--quiet"]).await?;
            let refspec = reference.refspec();
            git(dir, &["fetch", "--quiet", "--depth=1", "--no-tags", url, &refspec])
                .await
                .map_err(|e| format!("failed to fetch {refspec} from {url}: {e}"))?;
            let line = git(dir, &["log", "-1", "--format=%H %cI", "FETCH_HEAD"]).await?;
            parse_log_line(&line)
        })
    }
}
