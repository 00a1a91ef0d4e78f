//! Service context bundling all port trait objects.

use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::adapters::live::filesystem::LiveFileSystem;
use crate::adapters::live::git::LiveGitRemote;
use crate::adapters::live::github::{GithubConfig, LiveGithubApi};
use crate::adapters::live::shell::LiveShellExecutor;
use crate::adapters::recording::{RecordingGitRemote, RecordingGithubApi};
use crate::adapters::replaying::{ReplayingGitRemote, ReplayingGithubApi};
use crate::cassette::format::Cassette;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::replayer::CassetteReplayer;
use crate::error::Error;
use crate::ports::filesystem::FileSystem;
use crate::ports::git::GitRemote;
use crate::ports::github::GithubApi;
use crate::ports::shell::ShellExecutor;

/// Bundles all port trait objects into a single context.
///
/// Constructors wire up different adapter implementations (live,
/// recording, replaying). Only the network ports are recorded; the
/// filesystem and tools always run live.
pub struct ServiceContext {
    /// Filesystem for manifests and rules files.
    pub fs: Box<dyn FileSystem>,
    /// Executor for `go` and `git`.
    pub shell: Box<dyn ShellExecutor>,
    /// Hosting API client.
    pub github: Box<dyn GithubApi>,
    /// Shallow fetches from remote repositories.
    pub git: Box<dyn GitRemote>,
    /// Optional cassette recorder; written to disk on drop.
    recorder: Option<Arc<Mutex<CassetteRecorder>>>,
}

fn live_github(config: GithubConfig) -> Result<LiveGithubApi, Error> {
    LiveGithubApi::new(config).map_err(|e| Error::Io(format!("failed to build HTTP client: {e}")))
}

impl ServiceContext {
    /// Creates a live context talking to the real services.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn live(github: GithubConfig) -> Result<Self, Error> {
        Ok(Self {
            fs: Box::new(LiveFileSystem),
            shell: Box::new(LiveShellExecutor),
            github: Box::new(live_github(github)?),
            git: Box::new(LiveGitRemote),
            recorder: None,
        })
    }

    /// Creates a live context that also records every network interaction
    /// into a cassette written to `path` when the context is dropped.
    ///
    /// This is the developer-only mechanism for capturing cassettes via the
    /// `GOODMOD_RECORD` env var.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn recording(path: &Path, github: GithubConfig) -> Result<Self, Error> {
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(path, "goodmod-session")));
        Ok(Self {
            fs: Box::new(LiveFileSystem),
            shell: Box::new(LiveShellExecutor),
            github: Box::new(RecordingGithubApi::new(
                Box::new(live_github(github)?),
                Arc::clone(&recorder),
            )),
            git: Box::new(RecordingGitRemote::new(Box::new(LiveGitRemote), Arc::clone(&recorder))),
            recorder: Some(recorder),
        })
    }

    /// Creates a context whose network ports are served from a cassette.
    ///
    /// Both network ports share one replayer, so the cassette may interleave
    /// their interactions freely.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, Error> {
        let cassette = Cassette::load(path).map_err(Error::Io)?;
        let replayer = Arc::new(Mutex::new(CassetteReplayer::new(&cassette)));
        Ok(Self {
            fs: Box::new(LiveFileSystem),
            shell: Box::new(LiveShellExecutor),
            github: Box::new(ReplayingGithubApi::new(Arc::clone(&replayer))),
            git: Box::new(ReplayingGitRemote::new(replayer)),
            recorder: None,
        })
    }
}

impl Drop for ServiceContext {
    fn drop(&mut self) {
        let Some(recorder) = self.recorder.take() else {
            return;
        };
        let guard = recorder.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match guard.write() {
            Ok(path) => eprintln!("Recording saved to: {}", path.display()),
            Err(e) => warn!(error = %e, "failed to write cassette"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::git::RemoteRef;
    use crate::ports::github::RepoId;
    use serde_json::json;

    #[tokio::test]
    async fn replaying_context_serves_both_network_ports() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("session.cassette.yaml");
        let mut recorder = CassetteRecorder::new(&path, "test");
        recorder.record(
            "github",
            "branch_head",
            json!({"owner": "openshift", "repo": "api", "branch": "master"}),
            json!({"Err": "API rate limit exceeded"}),
        );
        recorder.record(
            "git",
            "fetch_commit",
            json!({
                "url": "https://github.com/openshift/api",
                "reference": {"kind": "branch", "name": "master"}
            }),
            json!({"Ok": {
                "sha": "c07a134afb42d5e6b1f3a7c91d2e4f5a6b7c8d9e",
                "timestamp": "2019-10-16T11:51:29Z"
            }}),
        );
        recorder.finish().unwrap();

        let ctx = ServiceContext::replaying(&path).unwrap();
        let err = ctx.github.branch_head(&RepoId::new("openshift", "api"), "master").await.unwrap_err();
        assert_eq!(err.to_string(), "API rate limit exceeded");
        let commit = ctx
            .git
            .fetch_commit("https://github.com/openshift/api", &RemoteRef::Branch("master".into()))
            .await
            .unwrap();
        assert_eq!(commit.short_sha(), "c07a134afb42");
    }

    #[test]
    fn missing_cassette_is_an_error() {
        let err = ServiceContext::replaying(Path::new("/nonexistent/goodmod.cassette.yaml"))
            .err()
            .unwrap();
        assert!(err.to_string().contains("Failed to read cassette file"));
    }

    #[test]
    fn recording_context_writes_cassette_on_drop() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out").join("session.cassette.yaml");
        {
            let _ctx = ServiceContext::recording(&path, GithubConfig::default()).unwrap();
        }
        let cassette = Cassette::load(&path).unwrap();
        assert_eq!(cassette.name, "goodmod-session");
        assert!(cassette.interactions.is_empty());
    }
}
