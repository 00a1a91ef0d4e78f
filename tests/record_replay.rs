//! Record-replay round trip through the resolution pipeline.
//!
//! 1. Resolve a replace set against scripted ports wrapped in recording
//!    adapters.
//! 2. Replay the cassette through `ServiceContext::replaying()`.
//! 3. Assert the replayed directives match the recorded ones, twice.

use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};

use goodmod::adapters::recording::{RecordingGitRemote, RecordingGithubApi};
use goodmod::cassette::recorder::CassetteRecorder;
use goodmod::config::RefTarget;
use goodmod::context::ServiceContext;
use goodmod::manifest::Manifest;
use goodmod::ports::git::{FetchFuture, GitRemote, RemoteRef};
use goodmod::ports::github::{
    CommitSummary, Comparison, GithubApi, GithubFuture, RefObject, RepoId,
};
use goodmod::replace_set::ReplaceSet;
use goodmod::resolve::orchestrator::ResolutionOrchestrator;
use goodmod::version::Commit;

const GOMOD: &str = "module example.com/app

require (
	k8s.io/api v0.0.0
	k8s.io/client-go v0.0.0
	sigs.k8s.io/yaml v1.1.0
)

replace (
	k8s.io/api => k8s.io/api v0.0.0-20190918155943-95b840bb6a1f
	k8s.io/client-go => k8s.io/client-go v0.0.0-20190918160344-1fbdaa4c8d90
)
";

const TAG: &str = "kubernetes-1.16.2";
const API_TAG_OBJECT: &str = "5c7a6e1d0f2b3a4c5d6e7f8091a2b3c4d5e6f708";
const API_COMMIT: &str = "e7c8f7a3e6f2d0b1c2d3e4f5a6b7c8d9e0f1a2b3";
const CLIENT_COMMIT: &str = "6c5935290e3335e6a4b3d6bdd6b1a1e5a2f0c9d8";

/// Serves `k8s.io/api` through an annotated tag; knows nothing else.
struct ScriptedApi;

impl GithubApi for ScriptedApi {
    fn branch_head<'a>(&'a self, _: &'a RepoId, _: &'a str) -> GithubFuture<'a, String> {
        Box::pin(async { Err("404 Not Found".into()) })
    }

    fn tag_ref<'a>(&'a self, repo: &'a RepoId, _: &'a str) -> GithubFuture<'a, RefObject> {
        Box::pin(async move {
            match repo.repo.as_str() {
                "api" => Ok(RefObject { kind: "tag".to_string(), sha: API_TAG_OBJECT.to_string() }),
                _ => Err("404 Not Found".into()),
            }
        })
    }

    fn tag_object<'a>(&'a self, _: &'a RepoId, _: &'a str) -> GithubFuture<'a, RefObject> {
        Box::pin(async { Ok(RefObject { kind: "commit".to_string(), sha: API_COMMIT.to_string() }) })
    }

    fn commit<'a>(&'a self, _: &'a RepoId, sha: &'a str) -> GithubFuture<'a, Commit> {
        Box::pin(async move {
            let timestamp = Utc.with_ymd_and_hms(2019, 10, 15, 19, 31, 5).single().ok_or("bad time")?;
            Ok(Commit::new(sha, timestamp)?)
        })
    }

    fn compare<'a>(&'a self, _: &'a RepoId, _: &'a str, _: &'a str) -> GithubFuture<'a, Comparison> {
        Box::pin(async { Err("unused".into()) })
    }

    fn list_commits<'a>(&'a self, _: &'a RepoId, _: &'a str) -> GithubFuture<'a, Vec<CommitSummary>> {
        Box::pin(async { Err("unused".into()) })
    }
}

/// Resolves `k8s.io/client-go` by fetching; the API never sees it.
struct ScriptedRemote;

impl GitRemote for ScriptedRemote {
    fn fetch_commit<'a>(&'a self, url: &'a str, _: &'a RemoteRef) -> FetchFuture<'a> {
        Box::pin(async move {
            if !url.ends_with("/client-go") {
                return Err(format!("fatal: repository '{url}' not found").into());
            }
            let timestamp = Utc.with_ymd_and_hms(2019, 10, 15, 19, 40, 2).single().ok_or("bad time")?;
            Ok(Commit::new(CLIENT_COMMIT, timestamp)?)
        })
    }
}

fn candidates() -> ReplaceSet {
    let manifest = Manifest::parse("go.mod", GOMOD).unwrap();
    ReplaceSet::from_manifest(&manifest, |path| path.starts_with("k8s.io/"))
}

fn resolve(github: &dyn GithubApi, git: &dyn GitRemote) -> (Vec<String>, usize) {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
    let mut set = candidates();
    let orchestrator = ResolutionOrchestrator::new(github, git);
    let report = runtime.block_on(orchestrator.resolve_all(&mut set, &RefTarget::Tag(TAG.to_string())));
    (set.directives(), report.failures().count())
}

#[test]
fn recorded_resolution_replays_identically() {
    let dir = tempfile::TempDir::new().unwrap();
    let cassette_path = dir.path().join("tag.cassette.yaml");

    let recorder = Arc::new(Mutex::new(CassetteRecorder::new(&cassette_path, "tag-resolution")));
    let github = RecordingGithubApi::new(Box::new(ScriptedApi), Arc::clone(&recorder));
    let git = RecordingGitRemote::new(Box::new(ScriptedRemote), Arc::clone(&recorder));
    let recorded = resolve(&github, &git);
    drop((github, git));

    assert_eq!(
        recorded.0,
        vec![
            "go mod edit -replace k8s.io/api=k8s.io/api@\"v0.0.0-20191015193105-e7c8f7a3e6f2\"".to_string(),
            "go mod edit -replace k8s.io/client-go=k8s.io/client-go@\"v0.0.0-20191015194002-6c5935290e33\""
                .to_string(),
        ]
    );
    assert_eq!(recorded.1, 0);

    let recorder = Arc::try_unwrap(recorder).unwrap().into_inner().unwrap();
    // tag_ref + tag_object + commit for api; tag_ref then fetch for client-go.
    assert_eq!(recorder.len(), 5);
    recorder.finish().unwrap();

    for _ in 0..2 {
        let ctx = ServiceContext::replaying(&cassette_path).unwrap();
        let replayed = resolve(ctx.github.as_ref(), ctx.git.as_ref());
        assert_eq!(replayed, recorded);
    }
}

#[test]
fn unmatched_modules_are_not_candidates() {
    let set = candidates();
    let paths: Vec<&str> = set.iter().map(|c| c.new_path.as_str()).collect();
    assert_eq!(paths, vec!["k8s.io/api", "k8s.io/client-go"]);
    assert!(set.find("sigs.k8s.io/yaml").is_none());
}
