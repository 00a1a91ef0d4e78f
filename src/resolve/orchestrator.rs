//! Concurrent resolution of every candidate in a [`ReplaceSet`].

use futures::future::join_all;
use tracing::{info, warn};

use crate::config::RefTarget;
use crate::ports::git::GitRemote;
use crate::ports::github::GithubApi;
use crate::replace_set::ReplaceSet;
use crate::version::Commit;

use super::{LocalResolver, RemoteResolver, Resolver, ResolverKind};

/// A failed resolver attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    /// Resolver that failed.
    pub resolver: ResolverKind,
    /// Its error message.
    pub error: String,
}

/// How one candidate ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A resolver produced a commit; `failed` lists the ones tried before it.
    Resolved {
        /// The commit pinned.
        commit: Commit,
        /// Resolver that produced it.
        resolver: ResolverKind,
        /// Earlier resolvers in the chain that failed.
        failed: Vec<Attempt>,
    },
    /// Every resolver in the chain failed.
    Failed {
        /// One entry per resolver, in chain order.
        attempts: Vec<Attempt>,
    },
}

/// Outcome for one candidate, keyed by the path resolution ran against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateOutcome {
    /// The candidate's new path.
    pub module: String,
    /// What happened.
    pub outcome: Outcome,
}

/// Per-candidate results of one [`ResolutionOrchestrator::resolve_all`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionReport {
    /// One entry per candidate, in candidate order.
    pub outcomes: Vec<CandidateOutcome>,
}

impl ResolutionReport {
    /// Number of candidates that resolved.
    #[must_use]
    pub fn resolved_count(&self) -> usize {
        self.outcomes.iter().filter(|o| matches!(o.outcome, Outcome::Resolved { .. })).count()
    }

    /// Candidates for which every resolver failed.
    pub fn failures(&self) -> impl Iterator<Item = &CandidateOutcome> {
        self.outcomes.iter().filter(|o| matches!(o.outcome, Outcome::Failed { .. }))
    }
}

type Chain<'a> = Vec<Box<dyn Resolver + 'a>>;

/// Runs one resolver chain per candidate, all candidates concurrently.
///
/// Each chain is tried in order and stops at the first success. Failures
/// are logged as they happen and collected into the returned report; they
/// never stop sibling candidates.
pub struct ResolutionOrchestrator<'a> {
    branch: Chain<'a>,
    tag: Chain<'a>,
    commit: Chain<'a>,
}

impl<'a> ResolutionOrchestrator<'a> {
    /// API resolvers first, shallow fetches as fallback.
    #[must_use]
    pub fn new(github: &'a dyn GithubApi, git: &'a dyn GitRemote) -> Self {
        Self {
            branch: vec![Box::new(RemoteResolver::branch(github)), Box::new(LocalResolver::branch(git))],
            tag: vec![Box::new(RemoteResolver::tag(github)), Box::new(LocalResolver::tag(git))],
            commit: vec![Box::new(RemoteResolver::commit(github)), Box::new(LocalResolver::commit(git))],
        }
    }

    /// Uses explicit chains per ref kind.
    #[must_use]
    pub fn with_chains(branch: Chain<'a>, tag: Chain<'a>, commit: Chain<'a>) -> Self {
        Self { branch, tag, commit }
    }

    fn chain(&self, target: &RefTarget) -> &[Box<dyn Resolver + 'a>] {
        match target {
            RefTarget::Branch(_) => &self.branch,
            RefTarget::Tag(_) => &self.tag,
            RefTarget::Commit(_) => &self.commit,
        }
    }

    /// Resolves every candidate of `set` to `target` and records the commits
    /// in place. Returns once every candidate has finished.
    pub async fn resolve_all(&self, set: &mut ReplaceSet, target: &RefTarget) -> ResolutionReport {
        let chain = self.chain(target);
        let name = target.name();
        let outcomes: Vec<Outcome> =
            join_all(set.iter().map(|candidate| resolve_one(chain, &candidate.new_path, name))).await;

        let mut report = ResolutionReport::default();
        for (candidate, outcome) in set.iter_mut().zip(outcomes) {
            if let Outcome::Resolved { commit, .. } = &outcome {
                candidate.set_resolved(commit.clone());
            }
            report.outcomes.push(CandidateOutcome { module: candidate.new_path.clone(), outcome });
        }
        report
    }
}

async fn resolve_one(chain: &[Box<dyn Resolver + '_>], module: &str, name: &str) -> Outcome {
    let mut attempts = Vec::new();
    for resolver in chain {
        match resolver.resolve(module, name).await {
            Ok(commit) => {
                info!(module, resolver = %resolver.kind(), version = %commit, "resolved");
                return Outcome::Resolved { commit, resolver: resolver.kind(), failed: attempts };
            }
            Err(err) => {
                warn!(module, resolver = %resolver.kind(), error = %err, "resolver failed");
                attempts.push(Attempt { resolver: resolver.kind(), error: err.to_string() });
            }
        }
    }
    warn!(module, reference = name, "unable to resolve, skipping");
    Outcome::Failed { attempts }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::manifest::Manifest;
    use crate::resolve::{ResolveError, ResolveFuture};

    const GOMOD: &str = "module example.com/app

require (
	github.com/openshift/api v0.0.0-20191014195513-c9253efc14f4
	github.com/openshift/client-go v0.0.0-20191001081553-3b0e988f8cb0
)
";

    fn commit(sha: &str) -> Commit {
        Commit::new(sha, Utc.with_ymd_and_hms(2019, 10, 16, 11, 51, 29).unwrap()).unwrap()
    }

    /// Resolves only the listed modules, after an optional delay.
    struct Scripted {
        kind: ResolverKind,
        succeeds_for: Vec<&'static str>,
        delay: Duration,
        calls: Arc<AtomicUsize>,
    }

    impl Scripted {
        fn new(kind: ResolverKind, succeeds_for: Vec<&'static str>) -> Self {
            Self { kind, succeeds_for, delay: Duration::ZERO, calls: Arc::default() }
        }
    }

    impl Resolver for Scripted {
        fn kind(&self) -> ResolverKind {
            self.kind
        }

        fn resolve<'a>(&'a self, module_path: &'a str, _name: &'a str) -> ResolveFuture<'a> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                tokio::time::sleep(self.delay).await;
                if self.succeeds_for.contains(&module_path) {
                    Ok(commit("c07a134afb42d5e6b1f3a7c91d2e4f5a6b7c8d9e"))
                } else {
                    Err(ResolveError::Transport(format!("{} cannot see {module_path}", self.kind)))
                }
            })
        }
    }

    fn set() -> ReplaceSet {
        ReplaceSet::from_manifest(&Manifest::parse("go.mod", GOMOD).unwrap(), |_| true)
    }

    fn branch_only(chain: Chain<'static>) -> ResolutionOrchestrator<'static> {
        ResolutionOrchestrator::with_chains(chain, Vec::new(), Vec::new())
    }

    #[tokio::test]
    async fn fallback_resolves_when_primary_fails() {
        let orchestrator = branch_only(vec![
            Box::new(Scripted::new(ResolverKind::RemoteBranch, vec![])),
            Box::new(Scripted::new(ResolverKind::LocalBranch, vec!["github.com/openshift/api"])),
        ]);
        let mut set = ReplaceSet::from_manifest(
            &Manifest::parse("go.mod", GOMOD).unwrap(),
            |p| p == "github.com/openshift/api",
        );

        let report = orchestrator.resolve_all(&mut set, &RefTarget::Branch("master".into())).await;

        assert_eq!(report.resolved_count(), 1);
        let Outcome::Resolved { resolver, failed, .. } = &report.outcomes[0].outcome else {
            panic!("expected resolution");
        };
        assert_eq!(*resolver, ResolverKind::LocalBranch);
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].resolver, ResolverKind::RemoteBranch);
        assert_eq!(
            set.directives(),
            vec![
                "go mod edit -replace github.com/openshift/api=github.com/openshift/api@\"v0.0.0-20191016115129-c07a134afb42\""
                    .to_string()
            ]
        );
    }

    #[tokio::test]
    async fn one_failure_does_not_affect_sibling() {
        let orchestrator = branch_only(vec![
            Box::new(Scripted::new(ResolverKind::RemoteBranch, vec!["github.com/openshift/api"])),
            Box::new(Scripted::new(ResolverKind::LocalBranch, vec![])),
        ]);
        let mut set = set();

        let report = orchestrator.resolve_all(&mut set, &RefTarget::Branch("master".into())).await;

        assert_eq!(report.resolved_count(), 1);
        let failures: Vec<&CandidateOutcome> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].module, "github.com/openshift/client-go");
        let Outcome::Failed { attempts } = &failures[0].outcome else { unreachable!() };
        assert_eq!(attempts.len(), 2);
        assert_eq!(set.directives().len(), 1);
    }

    #[tokio::test]
    async fn first_success_stops_the_chain() {
        let fallback = Scripted::new(ResolverKind::LocalTag, vec!["github.com/openshift/api"]);
        let fallback_calls = Arc::clone(&fallback.calls);
        let orchestrator = ResolutionOrchestrator::with_chains(
            Vec::new(),
            vec![
                Box::new(Scripted::new(
                    ResolverKind::RemoteTag,
                    vec!["github.com/openshift/api", "github.com/openshift/client-go"],
                )),
                Box::new(fallback),
            ],
            Vec::new(),
        );
        let mut set = set();

        let report = orchestrator.resolve_all(&mut set, &RefTarget::Tag("v4.2.0".into())).await;

        assert_eq!(report.resolved_count(), 2);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn candidates_run_concurrently_and_keep_their_order() {
        let mut slow = Scripted::new(
            ResolverKind::RemoteCommit,
            vec!["github.com/openshift/api", "github.com/openshift/client-go"],
        );
        slow.delay = Duration::from_millis(200);
        let orchestrator = ResolutionOrchestrator::with_chains(Vec::new(), Vec::new(), vec![Box::new(slow)]);
        let mut set = set();

        let started = std::time::Instant::now();
        let report = orchestrator
            .resolve_all(&mut set, &RefTarget::Commit("c07a134afb42".into()))
            .await;

        assert!(started.elapsed() < Duration::from_millis(390));
        let modules: Vec<&str> = report.outcomes.iter().map(|o| o.module.as_str()).collect();
        assert_eq!(modules, vec!["github.com/openshift/api", "github.com/openshift/client-go"]);
    }

    #[tokio::test]
    async fn empty_set_resolves_nothing() {
        let orchestrator = branch_only(vec![Box::new(Scripted::new(ResolverKind::RemoteBranch, vec![]))]);
        let mut set = ReplaceSet::default();
        let report = orchestrator.resolve_all(&mut set, &RefTarget::Branch("master".into())).await;
        assert!(report.outcomes.is_empty());
    }
}
