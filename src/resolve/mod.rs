//! Turning a module path and a ref name into a commit.
//!
//! Every ref kind has a chain of [`Resolver`]s: the hosting API first, then
//! a throwaway shallow fetch. The [`orchestrator`] runs one chain per
//! candidate module, all candidates concurrently.

pub mod history;
pub mod local;
pub mod orchestrator;
pub mod remote;

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::repository::RepositoryError;
use crate::version::{Commit, VersionError};

pub use local::LocalResolver;
pub use orchestrator::{Attempt, CandidateOutcome, Outcome, ResolutionOrchestrator, ResolutionReport};
pub use remote::RemoteResolver;

/// Boxed future returned by [`Resolver::resolve`].
pub type ResolveFuture<'a> = Pin<Box<dyn Future<Output = Result<Commit, ResolveError>> + Send + 'a>>;

/// Why a single resolver could not produce a commit.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The module path does not name a repository this resolver can reach.
    #[error(transparent)]
    InvalidRepository(#[from] RepositoryError),
    /// The ref resolved to something that is not a usable commit.
    #[error(transparent)]
    InvalidCommit(#[from] VersionError),
    /// A tag chain ended on a non-commit object.
    #[error("tag {tag:?} points at a {kind} object, not a commit")]
    NotACommit {
        /// Tag being resolved.
        tag: String,
        /// Final object type.
        kind: String,
    },
    /// The API request or git fetch failed.
    #[error("{0}")]
    Transport(String),
}

impl ResolveError {
    pub(crate) fn transport(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Every resolver variant, in the order chains try them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverKind {
    /// Branch head through the hosting API.
    RemoteBranch,
    /// Branch head through a shallow fetch.
    LocalBranch,
    /// Tag through the hosting API, peeling annotated tags.
    RemoteTag,
    /// Tag through a shallow fetch.
    LocalTag,
    /// Commit through the hosting API.
    RemoteCommit,
    /// Commit through a shallow fetch.
    LocalCommit,
}

impl fmt::Display for ResolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RemoteBranch => "remote-branch",
            Self::LocalBranch => "local-branch",
            Self::RemoteTag => "remote-tag",
            Self::LocalTag => "local-tag",
            Self::RemoteCommit => "remote-commit",
            Self::LocalCommit => "local-commit",
        };
        f.write_str(name)
    }
}

/// One strategy for resolving a ref of a fixed kind.
pub trait Resolver: Send + Sync {
    /// Which variant this is; used in logs and reports.
    fn kind(&self) -> ResolverKind;

    /// Resolves `name` in the repository behind `module_path`.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] when the repository cannot be located, the
    /// ref does not exist, or the transport fails.
    fn resolve<'a>(&'a self, module_path: &'a str, name: &'a str) -> ResolveFuture<'a>;
}
