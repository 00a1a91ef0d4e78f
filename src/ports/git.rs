//! Git transport port for reading single refs from remote repositories.

use std::error::Error;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::version::Commit;

/// Boxed future type alias used by [`GitRemote`] to keep the trait dyn-compatible.
pub type FetchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Commit, Box<dyn Error + Send + Sync>>> + Send + 'a>>;

/// The ref to fetch from a remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum RemoteRef {
    /// `refs/heads/<name>`.
    Branch(String),
    /// `refs/tags/<name>`, peeled to its commit.
    Tag(String),
    /// A full commit hash; servers refuse abbreviated ones.
    Commit(String),
}

impl RemoteRef {
    /// The refspec handed to `git fetch`.
    #[must_use]
    pub fn refspec(&self) -> String {
        match self {
            Self::Branch(name) => format!("refs/heads/{name}"),
            Self::Tag(name) => format!("refs/tags/{name}"),
            Self::Commit(sha) => sha.clone(),
        }
    }
}

/// Reads exactly one ref from a remote repository.
///
/// Implementations keep nothing around between calls: whatever they clone
/// or fetch is discarded once the commit is known.
pub trait GitRemote: Send + Sync {
    /// Fetches `reference` from `url` and returns the commit it names.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be reached or the ref does
    /// not exist.
    fn fetch_commit<'a>(&'a self, url: &'a str, reference: &'a RemoteRef) -> FetchFuture<'a>;
}
