//! Replaying adapter for the `GitRemote` port.

use std::sync::{Arc, Mutex};

use super::{next_output, replay_result};
use crate::adapters::fetch_input;
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::git::{FetchFuture, GitRemote, RemoteRef};

/// Replays recorded git fetches from a cassette.
pub struct ReplayingGitRemote {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingGitRemote {
    /// Creates a replaying git remote sharing the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl GitRemote for ReplayingGitRemote {
    fn fetch_commit<'a>(&'a self, url: &'a str, reference: &'a RemoteRef) -> FetchFuture<'a> {
        let output = next_output(&self.replayer, "git", "fetch_commit", &fetch_input(url, reference));
        Box::pin(async move { replay_result(&output, "git::fetch_commit") })
    }
}
