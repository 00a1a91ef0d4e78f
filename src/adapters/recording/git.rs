//! Recording adapter for the `GitRemote` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::adapters::fetch_input;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::git::{FetchFuture, GitRemote, RemoteRef};

/// Records git fetches while delegating to an inner implementation.
pub struct RecordingGitRemote {
    inner: Box<dyn GitRemote>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingGitRemote {
    /// Creates a new recording git remote wrapping the given implementation.
    pub fn new(inner: Box<dyn GitRemote>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl GitRemote for RecordingGitRemote {
    fn fetch_commit<'a>(&'a self, url: &'a str, reference: &'a RemoteRef) -> FetchFuture<'a> {
        Box::pin(async move {
            let result = self.inner.fetch_commit(url, reference).await;
            record_result(&self.recorder, "git", "fetch_commit", fetch_input(url, reference), &result);
            result
        })
    }
}
