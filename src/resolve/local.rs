//! Resolvers backed by an ephemeral shallow fetch.

use crate::ports::git::{GitRemote, RemoteRef};
use crate::repository::repository_url;

use super::{ResolveError, ResolveFuture, Resolver, ResolverKind};

/// Resolves a ref by fetching it from the module's repository.
///
/// Works for any host `git` can reach, so it is the fallback behind the API.
pub struct LocalResolver<'a> {
    git: &'a dyn GitRemote,
    kind: ResolverKind,
}

impl<'a> LocalResolver<'a> {
    /// Fetches `refs/heads/<name>`.
    #[must_use]
    pub fn branch(git: &'a dyn GitRemote) -> Self {
        Self { git, kind: ResolverKind::LocalBranch }
    }

    /// Fetches `refs/tags/<name>`.
    #[must_use]
    pub fn tag(git: &'a dyn GitRemote) -> Self {
        Self { git, kind: ResolverKind::LocalTag }
    }

    /// Fetches the commit itself.
    #[must_use]
    pub fn commit(git: &'a dyn GitRemote) -> Self {
        Self { git, kind: ResolverKind::LocalCommit }
    }

    fn remote_ref(&self, name: &str) -> RemoteRef {
        match self.kind {
            ResolverKind::LocalBranch => RemoteRef::Branch(name.to_string()),
            ResolverKind::LocalTag => RemoteRef::Tag(name.to_string()),
            _ => RemoteRef::Commit(name.to_string()),
        }
    }
}

impl Resolver for LocalResolver<'_> {
    fn kind(&self) -> ResolverKind {
        self.kind
    }

    fn resolve<'b>(&'b self, module_path: &'b str, name: &'b str) -> ResolveFuture<'b> {
        Box::pin(async move {
            let url = repository_url(module_path);
            let reference = self.remote_ref(name);
            self.git.fetch_commit(&url, &reference).await.map_err(ResolveError::transport)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::ports::git::FetchFuture;
    use crate::version::Commit;

    #[derive(Default)]
    struct FakeRemote {
        fetched: Mutex<Vec<(String, RemoteRef)>>,
    }

    impl GitRemote for FakeRemote {
        fn fetch_commit<'a>(&'a self, url: &'a str, reference: &'a RemoteRef) -> FetchFuture<'a> {
            self.fetched.lock().unwrap().push((url.to_string(), reference.clone()));
            Box::pin(async move {
                Ok(Commit::new(
                    "c07a134afb42d5e6b1f3a7c91d2e4f5a6b7c8d9e",
                    Utc.with_ymd_and_hms(2019, 10, 16, 11, 51, 29).unwrap(),
                )?)
            })
        }
    }

    #[tokio::test]
    async fn fetches_from_module_repository() {
        let git = FakeRemote::default();
        LocalResolver::tag(&git).resolve("k8s.io/api", "kubernetes-1.16.2").await.unwrap();
        LocalResolver::branch(&git).resolve("go.uber.org/zap", "master").await.unwrap();
        LocalResolver::commit(&git).resolve("github.com/openshift/api", "c07a134afb42").await.unwrap();

        assert_eq!(
            *git.fetched.lock().unwrap(),
            vec![
                (
                    "https://github.com/kubernetes/api".to_string(),
                    RemoteRef::Tag("kubernetes-1.16.2".into())
                ),
                ("https://go.uber.org/zap".to_string(), RemoteRef::Branch("master".into())),
                (
                    "https://github.com/openshift/api".to_string(),
                    RemoteRef::Commit("c07a134afb42".into())
                ),
            ]
        );
    }
}
