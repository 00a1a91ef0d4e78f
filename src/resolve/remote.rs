//! Resolvers backed by the hosting API.

use crate::ports::github::{GithubApi, RefObject, RepoId};
use crate::repository::module_owner_and_repo;

use super::{ResolveError, ResolveFuture, Resolver, ResolverKind};

/// Annotated tags may point at other tags; give up after this many hops.
const MAX_TAG_DEPTH: usize = 8;

/// Resolves branches, tags or commits through [`GithubApi`].
///
/// Only repositories on GitHub can be resolved this way; any other module
/// fails immediately so the chain moves on to the fetch resolver.
pub struct RemoteResolver<'a> {
    api: &'a dyn GithubApi,
    kind: ResolverKind,
}

impl<'a> RemoteResolver<'a> {
    /// Branch head lookup.
    #[must_use]
    pub fn branch(api: &'a dyn GithubApi) -> Self {
        Self { api, kind: ResolverKind::RemoteBranch }
    }

    /// Tag lookup.
    #[must_use]
    pub fn tag(api: &'a dyn GithubApi) -> Self {
        Self { api, kind: ResolverKind::RemoteTag }
    }

    /// Commit lookup.
    #[must_use]
    pub fn commit(api: &'a dyn GithubApi) -> Self {
        Self { api, kind: ResolverKind::RemoteCommit }
    }

    async fn peel_tag(&self, repo: &RepoId, tag: &str) -> Result<String, ResolveError> {
        let mut object: RefObject =
            self.api.tag_ref(repo, tag).await.map_err(ResolveError::transport)?;
        for _ in 0..MAX_TAG_DEPTH {
            if !object.is_annotated_tag() {
                break;
            }
            object = self.api.tag_object(repo, &object.sha).await.map_err(ResolveError::transport)?;
        }
        if object.kind != "commit" {
            return Err(ResolveError::NotACommit { tag: tag.to_string(), kind: object.kind });
        }
        Ok(object.sha)
    }
}

impl Resolver for RemoteResolver<'_> {
    fn kind(&self) -> ResolverKind {
        self.kind
    }

    fn resolve<'b>(&'b self, module_path: &'b str, name: &'b str) -> ResolveFuture<'b> {
        Box::pin(async move {
            let (owner, repo) = module_owner_and_repo(module_path)?;
            let repo = RepoId::new(owner, repo);
            let sha = match self.kind {
                ResolverKind::RemoteBranch => {
                    self.api.branch_head(&repo, name).await.map_err(ResolveError::transport)?
                }
                ResolverKind::RemoteTag => self.peel_tag(&repo, name).await?,
                _ => name.to_string(),
            };
            self.api.commit(&repo, &sha).await.map_err(ResolveError::transport)
        })
    }
}
