//! Mapping Go module paths onto hosted repositories.

/// Host prefix stripped before splitting owner and repository.
pub const GITHUB_URL_PREFIX: &str = "https://github.com/";

const KUBERNETES_VANITY_PREFIX: &str = "k8s.io/";
const KUBERNETES_ORG_URL: &str = "https://github.com/kubernetes/";

/// Errors raised when a repository cannot be located.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// The URL does not contain both an owner and a repository segment.
    #[error("unable to determine owner and repository from {0:?}")]
    MissingOwnerOrRepo(String),
    /// The repository is not hosted on GitHub.
    #[error("{0:?} is not a GitHub repository")]
    NotGithub(String),
}

/// Translates a module import path into the URL of its repository.
///
/// Modules under `k8s.io/` live in the `kubernetes` organization on GitHub;
/// every other path is assumed to be its own `https://` location. Other
/// vanity hosts (`gopkg.in`, `go.uber.org`, ...) are not special cased.
#[must_use]
pub fn repository_url(module_path: &str) -> String {
    match module_path.strip_prefix(KUBERNETES_VANITY_PREFIX) {
        Some(rest) => format!("{KUBERNETES_ORG_URL}{rest}"),
        None => format!("https://{module_path}"),
    }
}

/// Splits a GitHub repository URL into `(owner, repo)`.
///
/// # Errors
///
/// Returns an error when the URL is not under `https://github.com/` or when
/// fewer than two path segments remain after the host prefix is removed.
pub fn github_owner_and_repo(url: &str) -> Result<(String, String), RepositoryError> {
    let rest = url
        .strip_prefix(GITHUB_URL_PREFIX)
        .ok_or_else(|| RepositoryError::NotGithub(url.to_string()))?;
    let mut parts = rest.split('/').filter(|p| !p.is_empty());
    match (parts.next(), parts.next()) {
        (Some(owner), Some(repo)) => Ok((owner.to_string(), repo.to_string())),
        _ => Err(RepositoryError::MissingOwnerOrRepo(url.to_string())),
    }
}

/// Convenience for `github_owner_and_repo(&repository_url(module_path))`.
///
/// # Errors
///
/// See [`github_owner_and_repo`].
pub fn module_owner_and_repo(module_path: &str) -> Result<(String, String), RepositoryError> {
    github_owner_and_repo(&repository_url(module_path))
}
