//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the application core and an
//! external system (hosting API, git transport, filesystem, tools).
//! Implementations live in `src/adapters/`.

pub mod filesystem;
pub mod git;
pub mod github;
pub mod shell;

pub use filesystem::FileSystem;
pub use git::{FetchFuture, GitRemote, RemoteRef};
pub use github::{CommitSummary, Comparison, GithubApi, GithubFuture, RefObject, RepoId};
pub use shell::{ShellExecutor, ShellOutput};
