//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::adapters::live::github::DEFAULT_API_URL;
use crate::config::DEFAULT_CONFIG_PATH;

const DEFAULT_GOMOD_PATH: &str = "go.mod";

/// Top-level CLI parser for `goodmod`.
#[derive(Debug, Parser)]
#[command(name = "goodmod", version, about = "Tools to improve life with go mod")]
pub struct Cli {
    /// Hosting API settings shared by every subcommand.
    #[command(flatten)]
    pub github: GithubArgs,

    /// Print progress information.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to execute; help is printed when absent.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// GitHub connection flags.
#[derive(Debug, Clone, Args)]
pub struct GithubArgs {
    /// Access token for the GitHub API; unauthenticated requests are rate limited.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    pub github_token: Option<String>,

    /// Base URL of the GitHub API.
    #[arg(long, default_value = DEFAULT_API_URL, global = true)]
    pub github_api_url: String,
}

/// Where the manifest and rules live.
#[derive(Debug, Clone, Args)]
pub struct FileArgs {
    /// Path to the go.mod file.
    #[arg(long = "gomod-file-path", default_value = DEFAULT_GOMOD_PATH)]
    pub gomod_path: PathBuf,

    /// File to read the replace rules from.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print `go mod edit -replace` lines pinning modules to a branch, tag or commit.
    Replace(ReplaceArgs),
    /// Show how far each replaced module is from the ref its rule tracks.
    Report(FileArgs),
    /// Bump one module to the latest version its rule selects and commit the result.
    Bump(BumpArgs),
}

/// Flags for `goodmod replace`.
#[derive(Debug, Clone, Args)]
pub struct ReplaceArgs {
    /// Branch to pin to.
    #[arg(long, conflicts_with_all = ["tag", "commit"])]
    pub branch: Option<String>,

    /// Tag to pin to.
    #[arg(long, conflicts_with = "commit")]
    pub tag: Option<String>,

    /// Commit to pin to.
    #[arg(long)]
    pub commit: Option<String>,

    /// Module path globs to update, comma separated (eg. 'k8s.io/*').
    #[arg(long, value_delimiter = ',')]
    pub paths: Vec<String>,

    /// Module path globs to leave alone, comma separated.
    #[arg(long, value_delimiter = ',')]
    pub excludes: Vec<String>,

    /// Only use rules listing exactly this path pattern.
    #[arg(long)]
    pub rule: Option<String>,

    /// Run the `go mod edit` commands instead of only printing them.
    #[arg(long)]
    pub apply: bool,

    /// Manifest and rules locations.
    #[command(flatten)]
    pub files: FileArgs,
}

/// Flags for `goodmod bump`.
#[derive(Debug, Clone, Args)]
pub struct BumpArgs {
    /// Module path to bump.
    pub path: String,

    /// List the commits but do not touch go.mod, vendor or git.
    #[arg(long)]
    pub dry_run: bool,

    /// Manifest and rules locations.
    #[command(flatten)]
    pub files: FileArgs,
}
