//! Errors that end a `goodmod` run.

use crate::config::ConfigError;
use crate::manifest::ParseError;

/// Exit status used when help is printed because no subcommand was given.
pub const HELP_EXIT_CODE: i32 = 255;

/// Fatal conditions surfaced by the command layer.
///
/// Per-module resolution failures are not represented here: they are logged
/// and reported, and only become fatal as [`Error::NothingResolved`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The rules file could not be read or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The manifest could not be parsed.
    #[error(transparent)]
    Manifest(#[from] ParseError),
    /// Flags or arguments are inconsistent.
    #[error("{0}")]
    Validation(String),
    /// The path filter selected no modules.
    #[error("no modules found matching {0}")]
    NoCandidates(String),
    /// Modules were selected but none could be resolved.
    #[error("none of the {0} selected modules could be resolved")]
    NothingResolved(usize),
    /// `--rule` named a pattern that no rule lists.
    #[error("no rule found matching {0:?}")]
    NoRuleMatched(String),
    /// Reading a file or building a client failed.
    #[error("{0}")]
    Io(String),
    /// An external tool exited unsuccessfully.
    #[error("{command} failed: {output}")]
    Tool {
        /// Command line that failed.
        command: String,
        /// Its combined output.
        output: String,
    },
    /// Argument parsing failed.
    #[error(transparent)]
    Cli(#[from] clap::Error),
    /// Help was printed because no subcommand was given.
    #[error("")]
    HelpShown,
}

impl Error {
    /// Process exit status for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::HelpShown => HELP_EXIT_CODE,
            Self::Cli(err) => err.exit_code(),
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(Error::HelpShown.exit_code(), 255);
        assert_eq!(Error::NoCandidates("k8s.io/*".into()).exit_code(), 1);
        assert_eq!(Error::NothingResolved(2).exit_code(), 1);
    }

    #[test]
    fn messages_name_the_problem() {
        assert_eq!(
            Error::NoCandidates("[\"k8s.io/*\"]".into()).to_string(),
            "no modules found matching [\"k8s.io/*\"]"
        );
        let tool = Error::Tool { command: "go mod tidy".into(), output: "boom".into() };
        assert_eq!(tool.to_string(), "go mod tidy failed: boom");
    }
}
