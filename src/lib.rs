//! Core library entry for the `goodmod` CLI.
//!
//! `goodmod` pins go.mod replace directives to the current commit of a
//! branch, a tag or a commit, and reports how far pinned modules lag behind.

pub mod adapters;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod manifest;
pub mod matcher;
pub mod ports;
pub mod replace_set;
pub mod repository;
pub mod resolve;
pub mod version;

pub use error::Error;

use clap::{CommandFactory, Parser};

/// Log filter variable; overrides `--verbose`.
pub const LOG_ENV: &str = "GOODMOD_LOG";

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error when argument parsing fails, no subcommand is given
/// ([`Error::HelpShown`], after printing help), or the command fails.
pub fn run<I, T>(args: I) -> Result<(), Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args)?;
    init_tracing(cli.verbose);

    let Some(command) = &cli.command else {
        cli::Cli::command().print_help().map_err(|e| Error::Io(e.to_string()))?;
        return Err(Error::HelpShown);
    };
    commands::dispatch(command, &cli.github)
}

/// Installs the stderr log subscriber. Safe to call more than once.
fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::run;
    use crate::Error;

    #[test]
    fn run_without_subcommand_shows_help() {
        let result = run(["goodmod"]);
        assert!(matches!(result, Err(Error::HelpShown)));
    }

    #[test]
    fn run_errors_on_unknown_subcommand() {
        let result = run(["goodmod", "unknown"]);
        assert!(matches!(result, Err(Error::Cli(_))));
    }

    #[test]
    fn replace_without_ref_or_rules_is_a_validation_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = dir.path().join("goodmod.yaml");
        let result = run([
            "goodmod".into(),
            "replace".into(),
            "--config".into(),
            config.into_os_string(),
        ]);
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "either branch, commit or tag must be specified");
        assert_eq!(err.exit_code(), 1);
    }
}
