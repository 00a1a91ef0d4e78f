//! Command dispatch and handlers.

pub mod bump;
pub mod replace;
pub mod report;

use std::env;
use std::future::Future;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::adapters::live::github::GithubConfig;
use crate::cli::{Command, GithubArgs};
use crate::context::ServiceContext;
use crate::error::Error;
use crate::manifest::Manifest;

/// Records network interactions to the named cassette file.
pub const RECORD_ENV: &str = "GOODMOD_RECORD";
/// Serves network interactions from the named cassette file.
pub const REPLAY_ENV: &str = "GOODMOD_REPLAY";

/// Dispatch a parsed command to its handler.
///
/// When `GOODMOD_REPLAY` names a cassette, the network ports replay it.
/// Otherwise, when `GOODMOD_RECORD` names a file, live network
/// interactions are recorded into it.
///
/// # Errors
///
/// Returns an error if the context cannot be built or the command fails.
pub fn dispatch(command: &Command, github: &GithubArgs) -> Result<(), Error> {
    let ctx = context_from_env(github)?;
    dispatch_with_context(command, &ctx)
}

fn context_from_env(github: &GithubArgs) -> Result<ServiceContext, Error> {
    if let Some(path) = env::var_os(REPLAY_ENV) {
        return ServiceContext::replaying(Path::new(&path));
    }

    let config = GithubConfig {
        api_url: github.github_api_url.clone(),
        token: github.github_token.clone(),
    };
    if !config.is_authenticated() {
        warn!("using GitHub without authentication, set GITHUB_TOKEN if you get rate limited");
    }
    match env::var_os(RECORD_ENV) {
        Some(path) => ServiceContext::recording(Path::new(&path), config),
        None => ServiceContext::live(config),
    }
}

/// Dispatch a command with the given service context.
///
/// # Errors
///
/// Returns an error if the selected command fails.
pub fn dispatch_with_context(command: &Command, ctx: &ServiceContext) -> Result<(), Error> {
    match command {
        Command::Replace(args) => replace::run(ctx, args),
        Command::Report(files) => report::run(ctx, files),
        Command::Bump(args) => bump::run(ctx, args),
    }
}

/// Drives `future` to completion on a single-threaded runtime.
///
/// Resolution is I/O bound; candidates interleave on one thread.
fn block_on<F: Future>(future: F) -> Result<F::Output, Error> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Io(format!("failed to start async runtime: {e}")))?;
    Ok(runtime.block_on(future))
}

/// Reads and parses the manifest at `path`.
fn load_manifest(ctx: &ServiceContext, path: &Path) -> Result<Manifest, Error> {
    let contents = ctx.fs.read_to_string(path).map_err(|e| Error::Io(e.to_string()))?;
    Ok(Manifest::parse(&path.display().to_string(), &contents)?)
}

/// Directory the `go` and `git` tools run in for the manifest at `path`.
fn manifest_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Runs `program args...` in `dir`, failing on a non-zero exit.
fn run_tool(ctx: &ServiceContext, dir: &Path, program: &str, args: &[&str]) -> Result<(), Error> {
    let command = format!("{program} {}", args.join(" "));
    let output = ctx
        .shell
        .run(dir, program, args)
        .map_err(|e| Error::Tool { command: command.clone(), output: e.to_string() })?;
    if !output.success() {
        return Err(Error::Tool { command, output: output.combined() });
    }
    Ok(())
}
