//! `goodmod bump` command.

use tracing::info;

use super::replace::{apply, resolve_rules, ReplaceOutcome};
use super::{block_on, manifest_dir, run_tool};
use crate::cli::BumpArgs;
use crate::config::{Rule, RulesConfig};
use crate::context::ServiceContext;
use crate::error::Error;
use crate::ports::github::CommitSummary;
use crate::resolve::history::{commits_since, summary_line};
use crate::version::short_ref;

const GOMOD_COMMIT_MESSAGE: &str = "bump(*): go.mod changes";
const VENDOR_COMMIT_MESSAGE: &str = "bump(*): go mod vendor";

/// Execute the `bump` command.
///
/// # Errors
///
/// Returns an error when no rule selects the path, the module does not
/// resolve, its versions cannot be compared, or a `go`/`git` step fails.
pub fn run(ctx: &ServiceContext, args: &BumpArgs) -> Result<(), Error> {
    let Some(config) = RulesConfig::load(ctx.fs.as_ref(), &args.files.config)? else {
        return Err(Error::Io(format!("rules file {} not found", args.files.config.display())));
    };
    let rule = rule_for(&config, &args.path)?;
    let manifest_path =
        config.gomod_path.as_ref().map_or_else(|| args.files.gomod_path.clone(), std::path::PathBuf::from);

    let outcome = resolve_rules(ctx, &[rule], &manifest_path)?;
    let commits = list_commits(ctx, &outcome, &args.path)?;
    let lines: Vec<String> = commits.iter().map(summary_line).collect();
    for line in &lines {
        println!("{line}");
    }
    if args.dry_run {
        return Ok(());
    }

    apply(ctx, &outcome)?;
    commit_changes(ctx, &outcome, &lines)
}

/// The rule selecting `path`, narrowed to that path alone.
fn rule_for(config: &RulesConfig, path: &str) -> Result<Rule, Error> {
    let rule = config.rule_for_path(path).ok_or_else(|| Error::NoRuleMatched(path.to_string()))?;
    Ok(Rule { paths: vec![path.to_string()], excludes: Vec::new(), ..rule.clone() })
}

/// Commits between the pinned and the newly resolved version of `path`.
fn list_commits(
    ctx: &ServiceContext,
    outcome: &ReplaceOutcome,
    path: &str,
) -> Result<Vec<CommitSummary>, Error> {
    let (old_version, new_version) = outcome.version_for(path).unwrap_or_default();
    let new_version = new_version.unwrap_or_default();
    if old_version.is_empty() || new_version.is_empty() {
        return Err(Error::Validation(format!(
            "path {path:?} old version ({old_version:?}) or new version ({new_version:?}) is empty"
        )));
    }
    let module = outcome.find(path).map_or(path, |c| c.new_path.as_str());
    let (from, to) = (short_ref(old_version), short_ref(&new_version));
    info!(module, from, to, "listing commits");

    block_on(commits_since(ctx.github.as_ref(), module, to, from))?
        .map_err(|e| Error::Io(format!("listing commits for {module}: {e}")))
}

/// Commits go.mod, then the tidied module files and vendor tree.
fn commit_changes(ctx: &ServiceContext, outcome: &ReplaceOutcome, lines: &[String]) -> Result<(), Error> {
    let dir = manifest_dir(&outcome.manifest_path);
    let mut message = vec![VENDOR_COMMIT_MESSAGE.to_string(), String::new()];
    message.extend_from_slice(lines);
    let message = message.join("\n");

    run_tool(ctx, &dir, "git", &["add", "go.mod"])?;
    run_tool(ctx, &dir, "git", &["commit", "-m", GOMOD_COMMIT_MESSAGE])?;
    run_tool(ctx, &dir, "go", &["mod", "tidy"])?;
    run_tool(ctx, &dir, "go", &["mod", "vendor"])?;
    run_tool(ctx, &dir, "git", &["add", "go.sum", "./vendor"])?;
    run_tool(ctx, &dir, "git", &["commit", "-m", &message])
}
