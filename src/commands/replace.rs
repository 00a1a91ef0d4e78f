//! `goodmod replace` command.

use std::path::{Path, PathBuf};

use futures::future::join_all;
use tracing::{info, warn};

use super::{block_on, load_manifest, manifest_dir, run_tool};
use crate::cli::ReplaceArgs;
use crate::config::{RefTarget, Rule, RulesConfig};
use crate::context::ServiceContext;
use crate::error::Error;
use crate::matcher::PathMatcher;
use crate::replace_set::{ModuleReplace, ReplaceSet};
use crate::resolve::{ResolutionOrchestrator, ResolutionReport};

/// Candidates of one rule, after resolution.
#[derive(Debug)]
pub struct RuleResolution {
    /// The ref the rule pins to.
    pub target: RefTarget,
    /// The rule's candidates, with resolved commits filled in.
    pub set: ReplaceSet,
}

/// Everything a replace run resolved.
#[derive(Debug)]
pub struct ReplaceOutcome {
    /// Manifest the candidates came from.
    pub manifest_path: PathBuf,
    /// One entry per rule that selected at least one module.
    pub rules: Vec<RuleResolution>,
}

impl ReplaceOutcome {
    /// Edit directives for every resolved candidate, rule by rule.
    #[must_use]
    pub fn directives(&self) -> Vec<String> {
        self.rules.iter().flat_map(|r| r.set.directives()).collect()
    }

    /// The candidate for `path` in whichever rule selected it.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&ModuleReplace> {
        self.rules.iter().find_map(|r| r.set.find(path))
    }

    /// `(current, resolved)` versions for `path`.
    #[must_use]
    pub fn version_for(&self, path: &str) -> Option<(&str, Option<String>)> {
        self.rules.iter().find_map(|r| r.set.version_for(path))
    }
}

/// Execute the `replace` command.
///
/// # Errors
///
/// Returns an error for invalid flags or rules, an unreadable manifest, when
/// nothing matches, when nothing resolves, or when `--apply` fails.
pub fn run(ctx: &ServiceContext, args: &ReplaceArgs) -> Result<(), Error> {
    let (rules, manifest_path) = select_rules(ctx, args)?;
    let outcome = resolve_rules(ctx, &rules, &manifest_path)?;

    for line in outcome.directives() {
        println!("{line}");
    }
    if args.apply {
        apply(ctx, &outcome)?;
    }
    Ok(())
}

/// Picks flag mode or rules-file mode and returns the rules plus the
/// manifest location.
fn select_rules(ctx: &ServiceContext, args: &ReplaceArgs) -> Result<(Vec<Rule>, PathBuf), Error> {
    let flags_given = [&args.branch, &args.tag, &args.commit]
        .iter()
        .any(|f| f.as_deref().is_some_and(|v| !v.is_empty()));

    if flags_given {
        if args.paths.is_empty() {
            return Err(Error::Validation("dependency name must be specified".to_string()));
        }
        let rule = Rule {
            paths: args.paths.clone(),
            excludes: args.excludes.clone(),
            branch: args.branch.clone(),
            tag: args.tag.clone(),
            commit: args.commit.clone(),
        };
        return Ok((vec![rule], args.files.gomod_path.clone()));
    }

    let Some(config) = RulesConfig::load(ctx.fs.as_ref(), &args.files.config)? else {
        return Err(Error::Validation("either branch, commit or tag must be specified".to_string()));
    };
    info!(rules = config.rules.len(), "loaded go.mod rules");
    let manifest_path = config.gomod_path.as_ref().map_or_else(|| args.files.gomod_path.clone(), PathBuf::from);
    let rules = match &args.rule {
        Some(pattern) => {
            let rules = config.select_rule(pattern);
            if rules.is_empty() {
                return Err(Error::NoRuleMatched(pattern.clone()));
            }
            rules
        }
        None => config.rules,
    };
    Ok((rules, manifest_path))
}

/// Builds one candidate set per rule and resolves them all.
///
/// A module belongs to the first rule selecting it, so rules listed earlier
/// take precedence.
///
/// # Errors
///
/// Returns an error for invalid rules or an unreadable manifest,
/// [`Error::NoCandidates`] when no rule selects anything and
/// [`Error::NothingResolved`] when no candidate resolves.
pub fn resolve_rules(
    ctx: &ServiceContext,
    rules: &[Rule],
    manifest_path: &Path,
) -> Result<ReplaceOutcome, Error> {
    let matchers = rules.iter().map(Rule::matcher).collect::<Result<Vec<PathMatcher>, _>>()?;
    let targets = rules.iter().map(Rule::target).collect::<Result<Vec<RefTarget>, _>>()?;
    let manifest = load_manifest(ctx, manifest_path)?;

    let mut pending = Vec::new();
    for (index, (rule, target)) in rules.iter().zip(targets).enumerate() {
        let set = ReplaceSet::from_manifest(&manifest, |path| {
            matchers.iter().position(|m| m.matches(path)) == Some(index)
        });
        if set.is_empty() {
            warn!(paths = ?rule.paths, excludes = ?rule.excludes, "no modules found for rule");
            continue;
        }
        pending.push(RuleResolution { target, set });
    }

    let candidates: usize = pending.iter().map(|r| r.set.len()).sum();
    if candidates == 0 {
        let paths: Vec<&str> = rules.iter().flat_map(|r| r.paths.iter().map(String::as_str)).collect();
        return Err(Error::NoCandidates(format!("{paths:?}")));
    }

    let orchestrator = ResolutionOrchestrator::new(ctx.github.as_ref(), ctx.git.as_ref());
    let resolved = block_on(resolve_each(&orchestrator, &mut pending))?;
    for rule in &pending {
        for candidate in rule.set.resolved() {
            info!(
                module = %candidate.new_path,
                version = %candidate.new_path_version().unwrap_or_default(),
                "using version"
            );
        }
    }

    if resolved == 0 {
        return Err(Error::NothingResolved(candidates));
    }
    Ok(ReplaceOutcome { manifest_path: manifest_path.to_path_buf(), rules: pending })
}

/// Resolves every rule's candidates at once and returns how many resolved.
async fn resolve_each(orchestrator: &ResolutionOrchestrator<'_>, pending: &mut [RuleResolution]) -> usize {
    let reports =
        join_all(pending.iter_mut().map(|rule| orchestrator.resolve_all(&mut rule.set, &rule.target))).await;
    reports.iter().map(ResolutionReport::resolved_count).sum()
}

/// Runs `go mod edit -replace` for every resolved candidate.
///
/// # Errors
///
/// Returns an error when `go` fails.
pub fn apply(ctx: &ServiceContext, outcome: &ReplaceOutcome) -> Result<(), Error> {
    let dir = manifest_dir(&outcome.manifest_path);
    let file = outcome
        .manifest_path
        .file_name()
        .map_or_else(|| "go.mod".to_string(), |f| f.to_string_lossy().into_owned());
    for rule in &outcome.rules {
        for candidate in rule.set.resolved() {
            let Some(version) = candidate.new_path_version() else { continue };
            let replacement = format!("{}={}@{version}", candidate.old_path, candidate.new_path);
            run_tool(ctx, &dir, "go", &["mod", "edit", "-replace", &replacement, &file])?;
        }
    }
    Ok(())
}
