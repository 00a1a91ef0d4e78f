//! `goodmod report` command.

use futures::future::join_all;

use super::{block_on, load_manifest};
use crate::cli::FileArgs;
use crate::config::RulesConfig;
use crate::context::ServiceContext;
use crate::error::Error;
use crate::manifest::Manifest;
use crate::ports::github::GithubApi;
use crate::resolve::history::count_commits_between;
use crate::version::display_version;

const HEADER: [&str; 5] = ["Path", "Current Version", "Tracking Type", "Desired Version", "Updates"];

/// One module in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    /// Module path as required.
    pub path: String,
    /// Where the module is replaced to, when it is.
    pub replace_path: Option<String>,
    /// Version in use, shortened for display.
    pub current_version: String,
    /// `branch`, `tag`, `commit`, `manual` or `required`.
    pub tracking_type: String,
    /// The ref the rule asks for.
    pub desired_version: String,
    /// How far the module lags its branch; empty for other tracking types.
    pub updates: String,
}

/// Execute the `report` command.
///
/// # Errors
///
/// Returns an error when the rules file is missing or invalid, or the
/// manifest cannot be read.
pub fn run(ctx: &ServiceContext, files: &FileArgs) -> Result<(), Error> {
    let Some(config) = RulesConfig::load(ctx.fs.as_ref(), &files.config)? else {
        return Err(Error::Io(format!("rules file {} not found", files.config.display())));
    };
    let manifest_path =
        config.gomod_path.as_ref().map_or_else(|| files.gomod_path.clone(), std::path::PathBuf::from);
    let manifest = load_manifest(ctx, &manifest_path)?;

    let mut rows = build_rows(&manifest, &config);
    block_on(fill_updates(ctx.github.as_ref(), &mut rows))?;
    sort_rows(&mut rows);
    print!("{}", render(&rows));
    Ok(())
}

/// One row per replace entry, then one per require entry not replaced.
#[must_use]
pub fn build_rows(manifest: &Manifest, config: &RulesConfig) -> Vec<ReportRow> {
    let mut rows: Vec<ReportRow> = manifest
        .replace
        .iter()
        .map(|replace| {
            let current_version = display_version(&replace.new.version).to_string();
            let target = config.rule_for_path(&replace.old.path).and_then(|r| r.target().ok());
            let (tracking_type, desired_version) = match &target {
                Some(target) => (target.kind().to_string(), target.display_name().to_string()),
                None => ("manual".to_string(), current_version.clone()),
            };
            ReportRow {
                path: replace.old.path.clone(),
                replace_path: Some(replace.new.path.clone()),
                current_version,
                tracking_type,
                desired_version,
                updates: String::new(),
            }
        })
        .collect();

    for require in &manifest.require {
        let module = &require.module;
        if rows.iter().any(|r| r.path == module.path) {
            continue;
        }
        rows.push(ReportRow {
            path: module.path.clone(),
            replace_path: None,
            current_version: display_version(&module.version).to_string(),
            tracking_type: "required".to_string(),
            desired_version: String::new(),
            updates: String::new(),
        });
    }
    rows
}

/// Queries how far every branch-tracked row lags, all rows concurrently.
pub async fn fill_updates(api: &dyn GithubApi, rows: &mut [ReportRow]) {
    let lookups = rows.iter().map(|row| async move {
        if row.tracking_type != "branch" {
            return None;
        }
        let module = row.replace_path.as_deref().unwrap_or(&row.path);
        let updates =
            match count_commits_between(api, module, &row.current_version, &row.desired_version).await {
                Ok(0) => "up to date".to_string(),
                Ok(n) => format!("{n} commits"),
                Err(err) => err.to_string(),
            };
        Some(updates)
    });
    let results = join_all(lookups).await;
    for (row, updates) in rows.iter_mut().zip(results) {
        if let Some(updates) = updates {
            row.updates = updates;
        }
    }
}

/// Orders rows by path, descending.
pub fn sort_rows(rows: &mut [ReportRow]) {
    rows.sort_by(|a, b| b.path.cmp(&a.path));
}

/// Formats rows as a left-aligned table with `|` separators.
#[must_use]
pub fn render(rows: &[ReportRow]) -> String {
    let cells: Vec<[&str; 5]> = rows
        .iter()
        .map(|r| {
            [
                r.path.as_str(),
                r.current_version.as_str(),
                r.tracking_type.as_str(),
                r.desired_version.as_str(),
                r.updates.as_str(),
            ]
        })
        .collect();

    let mut widths = HEADER.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let line = |row: &[&str; 5]| -> String {
        let padded: Vec<String> =
            row.iter().zip(widths).map(|(cell, width)| format!(" {cell:<width$} ")).collect();
        format!("{}\n", padded.join("|").trim_end())
    };
    let header = HEADER.map(str::to_uppercase);
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();

    let mut out = line(&header.each_ref().map(String::as_str));
    out.push_str(&separator.join("|"));
    out.push('\n');
    for row in &cells {
        out.push_str(&line(row));
    }
    out
}
