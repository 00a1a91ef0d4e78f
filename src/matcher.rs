//! Glob include/exclude filtering over module paths.
//!
//! Patterns use shell glob syntax where `*` also crosses `/`, so
//! `k8s.io/*` selects `k8s.io/client-go` and `k8s.io/api/foo` alike, while a
//! pattern without wildcards must equal the whole path.

use glob::{MatchOptions, Pattern, PatternError};

const OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Compiled include and exclude glob sets.
#[derive(Debug, Clone, Default)]
pub struct PathMatcher {
    includes: Vec<Pattern>,
    excludes: Vec<Pattern>,
}

impl PathMatcher {
    /// Compiles the include and exclude patterns.
    ///
    /// # Errors
    ///
    /// Returns the offending pattern and the parse error when any pattern is
    /// not a valid glob.
    pub fn new<S: AsRef<str>>(
        includes: &[S],
        excludes: &[S],
    ) -> Result<Self, (String, PatternError)> {
        Ok(Self { includes: compile(includes)?, excludes: compile(excludes)? })
    }

    /// Returns `true` when `path` hits an include pattern and no exclude
    /// pattern. An empty include set matches nothing.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        for include in &self.includes {
            let excluded = self.excludes.iter().any(|e| e.matches_with(path, OPTIONS));
            if !excluded && include.matches_with(path, OPTIONS) {
                return true;
            }
        }
        false
    }
}

fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Pattern>, (String, PatternError)> {
    patterns
        .iter()
        .map(|p| Pattern::new(p.as_ref()).map_err(|e| (p.as_ref().to_string(), e)))
        .collect()
}

/// One-shot form of [`PathMatcher::matches`].
///
/// Invalid patterns never match.
#[must_use]
pub fn matches<S: AsRef<str>>(path: &str, includes: &[S], excludes: &[S]) -> bool {
    let compile_lossy = |patterns: &[S]| -> Vec<Pattern> {
        patterns.iter().filter_map(|p| Pattern::new(p.as_ref()).ok()).collect()
    };
    PathMatcher { includes: compile_lossy(includes), excludes: compile_lossy(excludes) }
        .matches(path)
}
