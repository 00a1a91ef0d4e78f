//! Rules file (`goodmod.yaml`) describing which modules track which refs.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::matcher::PathMatcher;
use crate::ports::FileSystem;

/// Default rules file name.
pub const DEFAULT_CONFIG_PATH: &str = "goodmod.yaml";

/// Errors raised while loading or interpreting the rules file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("error reading {path:?}: {message}")]
    Read {
        /// Rules file path.
        path: String,
        /// Underlying error text.
        message: String,
    },
    /// The file is not valid YAML for [`RulesConfig`].
    #[error("error parsing {path:?}: {source}")]
    Parse {
        /// Rules file path.
        path: String,
        /// Deserialization error.
        source: serde_yaml::Error,
    },
    /// A rule sets zero or several of branch, tag and commit.
    #[error("rule for {paths:?} must set exactly one of branch, tag or commit")]
    AmbiguousTarget {
        /// The rule's include patterns.
        paths: Vec<String>,
    },
    /// A rule has a pattern that is not a valid glob.
    #[error("invalid path pattern {pattern:?}: {message}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Glob parser message.
        message: String,
    },
}

/// Which ref a module should be pinned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefTarget {
    /// Head of a branch.
    Branch(String),
    /// A tag (lightweight or annotated).
    Tag(String),
    /// A commit hash.
    Commit(String),
}

impl RefTarget {
    /// Builds a target from the three optional selectors, requiring exactly
    /// one of them to be non-empty.
    #[must_use]
    pub fn from_parts(
        branch: Option<&str>,
        tag: Option<&str>,
        commit: Option<&str>,
    ) -> Option<Self> {
        let present = |v: Option<&str>| v.filter(|s| !s.is_empty()).map(str::to_string);
        match (present(branch), present(tag), present(commit)) {
            (Some(b), None, None) => Some(Self::Branch(b)),
            (None, Some(t), None) => Some(Self::Tag(t)),
            (None, None, Some(c)) => Some(Self::Commit(c)),
            _ => None,
        }
    }

    /// Ref name to resolve.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Branch(n) | Self::Tag(n) | Self::Commit(n) => n,
        }
    }

    /// `branch`, `tag` or `commit`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Branch(_) => "branch",
            Self::Tag(_) => "tag",
            Self::Commit(_) => "commit",
        }
    }

    /// The desired version as shown in reports; commits are cut to twelve
    /// characters.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Commit(c) => c.get(..crate::version::SHORT_SHA_LEN).unwrap_or(c),
            other => other.name(),
        }
    }
}

impl fmt::Display for RefTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.name())
    }
}

/// One rule from the rules file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Include globs.
    pub paths: Vec<String>,
    /// Exclude globs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<String>,
    /// Branch to track.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Tag to pin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Commit to pin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

impl Rule {
    /// The ref this rule pins to.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AmbiguousTarget`] unless exactly one of branch,
    /// tag and commit is set.
    pub fn target(&self) -> Result<RefTarget, ConfigError> {
        RefTarget::from_parts(self.branch.as_deref(), self.tag.as_deref(), self.commit.as_deref())
            .ok_or_else(|| ConfigError::AmbiguousTarget { paths: self.paths.clone() })
    }

    /// Compiles the rule's include and exclude globs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] for a malformed glob.
    pub fn matcher(&self) -> Result<PathMatcher, ConfigError> {
        PathMatcher::new(&self.paths, &self.excludes).map_err(|(pattern, e)| {
            ConfigError::InvalidPattern { pattern, message: e.to_string() }
        })
    }

    /// Returns `true` when `module_path` is selected by this rule.
    #[must_use]
    pub fn matches(&self, module_path: &str) -> bool {
        crate::matcher::matches(module_path, &self.paths, &self.excludes)
    }
}

/// Parsed rules file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Rules in priority order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,
    /// Manifest location override.
    #[serde(default, rename = "gomodPath", skip_serializing_if = "Option::is_none")]
    pub gomod_path: Option<String>,
}

impl RulesConfig {
    /// Parses and validates YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error when the YAML is malformed or a rule is invalid.
    pub fn parse(path: &str, contents: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(contents)
            .map_err(|source| ConfigError::Parse { path: path.to_string(), source })?;
        for rule in &config.rules {
            rule.target()?;
            rule.matcher()?;
        }
        Ok(config)
    }

    /// Loads the rules file through the filesystem port.
    ///
    /// A missing file is not an error: `Ok(None)` lets callers fall back to
    /// flag-driven mode.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Option<Self>, ConfigError> {
        if !fs.exists(path) {
            return Ok(None);
        }
        let display = path.display().to_string();
        let contents = fs
            .read_to_string(path)
            .map_err(|e| ConfigError::Read { path: display.clone(), message: e.to_string() })?;
        Self::parse(&display, &contents).map(Some)
    }

    /// First rule selecting `module_path`.
    #[must_use]
    pub fn rule_for_path(&self, module_path: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.matches(module_path))
    }

    /// Keeps only rules listing `pattern` verbatim, narrowed to that pattern.
    #[must_use]
    pub fn select_rule(&self, pattern: &str) -> Vec<Rule> {
        self.rules
            .iter()
            .filter(|r| r.paths.iter().any(|p| p == pattern))
            .map(|r| Rule { paths: vec![pattern.to_string()], ..r.clone() })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &str = r#"
gomodPath: hack/go.mod
rules:
  - paths: ["k8s.io/*"]
    excludes: ["k8s.io/klog*"]
    tag: kubernetes-1.16.2
  - paths:
      - github.com/openshift/*
      - k8s.io/klog
    branch: master
  - paths: ["github.com/pkg/errors"]
    commit: ba968bfe8b2f7e042a574c888954fccecfa385b4
"#;

    #[test]
    fn parses_rules_and_targets() {
        let config = RulesConfig::parse("goodmod.yaml", RULES).unwrap();
        assert_eq!(config.gomod_path.as_deref(), Some("hack/go.mod"));
        assert_eq!(config.rules.len(), 3);
        assert_eq!(config.rules[0].target().unwrap(), RefTarget::Tag("kubernetes-1.16.2".into()));
        assert_eq!(config.rules[1].target().unwrap(), RefTarget::Branch("master".into()));
        assert_eq!(config.rules[2].target().unwrap().display_name(), "ba968bfe8b2f");
    }

    #[test]
    fn rule_for_path_honours_excludes_and_order() {
        let config = RulesConfig::parse("goodmod.yaml", RULES).unwrap();
        assert_eq!(config.rule_for_path("k8s.io/api").unwrap().tag.as_deref(), Some("kubernetes-1.16.2"));
        assert_eq!(config.rule_for_path("k8s.io/klog").unwrap().branch.as_deref(), Some("master"));
        assert!(config.rule_for_path("golang.org/x/net").is_none());
    }

    #[test]
    fn rule_needs_exactly_one_target() {
        let both = "rules:\n  - paths: [a]\n    branch: master\n    tag: v1\n";
        assert!(matches!(
            RulesConfig::parse("goodmod.yaml", both),
            Err(ConfigError::AmbiguousTarget { .. })
        ));
        let none = "rules:\n  - paths: [a]\n";
        assert!(RulesConfig::parse("goodmod.yaml", none).is_err());
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = RulesConfig::parse("goodmod.yaml", "rules: {paths: [").unwrap_err();
        assert!(err.to_string().starts_with("error parsing \"goodmod.yaml\""));
    }

    #[test]
    fn select_rule_narrows_paths() {
        let config = RulesConfig::parse("goodmod.yaml", RULES).unwrap();
        let selected = config.select_rule("k8s.io/klog");
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].paths, vec!["k8s.io/klog".to_string()]);
        assert_eq!(selected[0].branch.as_deref(), Some("master"));
        assert!(config.select_rule("k8s.io/nope").is_empty());
    }

    #[test]
    fn target_from_parts_ignores_empty_values() {
        assert_eq!(
            RefTarget::from_parts(Some(""), Some("v1.0.0"), None),
            Some(RefTarget::Tag("v1.0.0".into()))
        );
        assert_eq!(RefTarget::from_parts(None, None, None), None);
        assert_eq!(RefTarget::from_parts(Some("a"), None, Some("b")), None);
    }
}
