//! Candidate replacements extracted from a manifest.

use crate::manifest::Manifest;
use crate::version::Commit;

/// One module whose replacement should be pinned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleReplace {
    /// Module being replaced.
    pub old_path: String,
    /// Version on the replaced side, when the manifest gives one.
    pub old_version: String,
    /// Module the replacement points at; resolution happens against this path.
    pub new_path: String,
    /// Version the manifest currently uses for `new_path`.
    pub current_version: String,
    resolved: Option<Commit>,
}

impl ModuleReplace {
    /// A candidate with nothing resolved yet.
    pub fn new(
        old_path: impl Into<String>,
        old_version: impl Into<String>,
        new_path: impl Into<String>,
        current_version: impl Into<String>,
    ) -> Self {
        Self {
            old_path: old_path.into(),
            old_version: old_version.into(),
            new_path: new_path.into(),
            current_version: current_version.into(),
            resolved: None,
        }
    }

    /// The commit resolution settled on.
    #[must_use]
    pub fn resolved(&self) -> Option<&Commit> {
        self.resolved.as_ref()
    }

    /// Pseudo-version to pin, once resolved.
    #[must_use]
    pub fn new_path_version(&self) -> Option<String> {
        self.resolved.as_ref().map(Commit::pseudo_version)
    }

    /// Records the resolved commit. A candidate is resolved at most once.
    pub(crate) fn set_resolved(&mut self, commit: Commit) {
        debug_assert!(self.resolved.is_none(), "{} resolved twice", self.new_path);
        self.resolved = Some(commit);
    }

    /// The `go mod edit` line pinning this candidate, once resolved.
    #[must_use]
    pub fn directive(&self) -> Option<String> {
        self.new_path_version().map(|version| {
            format!("go mod edit -replace {}={}@\"{version}\"", self.old_path, self.new_path)
        })
    }
}

/// The candidates selected from one manifest for one rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceSet {
    replaces: Vec<ModuleReplace>,
}

impl ReplaceSet {
    /// Collects candidates whose path `select` accepts.
    ///
    /// Replace entries are matched on their new path. Require entries are
    /// matched on their own path and skipped when they are already the
    /// target of a candidate.
    pub fn from_manifest(manifest: &Manifest, mut select: impl FnMut(&str) -> bool) -> Self {
        let mut replaces: Vec<ModuleReplace> = manifest
            .replace
            .iter()
            .filter(|r| select(&r.new.path))
            .map(|r| ModuleReplace::new(&r.old.path, &r.old.version, &r.new.path, &r.new.version))
            .collect();

        for require in &manifest.require {
            let module = &require.module;
            if replaces.iter().any(|r| r.new_path == module.path) || !select(&module.path) {
                continue;
            }
            replaces.push(ModuleReplace::new(&module.path, &module.version, &module.path, &module.version));
        }
        Self { replaces }
    }

    /// Number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.replaces.len()
    }

    /// Whether nothing was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.replaces.is_empty()
    }

    /// Candidates in manifest order.
    pub fn iter(&self) -> std::slice::Iter<'_, ModuleReplace> {
        self.replaces.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, ModuleReplace> {
        self.replaces.iter_mut()
    }

    /// Candidates that resolved.
    pub fn resolved(&self) -> impl Iterator<Item = &ModuleReplace> {
        self.replaces.iter().filter(|r| r.resolved.is_some())
    }

    /// The candidate for `path`, matched on either side of the replacement.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&ModuleReplace> {
        self.replaces.iter().find(|r| r.old_path == path || r.new_path == path)
    }

    /// `(current, resolved)` versions of the candidate for `path`.
    #[must_use]
    pub fn version_for(&self, path: &str) -> Option<(&str, Option<String>)> {
        self.find(path).map(|r| (r.current_version.as_str(), r.new_path_version()))
    }

    /// Edit directives for every resolved candidate, in manifest order.
    #[must_use]
    pub fn directives(&self) -> Vec<String> {
        self.replaces.iter().filter_map(ModuleReplace::directive).collect()
    }
}
