//! Resolved commits and their go.mod pseudo-version encoding.
//!
//! A pseudo-version has the form `v0.0.0-<YYYYMMDDhhmmss>-<sha12>` and is
//! always derived from a [`Commit`]; it is never stored on its own.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of commit hash characters carried by a pseudo-version.
pub const SHORT_SHA_LEN: usize = 12;

const PSEUDO_VERSION_PREFIX: &str = "v0.0.0";
const INCOMPATIBLE_SUFFIX: &str = "+incompatible";

/// Errors raised when constructing a [`Commit`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    /// The hash is shorter than a pseudo-version needs.
    #[error("commit hash {0:?} is shorter than {SHORT_SHA_LEN} characters")]
    ShortHash(String),
    /// The hash contains characters outside `[0-9a-f]`.
    #[error("commit hash {0:?} is not hexadecimal")]
    NotHex(String),
}

/// A commit a reference resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCommit", into = "RawCommit")]
pub struct Commit {
    sha: String,
    timestamp: DateTime<Utc>,
}

impl Commit {
    /// Builds a commit from a hex hash and its committer time.
    ///
    /// # Errors
    ///
    /// Returns an error when `sha` has fewer than twelve characters or is not
    /// hexadecimal.
    pub fn new(sha: impl Into<String>, timestamp: DateTime<Utc>) -> Result<Self, VersionError> {
        let sha = sha.into().trim().to_ascii_lowercase();
        if sha.len() < SHORT_SHA_LEN {
            return Err(VersionError::ShortHash(sha));
        }
        if !sha.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(VersionError::NotHex(sha));
        }
        Ok(Self { sha, timestamp })
    }

    /// Full commit hash.
    #[must_use]
    pub fn sha(&self) -> &str {
        &self.sha
    }

    /// First twelve characters of the hash.
    #[must_use]
    pub fn short_sha(&self) -> &str {
        &self.sha[..SHORT_SHA_LEN]
    }

    /// Committer time in UTC.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Encodes the commit as a go.mod pseudo-version.
    #[must_use]
    pub fn pseudo_version(&self) -> String {
        encode(self)
    }
}

impl fmt::Display for Commit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pseudo_version())
    }
}

/// Wire form used by cassettes.
#[derive(Serialize, Deserialize)]
struct RawCommit {
    sha: String,
    timestamp: DateTime<Utc>,
}

impl TryFrom<RawCommit> for Commit {
    type Error = VersionError;

    fn try_from(raw: RawCommit) -> Result<Self, Self::Error> {
        Self::new(raw.sha, raw.timestamp)
    }
}

impl From<Commit> for RawCommit {
    fn from(commit: Commit) -> Self {
        Self { sha: commit.sha, timestamp: commit.timestamp }
    }
}

/// Encodes `commit` as `v0.0.0-<14 digit UTC timestamp>-<12 char hash>`.
#[must_use]
pub fn encode(commit: &Commit) -> String {
    format!(
        "{PSEUDO_VERSION_PREFIX}-{}-{}",
        commit.timestamp.format("%Y%m%d%H%M%S"),
        commit.short_sha()
    )
}

/// Returns the last `-` separated segment of a version.
///
/// For a pseudo-version this is the short commit hash. Any other version
/// (a plain tag such as `v1.2.3`, or `kubernetes-1.16.2`) yields whatever
/// follows its last dash, so callers must accept a tag-like result.
#[must_use]
pub fn short_ref(version: &str) -> &str {
    let version = version.strip_suffix(INCOMPATIBLE_SUFFIX).unwrap_or(version);
    version.rsplit('-').next().unwrap_or(version)
}

/// Formats a manifest version for display.
///
/// Three-part pseudo-versions collapse to their hash; everything else is
/// shown as-is. `+incompatible` is always dropped.
#[must_use]
pub fn display_version(version: &str) -> &str {
    let version = version.strip_suffix(INCOMPATIBLE_SUFFIX).unwrap_or(version);
    let parts: Vec<&str> = version.split('-').collect();
    if parts.len() == 3 {
        parts[2]
    } else {
        version
    }
}
