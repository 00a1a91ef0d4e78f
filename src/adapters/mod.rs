//! Adapter implementations for port traits.
//!
//! - `live`: real implementations (HTTP, git CLI, disk, processes)
//! - `recording`: wrap live adapters and capture interactions to a cassette
//! - `replaying`: serve interactions back from a cassette

pub mod live;
pub mod recording;
pub mod replaying;

use serde_json::{Map, Value};

use crate::ports::github::RepoId;

/// Cassette input for a hosting API call: the repository plus named arguments.
///
/// Recording and replaying both build inputs here so they always agree.
pub(crate) fn github_input(repo: &RepoId, args: &[(&str, &str)]) -> Value {
    let mut map = Map::new();
    map.insert("owner".into(), Value::String(repo.owner.clone()));
    map.insert("repo".into(), Value::String(repo.repo.clone()));
    for (key, value) in args {
        map.insert((*key).to_string(), Value::String((*value).to_string()));
    }
    Value::Object(map)
}

/// Cassette input for a git fetch.
pub(crate) fn fetch_input(url: &str, reference: &crate::ports::git::RemoteRef) -> Value {
    serde_json::json!({ "url": url, "reference": reference })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::git::RemoteRef;
    use serde_json::json;

    #[test]
    fn inputs_have_stable_shape() {
        let repo = RepoId::new("kubernetes", "api");
        assert_eq!(
            github_input(&repo, &[("branch", "master")]),
            json!({"owner": "kubernetes", "repo": "api", "branch": "master"})
        );
        assert_eq!(
            fetch_input("https://github.com/kubernetes/api", &RemoteRef::Tag("v1".into())),
            json!({
                "url": "https://github.com/kubernetes/api",
                "reference": {"kind": "tag", "name": "v1"}
            })
        );
    }
}
