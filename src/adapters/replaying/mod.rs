//! Replaying adapters that replay recorded interactions.

pub mod git;
pub mod github;

pub use git::ReplayingGitRemote;
pub use github::ReplayingGithubApi;

use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;

use crate::cassette::replayer::CassetteReplayer;

/// Pulls the recorded output for a call out of the shared replayer.
pub(crate) fn next_output(
    replayer: &Arc<Mutex<CassetteReplayer>>,
    port: &str,
    method: &str,
    input: &serde_json::Value,
) -> serde_json::Value {
    let mut guard = replayer.lock().expect("replayer lock poisoned");
    guard.next_interaction(port, method, input).output.clone()
}

/// Turns a recorded `{"Ok": v}` / `{"Err": msg}` output back into a result.
///
/// Mirror of `recording::record_result`.
pub(crate) fn replay_result<T: DeserializeOwned>(
    output: &serde_json::Value,
    context: &str,
) -> Result<T, Box<dyn std::error::Error + Send + Sync>> {
    if let Some(err) = output.get("Err") {
        let msg = err.as_str().unwrap_or("unknown error").to_string();
        return Err(msg.into());
    }
    let value = output.get("Ok").unwrap_or(output);
    serde_json::from_value(value.clone())
        .map_err(|e| format!("{context}: failed to deserialize: {e}").into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn replays_ok_and_err() {
        let ok: String = replay_result(&json!({"Ok": "abc"}), "t").unwrap();
        assert_eq!(ok, "abc");
        let err = replay_result::<String>(&json!({"Err": "404 Not Found"}), "t").unwrap_err();
        assert_eq!(err.to_string(), "404 Not Found");
        let bad = replay_result::<u64>(&json!({"Ok": "x"}), "github::compare").unwrap_err();
        assert!(bad.to_string().starts_with("github::compare"));
    }
}
