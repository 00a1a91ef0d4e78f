//! Replays recorded interactions from a cassette.

use std::collections::HashMap;

use super::format::{Cassette, Interaction};

/// Key for indexing interactions by port and method.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
struct PortMethodKey {
    port: String,
    method: String,
}

/// Serves recorded interactions back, per port/method pair.
///
/// Each call consumes the earliest unconsumed interaction whose recorded
/// input equals the requested input, so the order in which concurrent
/// callers arrive does not matter. Repeated identical calls are served in
/// recording order.
pub struct CassetteReplayer {
    /// Per port+method interactions with a consumed flag.
    queues: HashMap<PortMethodKey, Vec<(Interaction, bool)>>,
}

impl CassetteReplayer {
    /// Create a new replayer from a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: HashMap<PortMethodKey, Vec<(Interaction, bool)>> = HashMap::new();
        for interaction in &cassette.interactions {
            let key = PortMethodKey {
                port: interaction.port.clone(),
                method: interaction.method.clone(),
            };
            queues.entry(key).or_default().push((interaction.clone(), false));
        }
        Self { queues }
    }

    /// Return the next interaction for the given port, method and input.
    ///
    /// # Panics
    ///
    /// Panics if the cassette has no (more) interactions for the given
    /// port/method/input, listing what remains so the gap is obvious.
    pub fn next_interaction(
        &mut self,
        port: &str,
        method: &str,
        input: &serde_json::Value,
    ) -> &Interaction {
        let key = PortMethodKey { port: port.to_string(), method: method.to_string() };

        if !self.queues.contains_key(&key) {
            let available: Vec<String> =
                self.queues.keys().map(|k| format!("{}::{}", k.port, k.method)).collect();
            panic!(
                "Cassette exhausted: no interactions recorded for port={port:?} method={method:?}. \
                 Available port::method pairs: [{}]",
                available.join(", ")
            );
        }
        let queue = self.queues.get_mut(&key).expect("queue must exist");

        let position = queue.iter().position(|(i, used)| !used && &i.input == input);
        let Some(position) = position else {
            let remaining: Vec<String> =
                queue.iter().filter(|(_, used)| !used).map(|(i, _)| i.input.to_string()).collect();
            panic!(
                "Cassette exhausted: no unconsumed interaction for port={port:?} method={method:?} \
                 input={input}. Remaining inputs: [{}]",
                remaining.join(", ")
            );
        };

        let entry = &mut queue[position];
        entry.1 = true;
        &entry.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn interaction(seq: u64, method: &str, input: serde_json::Value, output: &str) -> Interaction {
        Interaction {
            seq,
            port: "github".into(),
            method: method.into(),
            input,
            output: json!({ "Ok": output }),
        }
    }

    fn make_cassette(interactions: Vec<Interaction>) -> Cassette {
        Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            tool_version: String::new(),
            interactions,
        }
    }

    #[test]
    fn serves_by_input_regardless_of_call_order() {
        let cassette = make_cassette(vec![
            interaction(0, "branch_head", json!({"repo": "api"}), "a"),
            interaction(1, "branch_head", json!({"repo": "apimachinery"}), "b"),
        ]);
        let mut replayer = CassetteReplayer::new(&cassette);

        let second =
            replayer.next_interaction("github", "branch_head", &json!({"repo": "apimachinery"}));
        assert_eq!(second.seq, 1);
        let first = replayer.next_interaction("github", "branch_head", &json!({"repo": "api"}));
        assert_eq!(first.seq, 0);
    }

    #[test]
    fn identical_inputs_are_served_in_recording_order() {
        let cassette = make_cassette(vec![
            interaction(0, "commit", json!({"sha": "x"}), "first"),
            interaction(1, "commit", json!({"sha": "x"}), "second"),
        ]);
        let mut replayer = CassetteReplayer::new(&cassette);

        let input = json!({"sha": "x"});
        let first = replayer.next_interaction("github", "commit", &input).output.clone();
        let second = replayer.next_interaction("github", "commit", &input).output.clone();
        assert_eq!(first, json!({"Ok": "first"}));
        assert_eq!(second, json!({"Ok": "second"}));
    }

    #[test]
    #[should_panic(expected = "Cassette exhausted")]
    fn exhausted_replayer_panics_with_descriptive_message() {
        let cassette = make_cassette(vec![interaction(0, "commit", json!({}), "a")]);
        let mut replayer = CassetteReplayer::new(&cassette);
        let _ = replayer.next_interaction("github", "commit", &json!({}));
        let _ = replayer.next_interaction("github", "commit", &json!({}));
    }

    #[test]
    #[should_panic(expected = "no interactions recorded")]
    fn unknown_port_panics() {
        let mut replayer = CassetteReplayer::new(&make_cassette(vec![]));
        let _ = replayer.next_interaction("git", "fetch_commit", &json!({}));
    }
}
