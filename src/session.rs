use std::collections::HashMap;
use std::sync::Mutex;

use crate::summarize::{ChatTurn, Role};

/// Oldest turns are dropped once a session grows past this.
const MAX_TURNS_PER_SESSION: usize = 64;

/// In-memory conversation store for /chat, keyed by a caller-supplied session
/// id. Sessions the caller never names share nothing; there is no implicit
/// process-wide conversation.
#[derive(Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<String, Vec<ChatTurn>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        SessionStore::default()
    }

    /// Snapshot of a session's history, oldest first. Unknown ids are empty.
    pub fn history(&self, session_id: &str) -> Vec<ChatTurn> {
        self.inner
            .lock()
            .map(|map| map.get(session_id).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    /// Record one user/model exchange against a session.
    pub fn append_exchange(&self, session_id: &str, user_text: &str, model_text: &str) {
        let Ok(mut map) = self.inner.lock() else {
            return;
        };
        let turns = map.entry(session_id.to_string()).or_default();
        turns.push(ChatTurn {
            role: Role::User,
            text: user_text.to_string(),
        });
        turns.push(ChatTurn {
            role: Role::Model,
            text: model_text.to_string(),
        });
        if turns.len() > MAX_TURNS_PER_SESSION {
            let excess = turns.len() - MAX_TURNS_PER_SESSION;
            turns.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_session_is_empty() {
        let store = SessionStore::new();
        assert!(store.history("nope").is_empty());
    }

    #[test]
    fn test_append_and_history() {
        let store = SessionStore::new();
        store.append_exchange("s1", "hello", "hi there");
        let history = store.history("s1");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].text, "hello");
        assert_eq!(history[1].role, Role::Model);
        assert_eq!(history[1].text, "hi there");
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        store.append_exchange("a", "question a", "answer a");
        store.append_exchange("b", "question b", "answer b");
        assert_eq!(store.history("a").len(), 2);
        assert_eq!(store.history("b")[0].text, "question b");
    }

    #[test]
    fn test_history_is_bounded() {
        let store = SessionStore::new();
        for i in 0..(MAX_TURNS_PER_SESSION) {
            store.append_exchange("s", &format!("q{i}"), &format!("a{i}"));
        }
        let history = store.history("s");
        assert_eq!(history.len(), MAX_TURNS_PER_SESSION);
        // Oldest turns were evicted.
        assert_ne!(history[0].text, "q0");
    }
}
