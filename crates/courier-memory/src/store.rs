//! In-memory per-user conversation transcripts.
//!
//! One transcript per user id, created lazily on first append, destroyed only
//! by an explicit clear. Nothing is persisted — a process restart starts every
//! conversation fresh.

use dashmap::DashMap;
use tracing::debug;

use courier_core::types::Turn;

/// Per-user transcript store.
///
/// Thread-safe: all mutation goes through dashmap's entry locking, so two
/// concurrent exchanges for the same user cannot interleave their turns.
/// Transcripts are capped at `max_turns`; the oldest turn is evicted first.
pub struct ContextStore {
    transcripts: DashMap<String, Vec<Turn>>,
    max_turns: usize,
}

impl ContextStore {
    pub fn new(max_turns: usize) -> Self {
        Self {
            transcripts: DashMap::new(),
            max_turns,
        }
    }

    /// Snapshot of the transcript for `user_id`. Empty if none exists —
    /// reading never installs an entry.
    pub fn transcript(&self, user_id: &str) -> Vec<Turn> {
        self.transcripts
            .get(user_id)
            .map(|t| t.value().clone())
            .unwrap_or_default()
    }

    /// Append one turn, creating the transcript lazily.
    pub fn append(&self, user_id: &str, turn: Turn) {
        let mut entry = self.transcripts.entry(user_id.to_string()).or_default();
        entry.push(turn);
        Self::enforce_cap(&mut entry, self.max_turns);
    }

    /// Append a user/assistant exchange under one entry lock, so a concurrent
    /// reader never observes half of it.
    pub fn append_exchange(&self, user_id: &str, user_turn: Turn, assistant_turn: Turn) {
        let mut entry = self.transcripts.entry(user_id.to_string()).or_default();
        entry.push(user_turn);
        entry.push(assistant_turn);
        Self::enforce_cap(&mut entry, self.max_turns);
    }

    /// Drop the transcript for `user_id`. Idempotent.
    pub fn clear(&self, user_id: &str) {
        if self.transcripts.remove(user_id).is_some() {
            debug!(user_id, "transcript cleared");
        }
    }

    /// Number of turns currently held for `user_id`.
    pub fn turn_count(&self, user_id: &str) -> usize {
        self.transcripts.get(user_id).map(|t| t.len()).unwrap_or(0)
    }

    fn enforce_cap(turns: &mut Vec<Turn>, max_turns: usize) {
        if max_turns > 0 && turns.len() > max_turns {
            let excess = turns.len() - max_turns;
            turns.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::types::{Role, Turn};

    #[test]
    fn read_does_not_install_an_entry() {
        let store = ContextStore::new(64);
        assert!(store.transcript("alice").is_empty());
        assert_eq!(store.turn_count("alice"), 0);
    }

    #[test]
    fn append_then_read_returns_last_turn() {
        let store = ContextStore::new(64);
        store.append("alice", Turn::user("hi"));
        store.append("alice", Turn::assistant("hello"));

        let transcript = store.transcript("alice");
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.last().unwrap().role, Role::Assistant);
        assert_eq!(transcript.last().unwrap().content, "hello");
    }

    #[test]
    fn transcripts_are_per_user() {
        let store = ContextStore::new(64);
        store.append("alice", Turn::user("from alice"));
        store.append("bob", Turn::user("from bob"));

        assert_eq!(store.transcript("alice").len(), 1);
        assert_eq!(store.transcript("bob").len(), 1);
        assert_eq!(store.transcript("alice")[0].content, "from alice");
    }

    #[test]
    fn clear_is_idempotent() {
        let store = ContextStore::new(64);
        store.append("alice", Turn::user("hi"));
        store.clear("alice");
        assert!(store.transcript("alice").is_empty());
        // clearing an absent transcript is a no-op, not an error
        store.clear("alice");
        store.clear("never-seen");
    }

    #[test]
    fn exchange_records_both_turns_in_order() {
        let store = ContextStore::new(64);
        store.append_exchange("alice", Turn::user("q"), Turn::assistant("a"));

        let transcript = store.transcript("alice");
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].role, Role::User);
        assert_eq!(transcript[1].role, Role::Assistant);
    }

    #[test]
    fn cap_evicts_oldest_first() {
        let store = ContextStore::new(4);
        for i in 0..6 {
            store.append("alice", Turn::user(format!("msg {i}")));
        }
        let transcript = store.transcript("alice");
        assert_eq!(transcript.len(), 4);
        assert_eq!(transcript[0].content, "msg 2");
        assert_eq!(transcript[3].content, "msg 5");
    }

    #[test]
    fn exchange_respects_cap() {
        let store = ContextStore::new(3);
        store.append_exchange("alice", Turn::user("q1"), Turn::assistant("a1"));
        store.append_exchange("alice", Turn::user("q2"), Turn::assistant("a2"));

        let transcript = store.transcript("alice");
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[0].content, "a1");
    }
}
