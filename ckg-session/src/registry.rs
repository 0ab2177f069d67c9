//! In-process session bookkeeping: per-session token/query analytics and
//! sent-memory dedup, modeled directly on the teacher's
//! `cortex_session::SessionManager` (`DashMap`-backed registry,
//! `mark_memory_sent`/`record_query`/`session_duration`/`remove_session`).
//! Orthogonal to the persisted write-through operations in `engine.rs` — a
//! session exists only as long as the host process keeps it registered.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub tokens_sent: u64,
    pub queries_made: u64,
    pub loaded_memories: HashSet<String>,
}

impl SessionContext {
    fn new(session_id: String) -> Self {
        Self {
            session_id,
            created_at: Utc::now(),
            tokens_sent: 0,
            queries_made: 0,
            loaded_memories: HashSet::new(),
        }
    }

    pub fn session_duration(&self) -> Duration {
        Utc::now() - self.created_at
    }
}

#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, SessionContext>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self { sessions: DashMap::new() }
    }

    /// Idempotent: registering an already-known session id is a no-op and
    /// returns the existing context's id.
    pub fn create_session(&self, session_id: impl Into<String>) -> String {
        let session_id = session_id.into();
        self.sessions.entry(session_id.clone()).or_insert_with(|| SessionContext::new(session_id.clone()));
        session_id
    }

    pub fn get_session(&self, session_id: &str) -> Option<SessionContext> {
        self.sessions.get(session_id).map(|entry| entry.clone())
    }

    /// Marks `memory_id` as sent in `session_id`, adding `tokens` to the
    /// running total regardless of whether the memory was already sent
    /// (re-sends still cost tokens; the dedup set only tracks distinct ids).
    pub fn mark_memory_sent(&self, session_id: &str, memory_id: &str, tokens: u64) {
        if let Some(mut ctx) = self.sessions.get_mut(session_id) {
            ctx.tokens_sent += tokens;
            ctx.loaded_memories.insert(memory_id.to_string());
        }
    }

    pub fn record_query(&self, session_id: &str) {
        if let Some(mut ctx) = self.sessions.get_mut(session_id) {
            ctx.queries_made += 1;
        }
    }

    pub fn is_memory_sent(&self, session_id: &str, memory_id: &str) -> bool {
        self.sessions.get(session_id).map(|ctx| ctx.loaded_memories.contains(memory_id)).unwrap_or(false)
    }

    pub fn remove_session(&self, session_id: &str) -> Option<SessionContext> {
        self.sessions.remove(session_id).map(|(_, ctx)| ctx)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_tracks_tokens_queries_and_dedup() {
        let registry = SessionRegistry::new();
        registry.create_session("sess-001");
        assert_eq!(registry.session_count(), 1);

        registry.mark_memory_sent("sess-001", "mem-a", 150);
        registry.mark_memory_sent("sess-001", "mem-b", 200);
        registry.record_query("sess-001");
        registry.record_query("sess-001");

        let ctx = registry.get_session("sess-001").unwrap();
        assert_eq!(ctx.tokens_sent, 350);
        assert_eq!(ctx.queries_made, 2);
        assert_eq!(ctx.loaded_memories.len(), 2);

        registry.mark_memory_sent("sess-001", "mem-a", 100);
        let after_dup = registry.get_session("sess-001").unwrap();
        assert_eq!(after_dup.loaded_memories.len(), 2, "dedup set doesn't grow on a re-send");
        assert_eq!(after_dup.tokens_sent, 450, "tokens still accrue on a re-send");

        assert!(registry.is_memory_sent("sess-001", "mem-a"));
        assert!(!registry.is_memory_sent("sess-001", "mem-c"));

        assert!(registry.remove_session("sess-001").is_some());
        assert_eq!(registry.session_count(), 0);
        assert!(registry.get_session("sess-001").is_none());
    }

    #[test]
    fn create_session_is_idempotent() {
        let registry = SessionRegistry::new();
        registry.create_session("sess-001");
        registry.record_query("sess-001");
        registry.create_session("sess-001");
        assert_eq!(registry.session_count(), 1);
        assert_eq!(registry.get_session("sess-001").unwrap().queries_made, 1);
    }
}
