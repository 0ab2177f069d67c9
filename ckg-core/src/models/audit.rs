use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only record of every mutation attempt on edges, including blocked
/// ones, keyed by actor and reason (spec.md §3 Audit log, §4.1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub edge_id: Option<String>,
    pub action: String,
    pub blocked: bool,
    pub reason: Option<String>,
    pub actor: String,
    pub properties: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(action: impl Into<String>, actor: impl Into<String>) -> Self {
        Self {
            id: 0,
            edge_id: None,
            action: action.into(),
            blocked: false,
            reason: None,
            actor: actor.into(),
            properties: serde_json::Value::Object(Default::default()),
            created_at: Utc::now(),
        }
    }

    pub fn blocked_with_reason(mut self, reason: impl Into<String>) -> Self {
        self.blocked = true;
        self.reason = Some(reason.into());
        self
    }

    pub fn for_edge(mut self, edge_id: impl Into<String>) -> Self {
        self.edge_id = Some(edge_id.into());
        self
    }
}
