use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// L0 raw dialogue row. Append-only — there is no update or delete path
/// (spec.md §3 "Raw dialogue (L0)").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDialogue {
    pub id: i64,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub speaker: String,
    pub content: String,
    pub metadata: serde_json::Value,
}
