use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::insight::{Actor, InsightHistoryAction};

/// One row per mutation to an insight. `reason` is required at the API
/// boundary — callers without one are rejected before this type is
/// constructed (spec.md §3 Insight history).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightHistoryEntry {
    pub id: String,
    pub insight_id: String,
    pub action: InsightHistoryAction,
    pub actor: Actor,
    pub old_content: Option<String>,
    pub new_content: Option<String>,
    pub old_memory_strength: Option<f64>,
    pub new_memory_strength: Option<f64>,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl InsightHistoryEntry {
    pub fn new(insight_id: impl Into<String>, action: InsightHistoryAction, actor: Actor, reason: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            insight_id: insight_id.into(),
            action,
            actor,
            old_content: None,
            new_content: None,
            old_memory_strength: None,
            new_memory_strength: None,
            reason: reason.into(),
            created_at: Utc::now(),
        }
    }
}
