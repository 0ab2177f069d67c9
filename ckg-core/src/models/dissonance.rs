use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A `NUANCE`-verdict pair awaiting human review (spec.md §4.6 "NUANCE
/// verdicts are additionally placed in a pending-review queue
/// (PENDING_IO_REVIEW)"). Nuance pairs restate the same belief rather than
/// conflicting, so they are never auto-resolved — review is advisory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingIoReview {
    pub id: String,
    pub edge_a_id: String,
    pub edge_b_id: String,
    pub confidence: f64,
    pub context_node: Option<String>,
    pub created_at: DateTime<Utc>,
    pub reviewed: bool,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<String>,
}

impl PendingIoReview {
    pub fn new(edge_a_id: impl Into<String>, edge_b_id: impl Into<String>, confidence: f64, context_node: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            edge_a_id: edge_a_id.into(),
            edge_b_id: edge_b_id.into(),
            confidence,
            context_node,
            created_at: Utc::now(),
            reviewed: false,
            reviewed_at: None,
            reviewed_by: None,
        }
    }
}
