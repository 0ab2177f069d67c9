use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An L2 insight: a compressed, embeddable memory derived from raw dialogue
/// or direct authoring (spec.md §3 Insight).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub id: String,
    pub content: String,
    pub embedding: Option<Vec<f32>>,
    pub created_at: DateTime<Utc>,
    pub source_ids: Vec<i64>,
    pub metadata: serde_json::Value,
    pub memory_strength: f64,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
    pub deleted_reason: Option<String>,
    pub tags: Vec<String>,
}

impl Insight {
    pub fn new(content: impl Into<String>, source_ids: Vec<i64>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.into(),
            embedding: None,
            created_at: Utc::now(),
            source_ids,
            metadata: serde_json::Value::Object(Default::default()),
            memory_strength: 0.5,
            is_deleted: false,
            deleted_at: None,
            deleted_by: None,
            deleted_reason: None,
            tags: Vec::new(),
        }
    }
}

/// Actor who performed a mutating action against an insight or proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightHistoryAction {
    Update,
    Delete,
}
