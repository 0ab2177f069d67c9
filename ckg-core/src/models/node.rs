use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A node in the knowledge graph. Identity is the surrogate `id`, but
/// `(label, name)` is the idempotent upsert key (spec.md §3 Node).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub name: String,
    pub properties: serde_json::Value,
    /// Points at the `l2_insights` row carrying this node's embedding, if any.
    pub vector_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Node {
    pub fn new(label: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            label: label.into(),
            name: name.into(),
            properties: serde_json::Value::Object(Default::default()),
            vector_id: None,
            created_at: Utc::now(),
        }
    }
}
