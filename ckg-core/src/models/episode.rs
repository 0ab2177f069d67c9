use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Episode-memory recall threshold and result cap (spec.md §5 `store_episode`:
/// "cosine ≥ 0.70, top-3 by similarity").
pub const EPISODE_RECALL_MIN_SIMILARITY: f64 = 0.70;
pub const EPISODE_RECALL_TOP_K: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: String,
    pub query: String,
    /// Reward in `[-1, +1]`.
    pub reward: f64,
    pub reflection: String,
    pub embedding: Option<Vec<f32>>,
    pub created_at: DateTime<Utc>,
}

impl Episode {
    pub fn new(query: impl Into<String>, reward: f64, reflection: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            query: query.into(),
            reward: reward.clamp(-1.0, 1.0),
            reflection: reflection.into(),
            embedding: None,
            created_at: Utc::now(),
        }
    }
}
