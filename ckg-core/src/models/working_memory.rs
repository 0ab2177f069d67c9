use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Capacity is 8-10 items (spec.md §5 `update_working_memory`); eviction
/// skips any item whose `importance > 0.8`.
pub const WORKING_MEMORY_CAPACITY: usize = 10;
pub const EVICTION_IMPORTANCE_CEILING: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingMemoryItem {
    pub id: String,
    pub content: String,
    pub importance: f64,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
}

impl WorkingMemoryItem {
    pub fn new(content: impl Into<String>, importance: f64) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.into(),
            importance,
            created_at: now,
            last_accessed: now,
        }
    }

    pub fn is_evictable(&self) -> bool {
        self.importance <= EVICTION_IMPORTANCE_CEILING
    }
}

/// An item pushed out of working memory. `reason` is presently always
/// `"LRU_EVICTION"` but is kept as a string to allow other eviction causes
/// later without a schema change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaleMemoryItem {
    pub id: String,
    pub content: String,
    pub importance: f64,
    pub reason: String,
    pub evicted_at: DateTime<Utc>,
}

impl StaleMemoryItem {
    pub fn from_evicted(item: WorkingMemoryItem, reason: impl Into<String>) -> Self {
        Self {
            id: item.id,
            content: item.content,
            importance: item.importance,
            reason: reason.into(),
            evicted_at: Utc::now(),
        }
    }
}
