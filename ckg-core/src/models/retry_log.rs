use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row per retried call against an external oracle (spec.md §6
/// `api_retry_log`, §4.2 embedding retry policy).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiRetryLogEntry {
    pub id: i64,
    pub provider: String,
    pub operation: String,
    pub attempt: u32,
    pub delay_seconds: f64,
    pub error: String,
    pub created_at: DateTime<Utc>,
}
