use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row per external-oracle call (embedding, classifier, judge), used for
/// cost accounting by the (external) budget job (spec.md §6 `api_cost_log`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiCostLogEntry {
    pub id: i64,
    pub provider: String,
    pub operation: String,
    pub tokens_in: u64,
    pub tokens_out: u64,
    pub cost_usd: f64,
    pub created_at: DateTime<Utc>,
}
