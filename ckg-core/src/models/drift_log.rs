use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day's retrieval-quality snapshot, used by the (external) drift
/// monitor to detect embedding-model regression over time (spec.md §6
/// `model_drift_log`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDriftLogEntry {
    pub date: NaiveDate,
    pub precision_at_5: f64,
    pub num_queries: u64,
    pub avg_retrieval_time_ms: f64,
    pub embedding_model_version: String,
    pub drift_detected: bool,
    pub baseline_p5: f64,
}
