use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A labeled query used to score retrieval quality against two independent
/// judges, carrying their agreement (`kappa`) (spec.md §6 data model).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundTruth {
    pub id: i64,
    pub query: String,
    pub expected_docs: Vec<i64>,
    pub judge1_score: Option<f64>,
    pub judge2_score: Option<f64>,
    pub judge1_model: Option<String>,
    pub judge2_model: Option<String>,
    pub kappa: Option<f64>,
    pub created_at: DateTime<Utc>,
}
