use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Out-of-band feedback on a retrieval response, used to drive
/// `constitutive_weight` recalibration once `RECALIBRATION_THRESHOLD`
/// unlabeled entries accumulate (spec.md §4.9 IEF).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IefFeedback {
    pub id: i64,
    pub query_id: String,
    pub query_text: String,
    pub helpful: Option<bool>,
    pub feedback_reason: Option<String>,
    pub constitutive_weight_used: f64,
    pub created_at: DateTime<Utc>,
}

impl IefFeedback {
    pub fn new(query_id: impl Into<String>, query_text: impl Into<String>, constitutive_weight_used: f64) -> Self {
        Self {
            id: 0,
            query_id: query_id.into(),
            query_text: query_text.into(),
            helpful: None,
            feedback_reason: None,
            constitutive_weight_used,
            created_at: Utc::now(),
        }
    }
}
