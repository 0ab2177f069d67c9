use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A frozen query/expectation pair used by regression suites (spec.md §6
/// `golden_test_set`, and the `test-fixtures` crate that loads them).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldenTestCase {
    pub id: String,
    pub query: String,
    pub expected_doc_ids: Vec<i64>,
    pub sector_filter: Option<Vec<String>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
