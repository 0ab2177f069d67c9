use serde::{Deserialize, Serialize};

use crate::errors::OracleError;
use crate::models::NeutralReasoning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeutralityVerdict {
    Neutral,
    Biased,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeutralityCheckResult {
    pub verdict: NeutralityVerdict,
    pub reason: Option<String>,
}

/// `text -> {NEUTRAL | BIASED, reason}` (spec.md §4.7 "Neutrality contract",
/// §6). Rejects proposal reasoning containing recommendations, urgency,
/// emotional qualifiers, or directive phrasings.
#[allow(async_fn_in_trait)]
pub trait NeutralityChecker: Send + Sync {
    async fn check(&self, reasoning: &NeutralReasoning) -> Result<NeutralityCheckResult, OracleError>;
}
