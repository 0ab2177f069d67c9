use serde::{Deserialize, Serialize};

use crate::errors::OracleError;
use crate::models::Edge;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DissonanceVerdictType {
    Evolution,
    Contradiction,
    Nuance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DissonanceVerdict {
    pub verdict_type: DissonanceVerdictType,
    pub confidence: f64,
}

/// `(edge_a, edge_b) -> {type, confidence}` (spec.md §4.6, §6). This is an
/// oracle, not a library: the production implementation calls out to an
/// external model; a rule-based or fixture-backed double stands in for
/// tests (spec.md §9 "Dissonance classifier replaceability").
#[allow(async_fn_in_trait)]
pub trait DissonanceClassifier: Send + Sync {
    async fn classify(&self, edge_a: &Edge, edge_b: &Edge) -> Result<DissonanceVerdict, OracleError>;
}
