//! A rule-based dissonance classifier double: no model call, just a small
//! set of deterministic heuristics over the two edges' properties (spec.md
//! §9 "the classifier is an oracle, not a library ... a rule-based ...
//! test double").

use ckg_core::errors::OracleError;
use ckg_core::models::Edge;
use ckg_core::traits::{DissonanceClassifier, DissonanceVerdict, DissonanceVerdictType};

/// Classifies by comparing each edge's `properties.value` field (the common
/// shape used by `HOLDS`-style belief edges in spec.md's worked examples):
/// identical values → `NUANCE` (the pair restates the same belief), differing
/// non-null values on the same relation → `CONTRADICTION` unless one side
/// carries `properties.superseded_hint: true`, in which case → `EVOLUTION`.
/// Anything else defaults to `NUANCE` at low confidence.
pub struct RuleBasedDissonanceClassifier;

impl DissonanceClassifier for RuleBasedDissonanceClassifier {
    async fn classify(&self, edge_a: &Edge, edge_b: &Edge) -> Result<DissonanceVerdict, OracleError> {
        let value_a = edge_a.properties.get("value").and_then(|v| v.as_str());
        let value_b = edge_b.properties.get("value").and_then(|v| v.as_str());

        let verdict_type = match (value_a, value_b) {
            (Some(a), Some(b)) if a == b => DissonanceVerdictType::Nuance,
            (Some(_), Some(_)) => {
                let hinted_evolution = edge_a.properties.get("superseded_hint").and_then(|v| v.as_bool()).unwrap_or(false)
                    || edge_b.properties.get("superseded_hint").and_then(|v| v.as_bool()).unwrap_or(false);
                if hinted_evolution {
                    DissonanceVerdictType::Evolution
                } else {
                    DissonanceVerdictType::Contradiction
                }
            }
            _ => DissonanceVerdictType::Nuance,
        };

        let confidence = match verdict_type {
            DissonanceVerdictType::Contradiction | DissonanceVerdictType::Evolution => 0.9,
            DissonanceVerdictType::Nuance => 0.5,
        };

        Ok(DissonanceVerdict { verdict_type, confidence })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn differing_values_classify_as_contradiction() {
        let mut a = Edge::new("I", "free_will", "HOLDS");
        a.properties = json!({"value": "libertarian"});
        let mut b = Edge::new("I", "free_will", "HOLDS");
        b.properties = json!({"value": "compatibilist"});

        let verdict = RuleBasedDissonanceClassifier.classify(&a, &b).await.unwrap();
        assert_eq!(verdict.verdict_type, DissonanceVerdictType::Contradiction);
    }

    #[tokio::test]
    async fn superseded_hint_classifies_as_evolution() {
        let mut a = Edge::new("I", "free_will", "HOLDS");
        a.properties = json!({"value": "libertarian", "superseded_hint": true});
        let mut b = Edge::new("I", "free_will", "HOLDS");
        b.properties = json!({"value": "compatibilist"});

        let verdict = RuleBasedDissonanceClassifier.classify(&a, &b).await.unwrap();
        assert_eq!(verdict.verdict_type, DissonanceVerdictType::Evolution);
    }

    #[tokio::test]
    async fn identical_values_classify_as_nuance() {
        let mut a = Edge::new("I", "free_will", "HOLDS");
        a.properties = json!({"value": "compatibilist"});
        let b = a.clone();

        let verdict = RuleBasedDissonanceClassifier.classify(&a, &b).await.unwrap();
        assert_eq!(verdict.verdict_type, DissonanceVerdictType::Nuance);
    }
}
