//! A keyword-based neutrality checker double (spec.md §4.7 "Neutrality
//! contract ... prohibited constructs: recommendations, urgency, emotional
//! qualifiers, directive phrasings"). Flags any reasoning field containing
//! one of a small prohibited-word list; otherwise NEUTRAL.

use ckg_core::errors::OracleError;
use ckg_core::models::NeutralReasoning;
use ckg_core::traits::{NeutralityCheckResult, NeutralityChecker, NeutralityVerdict};

const PROHIBITED_WORDS: &[&str] = &[
    "should", "must", "urgent", "immediately", "recommend", "please approve",
    "you need to", "dangerous", "alarming",
];

pub struct KeywordNeutralityChecker;

impl NeutralityChecker for KeywordNeutralityChecker {
    async fn check(&self, reasoning: &NeutralReasoning) -> Result<NeutralityCheckResult, OracleError> {
        let combined = format!(
            "{} {} {} {}",
            reasoning.detected, reasoning.affected, reasoning.if_approved, reasoning.if_rejected
        )
        .to_lowercase();

        if let Some(word) = PROHIBITED_WORDS.iter().find(|w| combined.contains(*w)) {
            return Ok(NeutralityCheckResult {
                verdict: NeutralityVerdict::Biased,
                reason: Some(format!("contains prohibited construct: \"{word}\"")),
            });
        }
        Ok(NeutralityCheckResult { verdict: NeutralityVerdict::Neutral, reason: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reasoning(if_approved: &str) -> NeutralReasoning {
        NeutralReasoning {
            detected: "a contradiction between two HOLDS edges".to_string(),
            affected: "edge_a, edge_b".to_string(),
            if_approved: if_approved.to_string(),
            if_rejected: "edges remain as-is".to_string(),
            neutral_summary: true,
        }
    }

    #[tokio::test]
    async fn plain_template_is_neutral() {
        let result = KeywordNeutralityChecker.check(&reasoning("a resolution edge is recorded")).await.unwrap();
        assert_eq!(result.verdict, NeutralityVerdict::Neutral);
    }

    #[tokio::test]
    async fn directive_language_is_biased() {
        let result = KeywordNeutralityChecker.check(&reasoning("you should approve this immediately")).await.unwrap();
        assert_eq!(result.verdict, NeutralityVerdict::Biased);
    }
}
