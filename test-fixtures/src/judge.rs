//! A fixed-reward judge double for episode-memory reflection scoring and
//! ground-truth labeling tests (spec.md §6 "Evaluator/judge: (query,
//! context, answer) -> {reward, reasoning}").

use ckg_core::errors::OracleError;
use ckg_core::traits::{Judge, JudgeVerdict};

pub struct FixedJudge {
    pub reward: f64,
}

impl FixedJudge {
    pub fn new(reward: f64) -> Self {
        Self { reward: reward.clamp(-1.0, 1.0) }
    }
}

impl Judge for FixedJudge {
    async fn evaluate(&self, _query: &str, _context: &str, _answer: &str) -> Result<JudgeVerdict, OracleError> {
        Ok(JudgeVerdict { reward: self.reward, reasoning: "fixture judge".to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_the_configured_reward() {
        let judge = FixedJudge::new(0.75);
        let verdict = judge.evaluate("q", "c", "a").await.unwrap();
        assert_eq!(verdict.reward, 0.75);
    }

    #[test]
    fn clamps_out_of_range_reward() {
        assert_eq!(FixedJudge::new(5.0).reward, 1.0);
        assert_eq!(FixedJudge::new(-5.0).reward, -1.0);
    }
}
