use serde::{Deserialize, Serialize};

use crate::errors::OracleError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeVerdict {
    /// Reward in `[-1, +1]`.
    pub reward: f64,
    pub reasoning: String,
}

/// `(query, context, answer) -> {reward, reasoning}` (spec.md §6). Used both
/// for episode-memory reflection scoring and, under `staged_dual_judge`
/// (spec.md §6 eval config), for ground-truth labeling during the
/// single-to-dual-judge transition.
#[allow(async_fn_in_trait)]
pub trait Judge: Send + Sync {
    async fn evaluate(&self, query: &str, context: &str, answer: &str) -> Result<JudgeVerdict, OracleError>;
}
