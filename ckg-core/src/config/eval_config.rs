//! Ground-truth / staged dual-judge configuration (spec.md §6 `staged_dual_judge`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    pub transition_kappa_threshold: f64,
    pub spot_check_rate: f64,
    pub min_queries_before_transition: u64,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            transition_kappa_threshold: 0.85,
            spot_check_rate: 0.05,
            min_queries_before_transition: 100,
        }
    }
}
