//! IEF configuration (spec.md §4.8, §6 `ief_config`).

use serde::{Deserialize, Serialize};

/// Hard floor on the constitutive weight term — never configurable below this.
pub const W_MIN_CONSTITUTIVE: f64 = 1.5;

/// Unlabeled-feedback threshold that triggers recalibration.
pub const RECALIBRATION_THRESHOLD: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IefConfig {
    pub constitutive_weight: f64,
}

impl Default for IefConfig {
    fn default() -> Self {
        Self {
            constitutive_weight: 2.0,
        }
    }
}

impl IefConfig {
    /// The weight actually used: clamped to the hard floor.
    pub fn effective_constitutive_weight(&self) -> f64 {
        self.constitutive_weight.max(W_MIN_CONSTITUTIVE)
    }
}
