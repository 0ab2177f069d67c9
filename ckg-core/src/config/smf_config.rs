//! SMF configuration (spec.md §4.7, §6 `smf_config`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmfConfig {
    pub undo_retention_days: i64,
    pub approval_timeout_hours: i64,
}

impl Default for SmfConfig {
    fn default() -> Self {
        Self {
            undo_retention_days: 30,
            approval_timeout_hours: 48,
        }
    }
}
