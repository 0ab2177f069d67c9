//! Store configuration: db path, pool sizing (spec.md §4.1, §5).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
    pub pool_size: u32,
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: "ckg.db".to_string(),
            pool_size: 8,
            busy_timeout_ms: 5000,
        }
    }
}
