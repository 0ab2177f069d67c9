pub mod decay_config;
pub mod eval_config;
pub mod embedding_config;
pub mod ief_config;
pub mod observability_config;
pub mod retrieval_config;
pub mod smf_config;
pub mod storage_config;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub use decay_config::{DecayConfig, SectorDecayParams};
pub use embedding_config::{EmbeddingConfig, RetryConfig};
pub use eval_config::EvalConfig;
pub use ief_config::{IefConfig, RECALIBRATION_THRESHOLD, W_MIN_CONSTITUTIVE};
pub use observability_config::ObservabilityConfig;
pub use retrieval_config::{RetrievalConfig, SourceWeights};
pub use smf_config::SmfConfig;
pub use storage_config::StorageConfig;

/// Top-level configuration aggregating all subsystem configs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CkgConfig {
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub decay: DecayConfig,
    pub smf: SmfConfig,
    pub ief: IefConfig,
    pub eval: EvalConfig,
    pub observability: ObservabilityConfig,
}

impl CkgConfig {
    /// Load config from a TOML string. Returns `Err` on parse failure or a
    /// validation failure (weights that don't sum to 1.0, an incomplete decay
    /// table); callers are expected to fall back to `CkgConfig::default()` and
    /// log a warning, per spec.md §7 "Config load failure ... hardcoded
    /// defaults take effect".
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigLoadError> {
        let config: Self = toml::from_str(toml_str).map_err(ConfigLoadError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from disk, falling back to defaults with a warning on any failure.
    pub fn load_or_default(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml(&contents) {
                Ok(config) => config,
                Err(e) => {
                    warn!("config at {path:?} invalid ({e}), using hardcoded defaults");
                    Self::default()
                }
            },
            Err(e) => {
                warn!("config at {path:?} unreadable ({e}), using hardcoded defaults");
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        for (name, weights) in [
            ("hybrid_search_weights", self.retrieval.weights),
            ("hybrid_search_weights.relational", self.retrieval.relational_weights),
            ("hybrid_search_weights.semantic_only", self.retrieval.semantic_only_weights),
        ] {
            if !weights.is_valid() {
                return Err(ConfigLoadError::Validation(format!(
                    "{name} must sum to 1.0, got {}",
                    weights.semantic + weights.lexical + weights.graph
                )));
            }
        }
        if !self.decay.is_complete() {
            return Err(ConfigLoadError::Validation(
                "decay_config must define all five sectors".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("parse error: {0}")]
    Parse(toml::de::Error),
    #[error("validation error: {0}")]
    Validation(String),
}
