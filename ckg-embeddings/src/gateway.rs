//! Retry-with-backoff wrapper around an `EmbeddingOracle` (spec.md §4.2).
//!
//! Policy: N=4 retries beyond the initial attempt, delays `1s, 2s, 4s, 8s`
//! each multiplied by a uniform jitter factor in `[0.8, 1.2]`. Every attempt
//! past the first is logged to `api_retry_log`. Exhausting retries surfaces
//! `EmbeddingError::Unavailable`, which the caller treats as fatal on a
//! write path and as a cue to degrade to lexical-only on a read path
//! (spec.md §4.2) — that branch belongs to the caller, not this gateway.

use std::sync::Arc;
use std::time::Duration;

use ckg_core::config::EmbeddingConfig;
use ckg_core::errors::EmbeddingError;
use ckg_core::models::ApiRetryLogEntry;
use ckg_core::traits::EmbeddingOracle;
use ckg_core::{CkgError, CkgResult};
use ckg_storage::queries::logs_ops;
use ckg_storage::StoragePool;

use crate::jitter::jitter_factor;

pub struct EmbeddingGateway<O> {
    oracle: O,
    provider_name: String,
    config: EmbeddingConfig,
    pool: Arc<StoragePool>,
}

impl<O: EmbeddingOracle> EmbeddingGateway<O> {
    pub fn new(oracle: O, provider_name: impl Into<String>, config: EmbeddingConfig, pool: Arc<StoragePool>) -> Self {
        Self { oracle, provider_name: provider_name.into(), config, pool }
    }

    /// Embeds `text`, retrying transient oracle failures. `operation` names
    /// the call site (`"embed_insight"`, `"embed_query"`, ...) for the retry
    /// log.
    pub async fn embed(&self, operation: &str, text: &str) -> CkgResult<Vec<f32>> {
        let max_retries = self.config.retry.max_retries;
        let mut last_error = String::new();

        for attempt in 0..=max_retries {
            if attempt > 0 {
                let delay = self.backoff_delay(attempt);
                self.log_retry(operation, attempt, delay, &last_error)?;
                tokio::time::sleep(delay).await;
            }

            match self.oracle.embed(text).await {
                Ok(vector) => {
                    if vector.len() != self.config.dimensions {
                        return Err(CkgError::Embedding(EmbeddingError::DimensionMismatch {
                            expected: self.config.dimensions,
                            actual: vector.len(),
                        }));
                    }
                    return Ok(vector);
                }
                Err(e) => {
                    last_error = e.to_string();
                    tracing::warn!(operation, attempt, error = %last_error, "embedding oracle call failed");
                }
            }
        }

        Err(CkgError::Embedding(EmbeddingError::Unavailable {
            attempts: max_retries + 1,
            last_error,
        }))
    }

    /// `base_delay_seconds * 2^(attempt - 1)`, jittered — `attempt` is the
    /// 1-based retry number (the delay preceding that retry).
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let base = self.config.retry.base_delay_seconds * 2f64.powi(attempt as i32 - 1);
        let jittered = if self.config.retry.jitter_enabled { base * jitter_factor() } else { base };
        Duration::from_secs_f64(jittered.max(0.0))
    }

    fn log_retry(&self, operation: &str, attempt: u32, delay: Duration, error: &str) -> CkgResult<()> {
        let entry = ApiRetryLogEntry {
            id: 0,
            provider: self.provider_name.clone(),
            operation: operation.to_string(),
            attempt,
            delay_seconds: delay.as_secs_f64(),
            error: error.to_string(),
            created_at: chrono::Utc::now(),
        };
        self.pool.with_writer(|conn| logs_ops::insert_retry_log_entry(conn, &entry))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyOracle {
        fail_times: u32,
        calls: AtomicU32,
        dims: usize,
    }

    impl EmbeddingOracle for FlakyOracle {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_times {
                return Err(EmbeddingError::Unavailable { attempts: 1, last_error: "timeout".to_string() });
            }
            Ok(vec![0.0; self.dims])
        }

        fn dimensions(&self) -> usize {
            self.dims
        }
    }

    fn fast_config() -> EmbeddingConfig {
        EmbeddingConfig {
            dimensions: 4,
            retry: ckg_core::config::RetryConfig { max_retries: 4, base_delay_seconds: 0.001, jitter_enabled: false },
        }
    }

    #[tokio::test]
    async fn succeeds_on_first_try() {
        let pool = StoragePool::open_in_memory().unwrap();
        let oracle = FlakyOracle { fail_times: 0, calls: AtomicU32::new(0), dims: 4 };
        let gw = EmbeddingGateway::new(oracle, "test-oracle", fast_config(), pool);
        let v = gw.embed("embed_query", "hello").await.unwrap();
        assert_eq!(v.len(), 4);
    }

    #[tokio::test]
    async fn recovers_after_transient_failures() {
        let pool = StoragePool::open_in_memory().unwrap();
        let oracle = FlakyOracle { fail_times: 2, calls: AtomicU32::new(0), dims: 4 };
        let gw = EmbeddingGateway::new(oracle, "test-oracle", fast_config(), pool);
        let v = gw.embed("embed_query", "hello").await.unwrap();
        assert_eq!(v.len(), 4);
    }

    #[tokio::test]
    async fn exhausts_retries_and_reports_unavailable() {
        let pool = StoragePool::open_in_memory().unwrap();
        let oracle = FlakyOracle { fail_times: 100, calls: AtomicU32::new(0), dims: 4 };
        let gw = EmbeddingGateway::new(oracle, "test-oracle", fast_config(), pool);
        let err = gw.embed("embed_query", "hello").await.unwrap_err();
        assert_eq!(err.kind(), "EmbeddingUnavailable");
    }

    #[tokio::test]
    async fn dimension_mismatch_is_reported() {
        let pool = StoragePool::open_in_memory().unwrap();
        let oracle = FlakyOracle { fail_times: 0, calls: AtomicU32::new(0), dims: 8 };
        let gw = EmbeddingGateway::new(oracle, "test-oracle", fast_config(), pool);
        let err = gw.embed("embed_query", "hello").await.unwrap_err();
        assert!(matches!(err, CkgError::Embedding(EmbeddingError::DimensionMismatch { .. })));
    }
}
