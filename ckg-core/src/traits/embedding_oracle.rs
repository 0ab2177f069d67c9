use crate::errors::EmbeddingError;

/// `text -> vec(D)` (spec.md §6 "Oracles consumed"). Implementations are
/// responsible only for the single call; retry-with-backoff lives in the
/// `ckg-embeddings` gateway that wraps this trait, not here.
#[allow(async_fn_in_trait)]
pub trait EmbeddingOracle: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Dimensionality this oracle produces; used to validate returned
    /// vectors against `EmbeddingConfig::dimensions`.
    fn dimensions(&self) -> usize;
}
