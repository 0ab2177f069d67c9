/// Errors surfaced by the embedding gateway.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("embedding oracle unavailable after {attempts} attempts: {last_error}")]
    Unavailable { attempts: u32, last_error: String },

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
