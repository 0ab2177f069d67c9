//! A deterministic stand-in for the embedding oracle: hashes the input text
//! into a fixed-dimension vector so the same text always embeds to the same
//! point and near-duplicate text embeds nearby, without calling out to a
//! real model (spec.md §6 "Embedding oracle: text -> vec(D)").

use ckg_core::errors::EmbeddingError;
use ckg_core::traits::EmbeddingOracle;

pub struct DeterministicEmbeddingOracle {
    dims: usize,
}

impl DeterministicEmbeddingOracle {
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }
}

impl Default for DeterministicEmbeddingOracle {
    fn default() -> Self {
        Self::new(16)
    }
}

impl EmbeddingOracle for DeterministicEmbeddingOracle {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::Unavailable {
                attempts: 1,
                last_error: "empty input".to_string(),
            });
        }
        let mut vec = vec![0f32; self.dims];
        for (i, byte) in text.bytes().enumerate() {
            vec[i % self.dims] += (byte as f32) / 255.0;
        }
        let norm: f32 = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vec {
                *v /= norm;
            }
        }
        Ok(vec)
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_text_embeds_identically() {
        let oracle = DeterministicEmbeddingOracle::new(8);
        let a = oracle.embed("hello world").await.unwrap();
        let b = oracle.embed("hello world").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn different_text_embeds_differently() {
        let oracle = DeterministicEmbeddingOracle::new(8);
        let a = oracle.embed("hello world").await.unwrap();
        let b = oracle.embed("goodbye moon").await.unwrap();
        assert_ne!(a, b);
    }
}
