//! Hybrid retrieval configuration (spec.md §4.9, §6 `hybrid_search_weights`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub weights: SourceWeights,
    pub relational_weights: SourceWeights,
    pub semantic_only_weights: SourceWeights,
    /// Keyword list driving the relational-query routing heuristic (§4.9).
    pub relational_keywords: Vec<String>,
    pub default_top_k: usize,
    pub rrf_k: u32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            weights: SourceWeights {
                semantic: 0.60,
                lexical: 0.20,
                graph: 0.20,
            },
            relational_weights: SourceWeights {
                semantic: 0.40,
                lexical: 0.20,
                graph: 0.40,
            },
            semantic_only_weights: SourceWeights {
                semantic: 0.80,
                lexical: 0.20,
                graph: 0.0,
            },
            relational_keywords: vec![
                "who", "related", "connected", "linked", "because", "caused",
                "relationship", "between", "knows", "loves", "works with",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            default_top_k: 5,
            rrf_k: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceWeights {
    pub semantic: f64,
    pub lexical: f64,
    pub graph: f64,
}

impl SourceWeights {
    /// Validated at config-load time (spec.md §8: "loading a config where
    /// `|Σ hybrid_search_weights − 1.0| > 1e−6` fails startup").
    pub fn is_valid(&self) -> bool {
        (self.semantic + self.lexical + self.graph - 1.0).abs() <= 1e-6
    }
}
