//! Relational-query routing heuristic and graph-leg entity extraction
//! (spec.md §4.9). Neither the entity-extraction heuristic nor its exact
//! keyword list is pinned down in the spec ("the fusion-graph keyword
//! extractor is not fully specified" — spec.md Open Questions); the choices
//! here are recorded in DESIGN.md.

use std::sync::OnceLock;

use regex::Regex;

use ckg_core::config::{RetrievalConfig, SourceWeights};

/// Picks the per-source weight profile for one query. An empty graph leg
/// collapses to semantic-only regardless of the relational check (spec.md
/// §4.9: "otherwise when graph recall is empty the split collapses to
/// semantic=0.80, lexical=0.20").
pub fn select_weights(config: &RetrievalConfig, query: &str, graph_leg_empty: bool) -> SourceWeights {
    if graph_leg_empty {
        return config.semantic_only_weights;
    }
    let lowered = query.to_lowercase();
    let is_relational = config.relational_keywords.iter().any(|kw| lowered.contains(kw.as_str()));
    if is_relational {
        config.relational_weights
    } else {
        config.weights
    }
}

fn word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z][A-Za-z0-9_'-]*").unwrap())
}

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "being", "do", "does", "did",
    "what", "who", "whom", "which", "how", "why", "of", "in", "on", "at", "to", "for", "with",
    "and", "or", "but", "this", "that", "these", "those", "it", "its", "i",
];

/// Extracts candidate entity-name tokens from free text: individual words
/// minus stopwords, plus adjacent-word bigrams (so two-word node names have
/// a chance to match), matched case-insensitively against indexed node
/// names by `GraphManager::match_entity_names`.
pub fn extract_entity_candidates(query: &str) -> Vec<String> {
    let words: Vec<String> = word_regex()
        .find_iter(query)
        .map(|m| m.as_str().to_string())
        .filter(|w| !STOPWORDS.contains(&w.to_lowercase().as_str()))
        .collect();

    let mut candidates: Vec<String> = words.clone();
    for pair in words.windows(2) {
        candidates.push(format!("{} {}", pair[0], pair[1]));
    }
    candidates.sort();
    candidates.dedup();
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_non_stopword_tokens_and_bigrams() {
        let candidates = extract_entity_candidates("who is connected to ethr because of trust");
        assert!(candidates.contains(&"ethr".to_string()));
        assert!(candidates.contains(&"trust".to_string()));
        assert!(!candidates.iter().any(|c| c == "who" || c == "is" || c == "to" || c == "of"));
    }

    #[test]
    fn relational_keyword_selects_relational_weights() {
        let config = RetrievalConfig::default();
        let weights = select_weights(&config, "who is connected to ethr?", false);
        assert_eq!(weights, config.relational_weights);
    }

    #[test]
    fn plain_query_selects_default_weights() {
        let config = RetrievalConfig::default();
        let weights = select_weights(&config, "favorite hiking trails", false);
        assert_eq!(weights, config.weights);
    }

    #[test]
    fn empty_graph_leg_collapses_to_semantic_only_even_when_relational() {
        let config = RetrievalConfig::default();
        let weights = select_weights(&config, "who is connected to ethr?", true);
        assert_eq!(weights, config.semantic_only_weights);
    }
}
