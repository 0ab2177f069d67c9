//! Semantic-fidelity heuristic for `compress_to_l2_insight` (spec.md §4.10:
//! "a configurable heuristic over token density, e.g. ratio of noun+verb
//! tokens to total, threshold 0.5"). The exact token classifier isn't
//! pinned down; resolved the same way `ckg-retrieval::intent` resolves its
//! own unspecified keyword heuristic — a closed-class function-word list,
//! with everything else counted as content (the noun/verb-bearing tokens).

use std::sync::OnceLock;

use regex::Regex;

pub const SEMANTIC_FIDELITY_THRESHOLD: f64 = 0.5;

const FUNCTION_WORDS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "i", "you", "he", "she", "it", "we",
    "they", "me", "him", "her", "us", "them", "my", "your", "his", "its", "our", "their",
    "is", "am", "are", "was", "were", "be", "been", "being", "do", "does", "did", "done",
    "have", "has", "had", "will", "would", "shall", "should", "can", "could", "may", "might",
    "must", "of", "in", "on", "at", "to", "for", "with", "by", "from", "as", "into", "onto",
    "about", "and", "or", "but", "nor", "so", "if", "than", "then", "there", "here", "not",
    "no", "yes", "very", "just", "also",
];

fn word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z][A-Za-z0-9_'-]*").unwrap())
}

/// Ratio of content-bearing tokens to total tokens in `text`. An empty or
/// all-function-word input scores `0.0` rather than dividing by zero.
pub fn semantic_fidelity_score(text: &str) -> f64 {
    let words: Vec<&str> = word_regex().find_iter(text).map(|m| m.as_str()).collect();
    if words.is_empty() {
        return 0.0;
    }
    let content = words.iter().filter(|w| !FUNCTION_WORDS.contains(&w.to_lowercase().as_str())).count();
    content as f64 / words.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_dense_text_scores_above_threshold() {
        let score = semantic_fidelity_score("Ethr prefers morning hikes along the coastal trail near Monterey");
        assert!(score >= SEMANTIC_FIDELITY_THRESHOLD, "score was {score}");
    }

    #[test]
    fn function_word_heavy_text_scores_below_threshold() {
        let score = semantic_fidelity_score("it is the that of a in to for with by");
        assert!(score < SEMANTIC_FIDELITY_THRESHOLD, "score was {score}");
    }

    #[test]
    fn empty_text_scores_zero() {
        assert_eq!(semantic_fidelity_score(""), 0.0);
    }
}
