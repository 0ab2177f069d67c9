//! Reciprocal Rank Fusion (spec.md §4.9 "Fusion"), grounded on the teacher's
//! `cortex_retrieval::search::rrf_fusion::fuse` shape: up to three ranked
//! id lists plus a shared lookup map, fused into one `rrf_score`-descending
//! list. `rrf(doc) = Σ w_source / (k + rank_source(doc))`.

use std::collections::HashMap;

use ckg_core::config::SourceWeights;
use ckg_core::models::Insight;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Semantic,
    Lexical,
    Graph,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub insight: Insight,
    pub rrf_score: f64,
    pub sources: Vec<Source>,
}

/// Each list is `(insight_id, rank)` pairs, rank 0-based (0 = best). A
/// missing list (`None`) contributes nothing to the fused score. Ids absent
/// from `insights` are skipped — they fell out of pre-filtering upstream.
pub fn fuse(
    semantic: Option<&Vec<(String, usize)>>,
    lexical: Option<&Vec<(String, usize)>>,
    graph: Option<&Vec<(String, usize)>>,
    insights: &HashMap<String, Insight>,
    weights: SourceWeights,
    k: u32,
) -> Vec<Candidate> {
    let mut scores: HashMap<String, f64> = HashMap::new();
    let mut sources: HashMap<String, Vec<Source>> = HashMap::new();

    let mut accumulate = |list: Option<&Vec<(String, usize)>>, weight: f64, source: Source| {
        let Some(list) = list else { return };
        if weight <= 0.0 {
            return;
        }
        for (id, rank) in list {
            if !insights.contains_key(id) {
                continue;
            }
            *scores.entry(id.clone()).or_insert(0.0) += weight / (k as f64 + *rank as f64 + 1.0);
            sources.entry(id.clone()).or_default().push(source);
        }
    };
    accumulate(semantic, weights.semantic, Source::Semantic);
    accumulate(lexical, weights.lexical, Source::Lexical);
    accumulate(graph, weights.graph, Source::Graph);

    let mut candidates: Vec<Candidate> = scores
        .into_iter()
        .filter_map(|(id, rrf_score)| {
            insights.get(&id).map(|insight| Candidate {
                insight: insight.clone(),
                rrf_score,
                sources: sources.remove(&id).unwrap_or_default(),
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.rrf_score
            .partial_cmp(&a.rrf_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.insight.id.cmp(&b.insight.id))
    });
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use ckg_core::models::Insight;

    fn weights(semantic: f64, lexical: f64, graph: f64) -> SourceWeights {
        SourceWeights { semantic, lexical, graph }
    }

    fn insight_map(ids: &[&str]) -> HashMap<String, Insight> {
        ids.iter()
            .map(|id| {
                let mut insight = Insight::new(format!("content {id}"), vec![]);
                insight.id = id.to_string();
                (id.to_string(), insight)
            })
            .collect()
    }

    #[test]
    fn scores_are_monotonically_decreasing() {
        let insights = insight_map(&["a", "b", "c", "d", "e"]);
        let list: Vec<(String, usize)> = (0..5).map(|i| (["a", "b", "c", "d", "e"][i].to_string(), i)).collect();
        let fused = fuse(Some(&list), None, None, &insights, weights(1.0, 0.0, 0.0), 60);
        for window in fused.windows(2) {
            assert!(window[0].rrf_score >= window[1].rrf_score);
        }
    }

    #[test]
    fn agreement_across_sources_outranks_single_source() {
        let insights = insight_map(&["a", "b"]);
        let semantic = vec![("a".to_string(), 0), ("b".to_string(), 1)];
        let lexical = vec![("a".to_string(), 0), ("b".to_string(), 4)];
        let fused = fuse(Some(&semantic), Some(&lexical), None, &insights, weights(0.6, 0.4, 0.0), 60);
        assert_eq!(fused[0].insight.id, "a");
        assert!(fused[0].sources.contains(&Source::Semantic));
        assert!(fused[0].sources.contains(&Source::Lexical));
    }

    #[test]
    fn zero_weight_source_is_ignored() {
        let insights = insight_map(&["a", "b"]);
        let semantic = vec![("a".to_string(), 1), ("b".to_string(), 0)];
        let graph = vec![("a".to_string(), 0), ("b".to_string(), 1)];
        let fused = fuse(Some(&semantic), None, Some(&graph), &insights, weights(1.0, 0.2, 0.0), 60);
        // graph weight is 0 so only the semantic ranking should decide order.
        assert_eq!(fused[0].insight.id, "b");
    }

    #[test]
    fn ids_missing_from_lookup_are_dropped() {
        let insights = insight_map(&["a"]);
        let semantic = vec![("a".to_string(), 0), ("ghost".to_string(), 1)];
        let fused = fuse(Some(&semantic), None, None, &insights, weights(1.0, 0.0, 0.0), 60);
        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].insight.id, "a");
    }

    #[test]
    fn empty_lists_produce_no_candidates() {
        let insights = insight_map(&["a"]);
        let fused = fuse(None, None, None, &insights, weights(0.6, 0.2, 0.2), 60);
        assert!(fused.is_empty());
    }
}
