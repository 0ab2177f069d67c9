//! Property-based tests for ckg-retrieval: RRF monotonic decrease, top-k
//! truncation never exceeding the requested budget, and multi-source
//! agreement outranking a single-source hit.

use std::collections::HashMap;

use ckg_core::config::SourceWeights;
use ckg_core::models::Insight;
use ckg_retrieval::rrf;
use proptest::prelude::*;

fn insight_map(n: usize) -> HashMap<String, Insight> {
    (0..n)
        .map(|i| {
            let mut insight = Insight::new(format!("insight body {i}"), vec![]);
            insight.id = format!("insight-{i}");
            (insight.id.clone(), insight)
        })
        .collect()
}

fn arb_weights() -> impl Strategy<Value = SourceWeights> {
    (0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0).prop_map(|(a, b, c)| {
        let total = (a + b + c).max(1e-9);
        SourceWeights { semantic: a / total, lexical: b / total, graph: c / total }
    })
}

proptest! {
    #[test]
    fn rrf_scores_are_monotonically_decreasing(
        n in 2usize..=50,
        k in 1u32..=100,
        num_lists in 1usize..=3,
        weights in arb_weights(),
    ) {
        let insights = insight_map(n);
        let lists: Vec<Vec<(String, usize)>> = (0..num_lists)
            .map(|_| (0..n).map(|i| (format!("insight-{i}"), i)).collect())
            .collect();

        let semantic = lists.first();
        let lexical = lists.get(1);
        let graph = lists.get(2);
        let fused = rrf::fuse(semantic, lexical, graph, &insights, weights, k);

        for window in fused.windows(2) {
            prop_assert!(window[0].rrf_score >= window[1].rrf_score);
        }
    }

    #[test]
    fn top_k_truncation_never_exceeds_budget(
        n in 1usize..=200,
        top_k in 1usize..=50,
    ) {
        let insights = insight_map(n);
        let semantic: Vec<(String, usize)> = (0..n).map(|i| (format!("insight-{i}"), i)).collect();
        let weights = SourceWeights { semantic: 1.0, lexical: 0.0, graph: 0.0 };
        let mut fused = rrf::fuse(Some(&semantic), None, None, &insights, weights, 60);
        fused.truncate(top_k);
        prop_assert!(fused.len() <= top_k);
    }

    #[test]
    fn top_ranked_in_every_list_outranks_bottom_ranked_in_every_list(n in 2usize..=30) {
        let insights = insight_map(n);
        // "first" sits at rank 0 in both lists; "last" sits at the worst rank in both.
        let semantic: Vec<(String, usize)> = (0..n).map(|i| (format!("insight-{i}"), i)).collect();
        let lexical: Vec<(String, usize)> = (0..n).map(|i| (format!("insight-{i}"), i)).collect();
        let weights = SourceWeights { semantic: 0.6, lexical: 0.4, graph: 0.0 };
        let fused = rrf::fuse(Some(&semantic), Some(&lexical), None, &insights, weights, 60);

        let first_score = fused.iter().find(|c| c.insight.id == "insight-0").unwrap().rrf_score;
        let last_score = fused.iter().find(|c| c.insight.id == format!("insight-{}", n - 1)).unwrap().rrf_score;
        prop_assert!(first_score >= last_score);
    }
}
