//! Value-weighted re-ranking formula (spec.md §4.8):
//!
//! ```text
//! score = 0.30 * relevance_sector(edge)
//!       + 0.25 * semantic_similarity(query_vec, edge.vector_id or endpoint insight vector)
//!       + 0.20 * recency_score(edge.last_accessed)
//!       + 0.25 * constitutive_weight(edge)
//! ```
//!
//! An IEF candidate is an `Insight` (the unit `ckg-retrieval::hybrid_search`
//! ranks), not an `Edge` directly — spec.md §4.9's candidate set is
//! insight-shaped. The formula is written in terms of an edge, so each
//! insight is mapped to a *representative edge*: the node whose `vector_id`
//! names this insight (the `nodes.vector_id` coupling spec.md §9 calls out
//! as an Open Question), then the most recently touched edge on that node.
//! An insight with no linked node/edge (authored directly, never attached to
//! the graph) falls back to a neutral, edge-free scoring path — see
//! `representative_edge`.

use chrono::{DateTime, Utc};

use ckg_core::config::{IefConfig, W_MIN_CONSTITUTIVE};
use ckg_core::models::{Edge, Insight};
use ckg_core::CkgResult;
use ckg_decay::relevance_score as edge_relevance_score;
use ckg_dissonance::is_comparable;
use ckg_storage::queries::{edge_ops, node_ops};
use ckg_storage::StoragePool;

/// Timescale for `recency_score`. Not itself sector-parameterized by
/// spec.md (only `relevance_sector` is); resolved here by reusing the same
/// Ebbinghaus curve at a fixed 30-day timescale, matching the `S_floor` of
/// the episodic sector as a reasonable "recent" default.
const RECENCY_TAU_DAYS: f64 = 30.0;

pub const WEIGHT_RELEVANCE: f64 = 0.30;
pub const WEIGHT_SEMANTIC: f64 = 0.25;
pub const WEIGHT_RECENCY: f64 = 0.20;
pub const WEIGHT_CONSTITUTIVE: f64 = 0.25;

/// The edge (if any) standing in for an insight in the scoring formula, plus
/// whether that edge touches one of `context_node`'s constitutive edges.
pub struct RepresentativeEdge {
    pub edge: Option<Edge>,
    pub touches_constitutive: bool,
}

/// Resolves the representative edge for `insight`, and whether it (or, when
/// absent, the insight's node itself) touches a constitutive edge of
/// `context_node` — "touches" meaning `ckg_dissonance::is_comparable`
/// (shared relation, or shared node pair) against the edge pool, the same
/// heuristic the dissonance engine uses to decide two edges concern the same
/// claim (spec.md §4.6, reused here rather than inventing a second notion of
/// "touches" for §4.8).
pub fn representative_edge(
    pool: &StoragePool,
    insight: &Insight,
    context_node: Option<&str>,
) -> CkgResult<RepresentativeEdge> {
    let Some(node) = pool.with_reader(|conn| node_ops::get_node_by_vector_id(conn, &insight.id))? else {
        return Ok(RepresentativeEdge { edge: None, touches_constitutive: false });
    };
    let mut edges = pool.with_reader(|conn| edge_ops::get_edges_for_node(conn, &node.id))?;
    edges.sort_by(|a, b| b.last_accessed.cmp(&a.last_accessed));
    let edge = edges.into_iter().next();

    let touches_constitutive = match (&edge, context_node) {
        (Some(e), Some(ctx)) => {
            let constitutive = pool.with_reader(|conn| edge_ops::get_edges_for_node(conn, ctx))?
                .into_iter()
                .filter(|ce| ce.is_constitutive())
                .collect::<Vec<_>>();
            // `e` itself counts as "touching" when it *is* one of context_node's
            // constitutive edges, not only when it's comparable to a distinct one.
            constitutive.iter().any(|ce| ce.id == e.id || is_comparable(ce, e))
        }
        _ => false,
    };

    Ok(RepresentativeEdge { edge, touches_constitutive })
}

/// `relevance_sector(edge)`: the representative edge's Ebbinghaus decay
/// score, or — when the insight carries no representative edge — a neutral
/// score derived the same way from the insight's own `memory_strength` and
/// age, so edge-free insights aren't arbitrarily zeroed out of ranking.
pub fn relevance_sector(
    representative: &Option<Edge>,
    insight: &Insight,
    decay_config: &ckg_core::config::DecayConfig,
    now: DateTime<Utc>,
) -> f64 {
    match representative {
        Some(edge) => edge_relevance_score(edge, decay_config, now),
        None => {
            let days_since = (now - insight.created_at).num_milliseconds() as f64 / 86_400_000.0;
            let strength = (insight.memory_strength.max(0.01)) * 200.0;
            (-days_since.max(0.0) / strength).exp()
        }
    }
}

/// Cosine similarity between two equal-length embedding vectors; `0.0` when
/// either is empty, mismatched, or zero-norm (no similarity signal).
pub fn semantic_similarity(query_vec: &[f32], candidate_vec: &[f32]) -> f64 {
    if query_vec.is_empty() || candidate_vec.is_empty() || query_vec.len() != candidate_vec.len() {
        return 0.0;
    }
    let dot: f32 = query_vec.iter().zip(candidate_vec).map(|(a, b)| a * b).sum();
    let norm_a: f32 = query_vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = candidate_vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    ((dot / (norm_a * norm_b)) as f64).clamp(-1.0, 1.0)
}

/// `recency_score(edge.last_accessed)` — same Ebbinghaus shape as decay, at
/// a fixed timescale (see `RECENCY_TAU_DAYS`), independent of sector.
pub fn recency_score(last_accessed: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let days_since = (now - last_accessed).num_milliseconds() as f64 / 86_400_000.0;
    (-days_since.max(0.0) / RECENCY_TAU_DAYS).exp()
}

/// `constitutive_weight(edge)`: `max(W_MIN_CONSTITUTIVE, config.constitutive_weight)`
/// when the candidate touches one of `context_node`'s constitutive edges,
/// else `1.0`.
pub fn constitutive_weight(touches_constitutive: bool, config: &IefConfig) -> f64 {
    if touches_constitutive {
        config.constitutive_weight.max(W_MIN_CONSTITUTIVE)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_have_similarity_one() {
        let v = vec![1.0_f32, 2.0, 3.0];
        assert!((semantic_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn mismatched_lengths_yield_zero_similarity() {
        assert_eq!(semantic_similarity(&[1.0, 2.0], &[1.0]), 0.0);
    }

    #[test]
    fn recency_decays_toward_zero() {
        let now = Utc::now();
        let fresh = recency_score(now, now);
        let old = recency_score(now - chrono::Duration::days(365), now);
        assert!(fresh > old);
        assert!(old >= 0.0);
    }

    #[test]
    fn constitutive_weight_floors_at_w_min_when_touching() {
        let config = IefConfig { constitutive_weight: 0.1 };
        assert_eq!(constitutive_weight(true, &config), W_MIN_CONSTITUTIVE);
    }

    #[test]
    fn constitutive_weight_is_neutral_when_not_touching() {
        let config = IefConfig { constitutive_weight: 5.0 };
        assert_eq!(constitutive_weight(false, &config), 1.0);
    }
}
