//! Candidate enumeration for `dissonance_check` (spec.md §4.6).

use std::collections::{HashMap, HashSet};

use chrono::{Duration, Utc};

use ckg_core::models::Edge;
use ckg_core::{CkgError, CkgResult};
use ckg_storage::queries::edge_ops;
use ckg_storage::StoragePool;

/// Trailing window for `scope = "recent"` — edges modified or accessed
/// within the last 30 days.
const RECENT_WINDOW_DAYS: i64 = 30;

/// Hard cap on pairs submitted to the classifier per invocation, to bound
/// classifier cost (spec.md §4.6 "the pair set is capped at 100 pairs").
pub const MAX_CANDIDATE_PAIRS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Recent,
    Full,
}

/// Builds the edge pool for `scope`/`context_node`, then enumerates pairs
/// sharing a common endpoint whose relations are semantically comparable.
/// Does not apply the 100-pair cap — callers decide how to report a
/// truncation.
pub fn enumerate_candidates(
    pool: &StoragePool,
    scope: Scope,
    context_node: Option<&str>,
) -> CkgResult<Vec<(Edge, Edge)>> {
    let edges = match (scope, context_node) {
        (Scope::Full, None) => {
            return Err(CkgError::InvalidArgument(
                "scope \"full\" requires a context_node".to_string(),
            ));
        }
        (Scope::Full, Some(node_id)) => pool.with_reader(|conn| edge_ops::get_edges_for_node(conn, node_id))?,
        (Scope::Recent, Some(node_id)) => {
            let cutoff = Utc::now() - Duration::days(RECENT_WINDOW_DAYS);
            pool.with_reader(|conn| edge_ops::get_edges_for_node(conn, node_id))?
                .into_iter()
                .filter(|e| e.modified_at >= cutoff || e.last_accessed >= cutoff)
                .collect()
        }
        (Scope::Recent, None) => {
            let cutoff = Utc::now() - Duration::days(RECENT_WINDOW_DAYS);
            pool.with_reader(|conn| edge_ops::list_all_edges(conn))?
                .into_iter()
                .filter(|e| !e.is_superseded() && (e.modified_at >= cutoff || e.last_accessed >= cutoff))
                .collect()
        }
    };

    Ok(enumerate_pairs(edges))
}

fn enumerate_pairs(edges: Vec<Edge>) -> Vec<(Edge, Edge)> {
    let mut by_endpoint: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, e) in edges.iter().enumerate() {
        by_endpoint.entry(e.source.as_str()).or_default().push(i);
        by_endpoint.entry(e.target.as_str()).or_default().push(i);
    }

    let mut seen = HashSet::new();
    let mut pairs = Vec::new();
    for idxs in by_endpoint.values() {
        for i in 0..idxs.len() {
            for j in (i + 1)..idxs.len() {
                let (a_idx, b_idx) = (idxs[i], idxs[j]);
                let key = if a_idx < b_idx { (a_idx, b_idx) } else { (b_idx, a_idx) };
                if !seen.insert(key) {
                    continue;
                }
                let (a, b) = (&edges[a_idx], &edges[b_idx]);
                if is_comparable(a, b) {
                    pairs.push((a.clone(), b.clone()));
                }
            }
        }
    }
    pairs
}

/// Two edges are comparable when they share a relation (same relation
/// family) or both describe the same node pair under different relations
/// (both describe one endpoint's position on a topic). Exposed for IEF's
/// conflict sub-check (spec.md §4.8), which reuses the same "semantically
/// comparable" heuristic rather than inventing a second one.
pub fn is_comparable(a: &Edge, b: &Edge) -> bool {
    if a.relation == b.relation {
        return true;
    }
    (a.source == b.source && a.target == b.target) || (a.source == b.target && a.target == b.source)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(source: &str, target: &str, relation: &str) -> Edge {
        Edge::new(source, target, relation)
    }

    #[test]
    fn pairs_sharing_a_relation_on_the_same_node_pair_are_comparable() {
        let a = edge("I", "free_will", "HOLDS");
        let b = edge("I", "free_will", "HOLDS");
        assert!(is_comparable(&a, &b));
    }

    #[test]
    fn pairs_on_different_relations_and_different_node_pairs_are_not_comparable() {
        let a = edge("I", "free_will", "HOLDS");
        let b = edge("I", "favorite_color", "LIKES");
        assert!(!is_comparable(&a, &b));
    }

    #[test]
    fn enumerate_pairs_dedupes_shared_endpoints() {
        let edges = vec![edge("I", "free_will", "HOLDS"), edge("I", "free_will", "HOLDS2")];
        let pairs = enumerate_pairs(edges);
        assert_eq!(pairs.len(), 1);
    }
}
