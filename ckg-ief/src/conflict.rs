//! IEF's per-result conflict sub-check (spec.md §4.8): "For every top
//! result, a dissonance sub-check against `context_node`'s constitutive
//! edges runs; a hit sets `conflict_flag = true` with details." This is
//! deliberately *not* a dispatch to the external dissonance classifier
//! oracle (spec.md §6 reserves that for `dissonance_check`/`resolve_dissonance`)
//! — it is a cheap, synchronous heuristic appropriate to a re-ranking hot
//! path: flag when the candidate's representative edge is semantically
//! comparable (`ckg_dissonance::is_comparable`) to a constitutive edge of
//! `context_node` *and* the two disagree on their distinguishing property.

use ckg_core::models::Edge;
use ckg_dissonance::is_comparable;

#[derive(Debug, Clone, PartialEq)]
pub struct ConflictDetails {
    pub constitutive_edge_id: String,
    pub constitutive_relation: String,
    pub candidate_relation: String,
    pub reason: String,
}

/// Returns the first constitutive edge of `context_node` that is comparable
/// to `candidate` and disagrees with it, if any.
pub fn check_conflict(candidate: &Edge, context_constitutive_edges: &[Edge]) -> Option<ConflictDetails> {
    context_constitutive_edges.iter().find_map(|ce| {
        if ce.id == candidate.id || !is_comparable(ce, candidate) {
            return None;
        }
        if !disagrees(ce, candidate) {
            return None;
        }
        Some(ConflictDetails {
            constitutive_edge_id: ce.id.clone(),
            constitutive_relation: ce.relation.clone(),
            candidate_relation: candidate.relation.clone(),
            reason: disagreement_reason(ce, candidate),
        })
    })
}

/// Two comparable edges disagree when they name different relations over
/// the same node pair, or share a relation but carry different
/// `properties.value` (the worked dissonance example's shape, spec.md §8
/// scenario 4: two `HOLDS` edges differing only in `value`).
fn disagrees(a: &Edge, b: &Edge) -> bool {
    if a.relation != b.relation {
        return true;
    }
    let a_value = a.properties.get("value");
    let b_value = b.properties.get("value");
    match (a_value, b_value) {
        (Some(av), Some(bv)) => av != bv,
        _ => false,
    }
}

fn disagreement_reason(a: &Edge, b: &Edge) -> String {
    if a.relation != b.relation {
        format!("constitutive relation \"{}\" vs candidate relation \"{}\" over the same endpoints", a.relation, b.relation)
    } else {
        format!(
            "constitutive value {:?} disagrees with candidate value {:?} under relation \"{}\"",
            a.properties.get("value"),
            b.properties.get("value"),
            a.relation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn edge(source: &str, target: &str, relation: &str, value: &str) -> Edge {
        let mut e = Edge::new(source, target, relation);
        e.properties = json!({ "value": value });
        e
    }

    #[test]
    fn disagreeing_values_under_the_same_relation_flag_a_conflict() {
        let constitutive = edge("I", "position_on_free_will", "HOLDS", "libertarian");
        let candidate = edge("I", "position_on_free_will", "HOLDS", "compatibilist");
        let details = check_conflict(&candidate, &[constitutive]).expect("should flag");
        assert!(details.reason.contains("disagrees"));
    }

    #[test]
    fn agreeing_values_do_not_flag() {
        let constitutive = edge("I", "position_on_free_will", "HOLDS", "libertarian");
        let candidate = edge("I", "position_on_free_will", "HOLDS", "libertarian");
        assert!(check_conflict(&candidate, &[constitutive]).is_none());
    }

    #[test]
    fn unrelated_node_pairs_never_flag() {
        let constitutive = edge("I", "position_on_free_will", "HOLDS", "libertarian");
        let candidate = edge("I", "favorite_color", "LIKES", "blue");
        assert!(check_conflict(&candidate, &[constitutive]).is_none());
    }

    #[test]
    fn self_comparison_is_excluded() {
        let constitutive = edge("I", "position_on_free_will", "HOLDS", "libertarian");
        let mut candidate = constitutive.clone();
        candidate.properties = json!({ "value": "compatibilist" });
        candidate.id = constitutive.id.clone();
        assert!(check_conflict(&candidate, &[constitutive]).is_none());
    }
}
