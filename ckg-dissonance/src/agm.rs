//! AGM alignment: when a `CONTRADICTION` verdict requires picking which edge
//! is "to be given up", descriptive edges yield before constitutive ones;
//! among descriptive edges, the less entrenched yields (spec.md §4.6).

use ckg_core::models::{Edge, EntrenchmentLevel};

/// Returns `(superseded, survivor)`. Order of the inputs carries no meaning;
/// the belief-retention rule alone decides.
pub fn select_superseded<'a>(edge_a: &'a Edge, edge_b: &'a Edge) -> (&'a Edge, &'a Edge) {
    match (edge_a.is_constitutive(), edge_b.is_constitutive()) {
        (true, false) => (edge_b, edge_a),
        (false, true) => (edge_a, edge_b),
        _ => {
            if entrenchment_rank(edge_a.entrenchment_level) <= entrenchment_rank(edge_b.entrenchment_level) {
                (edge_a, edge_b)
            } else {
                (edge_b, edge_a)
            }
        }
    }
}

fn entrenchment_rank(level: EntrenchmentLevel) -> u8 {
    match level {
        EntrenchmentLevel::Default => 0,
        EntrenchmentLevel::Maximal => 1,
    }
}
