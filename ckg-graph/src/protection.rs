//! Constitutive-edge protection: the one invariant the rest of the system
//! (dissonance, SMF) can never route around because every mutation goes
//! through `GraphManager` (spec.md §4.5 "Protection", §8 universal
//! invariants).

use ckg_core::errors::GraphError;
use ckg_core::models::Edge;

/// Checks whether `edge` may be deleted given `consent_given`. Constitutive
/// edges require consent; descriptive edges are always deletable.
pub fn check_delete_allowed(edge: &Edge, consent_given: bool) -> Result<(), GraphError> {
    if edge.is_constitutive() && !consent_given {
        return Err(GraphError::ConstitutiveEdgeProtection { edge_id: edge.id.clone() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ckg_core::models::Edge;
    use serde_json::json;

    fn constitutive_edge() -> Edge {
        let mut e = Edge::new("I", "ethr", "LOVES");
        e.properties = json!({"edge_type": "constitutive"});
        e
    }

    #[test]
    fn constitutive_without_consent_is_blocked() {
        let e = constitutive_edge();
        assert!(matches!(
            check_delete_allowed(&e, false),
            Err(GraphError::ConstitutiveEdgeProtection { .. })
        ));
    }

    #[test]
    fn constitutive_with_consent_is_allowed() {
        let e = constitutive_edge();
        assert!(check_delete_allowed(&e, true).is_ok());
    }

    #[test]
    fn descriptive_is_always_allowed() {
        let e = Edge::new("I", "Dennett", "KNOWS");
        assert!(check_delete_allowed(&e, false).is_ok());
    }
}
