//! Immutable safeguards and approval-level derivation (spec.md §4.7).

use ckg_core::models::{ApprovalLevel, Edge, IMMUTABLE_SAFEGUARDS};

/// `approval_level = bilateral` whenever any affected edge is constitutive or
/// the proposal *creates* a constitutive edge; otherwise `primary`.
pub fn derive_approval_level(affected_edges: &[Edge], proposed_action: &serde_json::Value) -> ApprovalLevel {
    let touches_constitutive = affected_edges.iter().any(Edge::is_constitutive);
    if touches_constitutive || creates_constitutive_edge(proposed_action) {
        ApprovalLevel::Bilateral
    } else {
        ApprovalLevel::Primary
    }
}

fn creates_constitutive_edge(proposed_action: &serde_json::Value) -> bool {
    proposed_action.get("action").and_then(|v| v.as_str()) == Some("add_edge")
        && proposed_action
            .get("properties")
            .and_then(|p| p.get("edge_type"))
            .and_then(|v| v.as_str())
            == Some("constitutive")
}

/// Returns the violated safeguard's name if `proposed_action` attempts to
/// modify one of `IMMUTABLE_SAFEGUARDS` (spec.md §4.7 "SMF cannot propose
/// changes to the safeguards list").
pub fn violated_safeguard(proposed_action: &serde_json::Value) -> Option<&'static str> {
    if proposed_action.get("action").and_then(|v| v.as_str()) == Some("modify_safeguards") {
        return Some("smf_safeguards_list");
    }
    let target = proposed_action.get("target").and_then(|v| v.as_str())?;
    IMMUTABLE_SAFEGUARDS.iter().find(|&&s| s == target).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bilateral_when_an_affected_edge_is_constitutive() {
        let mut edge = Edge::new("I", "core_value", "HOLDS");
        edge.properties = json!({"edge_type": "constitutive"});
        let level = derive_approval_level(&[edge], &json!({"action": "update_weight"}));
        assert_eq!(level, ApprovalLevel::Bilateral);
    }

    #[test]
    fn bilateral_when_proposal_creates_a_constitutive_edge() {
        let level = derive_approval_level(
            &[],
            &json!({"action": "add_edge", "properties": {"edge_type": "constitutive"}}),
        );
        assert_eq!(level, ApprovalLevel::Bilateral);
    }

    #[test]
    fn primary_otherwise() {
        let edge = Edge::new("I", "hobby", "LIKES");
        let level = derive_approval_level(&[edge], &json!({"action": "update_weight"}));
        assert_eq!(level, ApprovalLevel::Primary);
    }

    #[test]
    fn modifying_safeguards_list_is_rejected() {
        assert_eq!(violated_safeguard(&json!({"action": "modify_safeguards"})), Some("smf_safeguards_list"));
    }

    #[test]
    fn targeting_a_named_safeguard_is_rejected() {
        assert_eq!(
            violated_safeguard(&json!({"action": "disable", "target": "audit_log_enabled"})),
            Some("audit_log_enabled")
        );
    }

    #[test]
    fn ordinary_actions_pass() {
        assert_eq!(violated_safeguard(&json!({"action": "update_weight", "edge_id": "abc"})), None);
    }
}
