//! Dispatches a proposal's `proposed_action` (spec.md §4.7 "proposed_action
//! (structured)") onto `ckg-graph`'s mutation surface, or onto `ckg-storage`'s
//! insight ops for the `update_insight` secondary-actor path (spec.md §4.10;
//! `ckg-session` routes a secondary actor's `update_insight` through an SMF
//! proposal rather than mutating directly). The JSON shape is an Open
//! Question spec.md leaves informal; resolved here as a small
//! `{"action": ...}`-discriminated union covering every mutation `ckg-graph`
//! exposes plus `update_insight` (see DESIGN.md).

use ckg_core::models::{Actor, InsightHistoryAction, InsightHistoryEntry, Sector};
use ckg_core::{CkgError, CkgResult};
use ckg_graph::GraphManager;
use ckg_storage::queries::insight_ops;
use ckg_storage::StoragePool;

pub fn apply(
    graph: &GraphManager,
    pool: &StoragePool,
    proposed_action: &serde_json::Value,
    consent_given: bool,
    actor: &str,
) -> CkgResult<()> {
    match proposed_action.get("action").and_then(|v| v.as_str()) {
        Some("update_weight") => {
            let edge_id = require_str(proposed_action, "edge_id")?;
            let weight = require_f64(proposed_action, "weight")?;
            graph.update_edge_weight(edge_id, weight, actor)?;
            Ok(())
        }
        Some("reclassify_sector") => {
            let edge_id = require_str(proposed_action, "edge_id")?;
            let sector_str = require_str(proposed_action, "sector")?;
            let sector = Sector::from_str_name(sector_str)
                .ok_or_else(|| CkgError::InvalidArgument(format!("unknown sector: {sector_str}")))?;
            graph.reclassify_sector(edge_id, sector, actor)?;
            Ok(())
        }
        Some("delete_edge") => {
            let edge_id = require_str(proposed_action, "edge_id")?;
            graph.delete_edge(edge_id, consent_given, actor)?;
            Ok(())
        }
        Some("add_edge") => {
            let source = require_str(proposed_action, "source")?;
            let target = require_str(proposed_action, "target")?;
            let relation = require_str(proposed_action, "relation")?;
            let weight = proposed_action.get("weight").and_then(|v| v.as_f64());
            let properties = proposed_action.get("properties").cloned();
            graph.add_edge(source, target, relation, weight, properties)?;
            Ok(())
        }
        Some("update_insight") => {
            let insight_id = require_str(proposed_action, "insight_id")?;
            let reason = require_str(proposed_action, "reason")?;
            let new_content = proposed_action.get("new_content").and_then(|v| v.as_str());
            let new_memory_strength = proposed_action.get("new_memory_strength").and_then(|v| v.as_f64());

            pool.with_writer(|conn| {
                let current = insight_ops::get_insight_by_id(conn, insight_id)?
                    .ok_or_else(|| CkgError::NotFound { what: format!("insight {insight_id}") })?;

                let mut history =
                    InsightHistoryEntry::new(insight_id, InsightHistoryAction::Update, Actor::Secondary, reason);
                history.old_content = Some(current.content.clone());
                history.new_content = new_content.map(|s| s.to_string());
                history.old_memory_strength = Some(current.memory_strength);
                history.new_memory_strength = new_memory_strength;

                insight_ops::update_insight(conn, insight_id, new_content, new_memory_strength, history)
            })
        }
        Some(other) => Err(CkgError::InvalidArgument(format!("unknown SMF action: {other}"))),
        None => Err(CkgError::InvalidArgument("proposed_action missing \"action\" field".to_string())),
    }
}

fn require_str<'a>(value: &'a serde_json::Value, field: &str) -> CkgResult<&'a str> {
    value
        .get(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| CkgError::InvalidArgument(format!("proposed_action missing string field \"{field}\"")))
}

fn require_f64(value: &serde_json::Value, field: &str) -> CkgResult<f64> {
    value
        .get(field)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| CkgError::InvalidArgument(format!("proposed_action missing numeric field \"{field}\"")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ckg_storage::StoragePool;
    use serde_json::json;

    fn graph() -> (GraphManager, std::sync::Arc<StoragePool>) {
        let pool = StoragePool::open_in_memory().unwrap();
        (GraphManager::open(pool.clone()).unwrap(), pool)
    }

    #[test]
    fn update_weight_action_dispatches() {
        let (g, pool) = graph();
        let edge = g.add_edge("I", "ethr", "KNOWS", Some(0.2), None).unwrap();
        apply(&g, &pool, &json!({"action": "update_weight", "edge_id": edge.id, "weight": 0.8}), false, "smf").unwrap();
        let updated = g.get_edge_by_names("I", "ethr", "KNOWS").unwrap().unwrap();
        assert_eq!(updated.weight, 0.8);
    }

    #[test]
    fn unknown_action_is_rejected() {
        let (g, pool) = graph();
        let err = apply(&g, &pool, &json!({"action": "nonsense"}), false, "smf").unwrap_err();
        assert!(matches!(err, CkgError::InvalidArgument(_)));
    }

    #[test]
    fn update_insight_action_rewrites_content_and_writes_history() {
        let (g, pool) = graph();
        let mut insight = ckg_core::models::Insight::new("original content", vec![]);
        insight.memory_strength = 0.5;
        pool.with_writer(|conn| insight_ops::insert_insight(conn, &insight)).unwrap();

        apply(
            &g,
            &pool,
            &json!({
                "action": "update_insight",
                "insight_id": insight.id,
                "new_content": "revised content",
                "reason": "smf-approved correction",
            }),
            false,
            "smf",
        )
        .unwrap();

        let updated = pool.with_reader(|conn| insight_ops::get_insight_by_id(conn, &insight.id)).unwrap().unwrap();
        assert_eq!(updated.content, "revised content");
        assert_eq!(updated.memory_strength, 0.5);
    }

    #[test]
    fn update_insight_action_rejects_unknown_insight() {
        let (g, pool) = graph();
        let err = apply(
            &g,
            &pool,
            &json!({"action": "update_insight", "insight_id": "missing", "reason": "x"}),
            false,
            "smf",
        )
        .unwrap_err();
        assert!(matches!(err, CkgError::NotFound { .. }));
    }
}
