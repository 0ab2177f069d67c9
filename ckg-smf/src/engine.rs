//! Proposal lifecycle orchestration (spec.md §4.7).

use std::sync::Arc;

use chrono::Utc;

use ckg_core::config::SmfConfig;
use ckg_core::errors::SmfError;
use ckg_core::models::{AuditEntry, Edge, NeutralReasoning, ProposalStatus, SmfProposal};
use ckg_core::traits::{NeutralityChecker, NeutralityVerdict};
use ckg_core::{CkgError, CkgResult};
use ckg_graph::GraphManager;
use ckg_storage::queries::{audit_ops, edge_ops, smf_ops};
use ckg_storage::StoragePool;

use crate::execution;
use crate::safeguards;

pub struct SmfEngine<N: NeutralityChecker> {
    pool: Arc<StoragePool>,
    graph: Arc<GraphManager>,
    neutrality: N,
    config: SmfConfig,
}

impl<N: NeutralityChecker> SmfEngine<N> {
    pub fn new(pool: Arc<StoragePool>, graph: Arc<GraphManager>, neutrality: N, config: SmfConfig) -> Self {
        Self { pool, graph, neutrality, config }
    }

    /// Step 1 of the lifecycle: create a proposal from a trigger (dissonance
    /// verdict, session-end hook, or manual request). Runs the safeguard
    /// check, then the neutrality check on `reasoning`, before persisting.
    pub async fn create_proposal(
        &self,
        trigger_type: &str,
        proposed_action: serde_json::Value,
        affected_edge_ids: Vec<String>,
        reasoning: NeutralReasoning,
        actor: &str,
    ) -> CkgResult<SmfProposal> {
        if let Some(safeguard) = safeguards::violated_safeguard(&proposed_action) {
            self.pool.with_writer(|conn| {
                let mut entry = AuditEntry::new("smf_create_proposal", actor)
                    .blocked_with_reason(format!("attempted to modify safeguard: {safeguard}"));
                entry.properties = serde_json::json!({"trigger_type": trigger_type, "safeguard": safeguard});
                audit_ops::insert_audit_entry(conn, &entry)
            })?;
            return Err(CkgError::Smf(SmfError::SafeguardViolation { safeguard: safeguard.to_string() }));
        }

        let mut affected_edges = Vec::with_capacity(affected_edge_ids.len());
        for edge_id in &affected_edge_ids {
            let edge = self
                .pool
                .with_reader(|conn| edge_ops::get_edge_by_id(conn, edge_id))?
                .ok_or_else(|| CkgError::NotFound { what: format!("edge {edge_id}") })?;
            affected_edges.push(edge);
        }
        let approval_level = safeguards::derive_approval_level(&affected_edges, &proposed_action);

        let mut proposal =
            SmfProposal::new(trigger_type, proposed_action, affected_edge_ids, reasoning.clone(), approval_level);

        let verdict = self.neutrality.check(&reasoning).await.map_err(CkgError::Oracle)?;
        if verdict.verdict == NeutralityVerdict::Biased {
            let reason = verdict.reason.unwrap_or_else(|| "reasoning classified as biased".to_string());
            proposal.status = ProposalStatus::Rejected;
            proposal.resolved_at = Some(Utc::now());
            proposal.resolved_by = Some("system:neutrality_check".to_string());

            self.pool.with_writer(|conn| {
                smf_ops::insert_proposal(conn, &proposal)?;
                let mut entry = AuditEntry::new("smf_create_proposal", actor).blocked_with_reason(reason.clone());
                entry.properties = serde_json::json!({"proposal_id": proposal.id});
                audit_ops::insert_audit_entry(conn, &entry)
            })?;

            return Err(CkgError::Smf(SmfError::FramingViolation { proposal_id: proposal.id, reason }));
        }

        self.pool.with_writer(|conn| {
            smf_ops::insert_proposal(conn, &proposal)?;
            let mut entry = AuditEntry::new("smf_create_proposal", actor);
            entry.properties = serde_json::json!({"proposal_id": proposal.id});
            audit_ops::insert_audit_entry(conn, &entry)
        })?;

        Ok(proposal)
    }

    /// Records `actor`'s consent; transitions `pending -> approved` once
    /// `has_required_consent()` is satisfied (one consent for `primary`, two
    /// distinct actors for `bilateral`).
    pub fn approve(&self, proposal_id: &str, actor: &str) -> CkgResult<SmfProposal> {
        self.pool.with_writer(|conn| {
            let current = smf_ops::get_proposal(conn, proposal_id)?
                .ok_or_else(|| CkgError::NotFound { what: format!("smf_proposal {proposal_id}") })?;
            if current.status != ProposalStatus::Pending {
                return Err(CkgError::Smf(SmfError::InvalidTransition {
                    proposal_id: proposal_id.to_string(),
                    status: format!("{:?}", current.status),
                }));
            }

            let mut proposal = smf_ops::add_consent(conn, proposal_id, actor)?;
            if proposal.has_required_consent() {
                smf_ops::set_status(conn, proposal_id, ProposalStatus::Approved, Some(actor))?;
                proposal.status = ProposalStatus::Approved;
            }

            let mut entry = AuditEntry::new("smf_approve", actor);
            entry.properties = serde_json::json!({"proposal_id": proposal_id});
            audit_ops::insert_audit_entry(conn, &entry)?;

            Ok(proposal)
        })
    }

    /// Terminal rejection; only valid from `pending`.
    pub fn reject(&self, proposal_id: &str, actor: &str, reason: &str) -> CkgResult<SmfProposal> {
        self.pool.with_writer(|conn| {
            let current = smf_ops::get_proposal(conn, proposal_id)?
                .ok_or_else(|| CkgError::NotFound { what: format!("smf_proposal {proposal_id}") })?;
            if current.status != ProposalStatus::Pending {
                return Err(CkgError::Smf(SmfError::InvalidTransition {
                    proposal_id: proposal_id.to_string(),
                    status: format!("{:?}", current.status),
                }));
            }

            smf_ops::set_status(conn, proposal_id, ProposalStatus::Rejected, Some(actor))?;
            let mut entry = AuditEntry::new("smf_reject", actor);
            entry.properties = serde_json::json!({"proposal_id": proposal_id, "reason": reason});
            audit_ops::insert_audit_entry(conn, &entry)?;

            smf_ops::get_proposal(conn, proposal_id)?
                .ok_or_else(|| CkgError::NotFound { what: format!("smf_proposal {proposal_id}") })
        })
    }

    /// Step 4: always through Graph core, protection and audit apply.
    /// Snapshots every affected edge's pre-execution state before applying
    /// `proposed_action`, so `undo` can restore it later.
    pub fn execute(&self, proposal_id: &str, actor: &str) -> CkgResult<SmfProposal> {
        let proposal = self
            .pool
            .with_reader(|conn| smf_ops::get_proposal(conn, proposal_id))?
            .ok_or_else(|| CkgError::NotFound { what: format!("smf_proposal {proposal_id}") })?;

        if proposal.status != ProposalStatus::Approved {
            return Err(CkgError::Smf(SmfError::InvalidTransition {
                proposal_id: proposal_id.to_string(),
                status: format!("{:?}", proposal.status),
            }));
        }

        let mut edges_before = Vec::with_capacity(proposal.affected_edges.len());
        for edge_id in &proposal.affected_edges {
            if let Some(edge) = self.pool.with_reader(|conn| edge_ops::get_edge_by_id(conn, edge_id))? {
                edges_before.push(edge);
            }
        }
        self.pool.with_writer(|conn| smf_ops::snapshot_edges(conn, proposal_id, &edges_before))?;

        let consent_given = proposal.has_required_consent();
        execution::apply(&self.graph, &self.pool, &proposal.proposed_action, consent_given, actor)?;

        self.pool.with_writer(|conn| {
            smf_ops::set_status(conn, proposal_id, ProposalStatus::Executed, Some(actor))?;
            let mut entry = AuditEntry::new("smf_execute", actor);
            entry.properties = serde_json::json!({"proposal_id": proposal_id});
            audit_ops::insert_audit_entry(conn, &entry)
        })?;

        self.pool
            .with_reader(|conn| smf_ops::get_proposal(conn, proposal_id))?
            .ok_or_else(|| CkgError::NotFound { what: format!("smf_proposal {proposal_id}") })
    }

    /// `smf_undo(modification_id)` (spec.md §4.7). Reverses every affected
    /// edge to its pre-execution snapshot if within `undo_retention_days`.
    /// Edges touching constitutive state require `consent_given` again.
    /// Dependent resolution hyperedges are flagged `orphaned`, never
    /// deleted. An `SMF_UNDO` audit entry is always written, including on
    /// failure.
    pub fn undo(&self, proposal_id: &str, consent_given: bool, actor: &str) -> CkgResult<SmfProposal> {
        let proposal = self
            .pool
            .with_reader(|conn| smf_ops::get_proposal(conn, proposal_id))?
            .ok_or_else(|| CkgError::NotFound { what: format!("smf_proposal {proposal_id}") })?;

        if proposal.status != ProposalStatus::Executed {
            return Err(self.blocked_undo(
                proposal_id,
                actor,
                format!("not in executed state ({:?})", proposal.status),
                CkgError::Smf(SmfError::InvalidTransition {
                    proposal_id: proposal_id.to_string(),
                    status: format!("{:?}", proposal.status),
                }),
            ));
        }

        let resolved_at = proposal.resolved_at.ok_or_else(|| CkgError::Internal {
            correlation_id: proposal_id.to_string(),
            message: "executed proposal missing resolved_at".to_string(),
        })?;
        let days_elapsed = (Utc::now() - resolved_at).num_days();
        if days_elapsed > self.config.undo_retention_days {
            return Err(self.blocked_undo(
                proposal_id,
                actor,
                format!("retention window expired ({days_elapsed}d)"),
                CkgError::Smf(SmfError::RetentionExpired {
                    proposal_id: proposal_id.to_string(),
                    days_elapsed,
                    retention_days: self.config.undo_retention_days,
                }),
            ));
        }

        let snapshots = self.pool.with_reader(|conn| smf_ops::get_edge_snapshots(conn, proposal_id))?;
        if snapshots.iter().any(Edge::is_constitutive) && !consent_given {
            return Err(self.blocked_undo(
                proposal_id,
                actor,
                "reversal touches a constitutive edge".to_string(),
                CkgError::Smf(SmfError::ConsentRequired { proposal_id: proposal_id.to_string() }),
            ));
        }

        let restored_ids: Vec<String> = snapshots.iter().map(|e| e.id.clone()).collect();
        for snapshot in &snapshots {
            self.graph.restore_edge(snapshot, actor)?;
        }
        self.orphan_dependent_resolutions(&restored_ids, actor)?;

        self.pool.with_writer(|conn| {
            smf_ops::set_status(conn, proposal_id, ProposalStatus::Undone, Some(actor))?;
            let mut entry = AuditEntry::new("smf_undo", actor);
            entry.properties = serde_json::json!({"proposal_id": proposal_id});
            audit_ops::insert_audit_entry(conn, &entry)
        })?;

        self.pool
            .with_reader(|conn| smf_ops::get_proposal(conn, proposal_id))?
            .ok_or_else(|| CkgError::NotFound { what: format!("smf_proposal {proposal_id}") })
    }

    fn blocked_undo(&self, proposal_id: &str, actor: &str, reason: String, err: CkgError) -> CkgError {
        let write = self.pool.with_writer(|conn| {
            let mut entry = AuditEntry::new("smf_undo", actor).blocked_with_reason(reason);
            entry.properties = serde_json::json!({"proposal_id": proposal_id});
            audit_ops::insert_audit_entry(conn, &entry)
        });
        if let Err(e) = write {
            tracing::warn!(error = %e, "failed to write blocked smf_undo audit entry");
        }
        err
    }

    fn orphan_dependent_resolutions(&self, restored_ids: &[String], actor: &str) -> CkgResult<()> {
        let all_edges = self.pool.with_reader(|conn| edge_ops::list_all_edges(conn))?;
        for edge in all_edges {
            let is_resolution = edge.properties.get("edge_type").and_then(|v| v.as_str()) == Some("resolution");
            if !is_resolution {
                continue;
            }
            let depends = edge.supersedes.as_deref().is_some_and(|id| restored_ids.iter().any(|r| r == id))
                || edge.superseded_by.as_deref().is_some_and(|id| restored_ids.iter().any(|r| r == id));
            if !depends {
                continue;
            }
            let mut orphaned = edge.clone();
            if let Some(obj) = orphaned.properties.as_object_mut() {
                obj.insert("orphaned".to_string(), serde_json::Value::Bool(true));
            }
            self.graph.restore_edge(&orphaned, actor)?;
        }
        Ok(())
    }

    pub fn list_pending(&self) -> CkgResult<Vec<SmfProposal>> {
        self.pool.with_reader(smf_ops::list_pending)
    }

    pub fn get(&self, proposal_id: &str) -> CkgResult<Option<SmfProposal>> {
        self.pool.with_reader(|conn| smf_ops::get_proposal(conn, proposal_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ckg_graph::manager::IMPLICIT_NODE_LABEL;
    use serde_json::json;
    use test_fixtures::KeywordNeutralityChecker;

    fn neutral_reasoning() -> NeutralReasoning {
        NeutralReasoning {
            detected: "a contradiction between two HOLDS edges".to_string(),
            affected: "edge_a, edge_b".to_string(),
            if_approved: "a resolution edge is recorded".to_string(),
            if_rejected: "edges remain as-is".to_string(),
            neutral_summary: true,
        }
    }

    fn harness() -> SmfEngine<KeywordNeutralityChecker> {
        let pool = StoragePool::open_in_memory().unwrap();
        let graph = Arc::new(GraphManager::open(pool.clone()).unwrap());
        SmfEngine::new(pool, graph, KeywordNeutralityChecker, SmfConfig::default())
    }

    #[tokio::test]
    async fn primary_proposal_executes_after_one_consent() {
        let eng = harness();
        let edge = eng.graph.add_edge("I", "hobby", "LIKES", Some(0.5), None).unwrap();

        let proposal = eng
            .create_proposal(
                "manual_request",
                json!({"action": "update_weight", "edge_id": edge.id, "weight": 0.9}),
                vec![edge.id.clone()],
                neutral_reasoning(),
                "user",
            )
            .await
            .unwrap();
        assert_eq!(proposal.approval_level, ckg_core::models::ApprovalLevel::Primary);

        let approved = eng.approve(&proposal.id, "user").unwrap();
        assert_eq!(approved.status, ProposalStatus::Approved);

        let executed = eng.execute(&proposal.id, "user").unwrap();
        assert_eq!(executed.status, ProposalStatus::Executed);

        let reloaded = eng.graph.get_edge_by_names("I", "hobby", "LIKES").unwrap().unwrap();
        assert_eq!(reloaded.weight, 0.9);
    }

    #[tokio::test]
    async fn bilateral_proposal_stays_pending_after_one_consent() {
        let eng = harness();
        let mut edge_props = json!({"edge_type": "constitutive"});
        let edge = eng.graph.add_edge("I", "core_value", "HOLDS", Some(1.0), Some(edge_props.take())).unwrap();

        let proposal = eng
            .create_proposal(
                "manual_request",
                json!({"action": "update_weight", "edge_id": edge.id, "weight": 0.95}),
                vec![edge.id.clone()],
                neutral_reasoning(),
                "user_a",
            )
            .await
            .unwrap();
        assert_eq!(proposal.approval_level, ckg_core::models::ApprovalLevel::Bilateral);

        let after_first = eng.approve(&proposal.id, "user_a").unwrap();
        assert_eq!(after_first.status, ProposalStatus::Pending);

        let after_second = eng.approve(&proposal.id, "user_b").unwrap();
        assert_eq!(after_second.status, ProposalStatus::Approved);
    }

    #[tokio::test]
    async fn biased_reasoning_is_rejected_with_framing_violation() {
        let eng = harness();
        let edge = eng.graph.add_edge("I", "hobby", "LIKES", None, None).unwrap();
        let mut reasoning = neutral_reasoning();
        reasoning.if_approved = "you should approve this immediately".to_string();

        let err = eng
            .create_proposal(
                "manual_request",
                json!({"action": "update_weight", "edge_id": edge.id, "weight": 0.9}),
                vec![edge.id.clone()],
                reasoning,
                "user",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CkgError::Smf(SmfError::FramingViolation { .. })));
    }

    #[tokio::test]
    async fn modifying_the_safeguards_list_is_rejected() {
        let eng = harness();
        let err = eng
            .create_proposal("manual_request", json!({"action": "modify_safeguards"}), vec![], neutral_reasoning(), "user")
            .await
            .unwrap_err();
        assert!(matches!(err, CkgError::Smf(SmfError::SafeguardViolation { .. })));
    }

    #[tokio::test]
    async fn undo_restores_prior_weight_within_retention() {
        let eng = harness();
        let edge = eng.graph.add_edge("I", "hobby", "LIKES", Some(0.3), None).unwrap();

        let proposal = eng
            .create_proposal(
                "manual_request",
                json!({"action": "update_weight", "edge_id": edge.id, "weight": 0.9}),
                vec![edge.id.clone()],
                neutral_reasoning(),
                "user",
            )
            .await
            .unwrap();
        eng.approve(&proposal.id, "user").unwrap();
        eng.execute(&proposal.id, "user").unwrap();

        let undone = eng.undo(&proposal.id, false, "user").unwrap();
        assert_eq!(undone.status, ProposalStatus::Undone);

        let reloaded = eng.graph.get_edge_by_names("I", "hobby", "LIKES").unwrap().unwrap();
        assert_eq!(reloaded.weight, 0.3);
    }

    #[tokio::test]
    async fn undo_of_constitutive_change_without_consent_is_refused() {
        let eng = harness();
        let edge = eng
            .graph
            .add_edge("I", "core_value", "HOLDS", Some(1.0), Some(json!({"edge_type": "constitutive"})))
            .unwrap();

        let proposal = eng
            .create_proposal(
                "manual_request",
                json!({"action": "update_weight", "edge_id": edge.id, "weight": 0.95}),
                vec![edge.id.clone()],
                neutral_reasoning(),
                "user_a",
            )
            .await
            .unwrap();
        eng.approve(&proposal.id, "user_a").unwrap();
        eng.approve(&proposal.id, "user_b").unwrap();
        eng.execute(&proposal.id, "user_a").unwrap();

        let err = eng.undo(&proposal.id, false, "user_a").unwrap_err();
        assert!(matches!(err, CkgError::Smf(SmfError::ConsentRequired { .. })));

        let undone = eng.undo(&proposal.id, true, "user_a").unwrap();
        assert_eq!(undone.status, ProposalStatus::Undone);
    }

    #[tokio::test]
    async fn undo_orphans_dependent_resolution_hyperedges() {
        let eng = harness();
        let e1 = eng
            .graph
            .add_edge("I", "position_on_free_will", "HOLDS", None, Some(json!({"value": "libertarian"})))
            .unwrap();
        let e2 = eng
            .graph
            .add_edge("I", "position_on_free_will", "HOLDS2", None, Some(json!({"value": "compatibilist"})))
            .unwrap();
        let resolution = eng
            .graph
            .resolve_dissonance(&e1, &e2, ckg_core::models::ResolutionType::Evolution, "shift", "I")
            .unwrap();

        let proposal = eng
            .create_proposal(
                "manual_request",
                json!({"action": "update_weight", "edge_id": e2.id, "weight": 0.7}),
                vec![e2.id.clone()],
                neutral_reasoning(),
                "user",
            )
            .await
            .unwrap();
        eng.approve(&proposal.id, "user").unwrap();
        eng.execute(&proposal.id, "user").unwrap();
        eng.undo(&proposal.id, false, "user").unwrap();

        let reloaded_resolution = eng
            .pool
            .with_reader(|conn| edge_ops::get_edge_by_id(conn, &resolution.id))
            .unwrap()
            .unwrap();
        assert_eq!(reloaded_resolution.properties["orphaned"], true);

        let _ = IMPLICIT_NODE_LABEL;
    }
}
