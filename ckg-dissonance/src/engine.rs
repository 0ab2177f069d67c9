//! `dissonance_check`/`resolve_dissonance` orchestration (spec.md §4.6).

use std::sync::Arc;

use ckg_core::errors::OracleError;
use ckg_core::models::{Edge, PendingIoReview, ResolutionType};
use ckg_core::traits::{DissonanceClassifier, DissonanceVerdict, DissonanceVerdictType};
use ckg_core::{CkgError, CkgResult};
use ckg_graph::GraphManager;
use ckg_storage::queries::dissonance_ops;
use ckg_storage::StoragePool;

use crate::agm;
use crate::candidates::{self, Scope, MAX_CANDIDATE_PAIRS};

#[derive(Debug, Clone)]
pub struct ClassifiedPair {
    pub edge_a: Edge,
    pub edge_b: Edge,
    pub verdict: DissonanceVerdict,
}

#[derive(Debug, Clone, Default)]
pub struct DissonanceCheckResult {
    pub verdicts: Vec<ClassifiedPair>,
    /// `true` when the classifier failed mid-run; `verdicts` holds whatever
    /// was classified before the failure (spec.md §8 "already-classified
    /// pairs are preserved").
    pub classifier_unavailable: bool,
    pub pairs_considered: usize,
    pub pairs_capped: bool,
}

pub struct DissonanceEngine<C: DissonanceClassifier> {
    pool: Arc<StoragePool>,
    graph: Arc<GraphManager>,
    classifier: C,
}

impl<C: DissonanceClassifier> DissonanceEngine<C> {
    pub fn new(pool: Arc<StoragePool>, graph: Arc<GraphManager>, classifier: C) -> Self {
        Self { pool, graph, classifier }
    }

    /// `dissonance_check(scope, context_node?)` (spec.md §4.6). Enumerates
    /// candidate pairs, dispatches each to the classifier, and queues
    /// `NUANCE` verdicts in `pending_io_review`.
    pub async fn dissonance_check(&self, scope: Scope, context_node: Option<&str>) -> CkgResult<DissonanceCheckResult> {
        let mut candidates = candidates::enumerate_candidates(&self.pool, scope, context_node)?;
        let pairs_capped = candidates.len() > MAX_CANDIDATE_PAIRS;
        if pairs_capped {
            tracing::warn!(
                total = candidates.len(),
                cap = MAX_CANDIDATE_PAIRS,
                "dissonance candidate pairs truncated"
            );
            candidates.truncate(MAX_CANDIDATE_PAIRS);
        }
        let pairs_considered = candidates.len();

        let mut verdicts = Vec::with_capacity(pairs_considered);
        let mut classifier_unavailable = false;

        for (edge_a, edge_b) in candidates {
            match self.classifier.classify(&edge_a, &edge_b).await {
                Ok(verdict) => {
                    if verdict.verdict_type == DissonanceVerdictType::Nuance {
                        self.enqueue_pending_review(&edge_a, &edge_b, verdict.confidence, context_node);
                    }
                    verdicts.push(ClassifiedPair { edge_a, edge_b, verdict });
                }
                Err(OracleError::ClassifierUnavailable(reason)) => {
                    tracing::warn!(reason, "dissonance classifier unavailable, returning partial results");
                    classifier_unavailable = true;
                    break;
                }
                Err(other) => return Err(CkgError::Oracle(other)),
            }
        }

        Ok(DissonanceCheckResult { verdicts, classifier_unavailable, pairs_considered, pairs_capped })
    }

    fn enqueue_pending_review(&self, edge_a: &Edge, edge_b: &Edge, confidence: f64, context_node: Option<&str>) {
        let item = PendingIoReview::new(edge_a.id.clone(), edge_b.id.clone(), confidence, context_node.map(String::from));
        if let Err(e) = self.pool.with_writer(|conn| dissonance_ops::insert_pending_review(conn, &item)) {
            tracing::warn!(error = %e, "failed to enqueue pending dissonance review");
        }
    }

    /// `resolve_dissonance(edge_a, edge_b, resolution_type, context)` (spec.md
    /// §4.6). For `CONTRADICTION`, AGM alignment picks which edge yields
    /// regardless of argument order; `EVOLUTION`/`NUANCE` treat `edge_a` as
    /// the superseded side, matching spec.md's worked example.
    pub fn resolve_dissonance(
        &self,
        edge_a: &Edge,
        edge_b: &Edge,
        resolution_type: ResolutionType,
        context: &str,
        resolved_by: &str,
    ) -> CkgResult<Edge> {
        let (superseded, survivor) = match resolution_type {
            ResolutionType::Contradiction => agm::select_superseded(edge_a, edge_b),
            ResolutionType::Evolution | ResolutionType::Nuance => (edge_a, edge_b),
        };
        self.graph.resolve_dissonance(superseded, survivor, resolution_type, context, resolved_by)
    }

    pub fn pending_reviews(&self) -> CkgResult<Vec<PendingIoReview>> {
        self.pool.with_reader(|conn| dissonance_ops::list_unreviewed(conn))
    }

    pub fn mark_reviewed(&self, id: &str, reviewed_by: &str) -> CkgResult<()> {
        self.pool.with_writer(|conn| dissonance_ops::mark_reviewed(conn, id, reviewed_by))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ckg_graph::manager::IMPLICIT_NODE_LABEL;
    use serde_json::json;
    use test_fixtures::RuleBasedDissonanceClassifier;

    fn engine() -> DissonanceEngine<RuleBasedDissonanceClassifier> {
        let pool = StoragePool::open_in_memory().unwrap();
        let graph = Arc::new(GraphManager::open(pool.clone()).unwrap());
        DissonanceEngine::new(pool, graph, RuleBasedDissonanceClassifier)
    }

    #[tokio::test]
    async fn contradiction_pair_is_classified_and_resolvable() {
        let eng = engine();
        let e1 = eng
            .graph
            .add_edge("I", "position_on_free_will", "HOLDS", None, Some(json!({"value": "libertarian"})))
            .unwrap();
        let e2 = eng
            .graph
            .add_edge("I", "position_on_free_will", "HOLDS2", None, Some(json!({"value": "compatibilist"})))
            .unwrap();

        let result = eng.dissonance_check(Scope::Full, Some(&resolve_node_id(&eng, "I"))).await.unwrap();
        assert_eq!(result.verdicts.len(), 1);
        assert_eq!(result.verdicts[0].verdict.verdict_type, DissonanceVerdictType::Contradiction);
        assert!(!result.classifier_unavailable);

        let resolution = eng
            .resolve_dissonance(&e1, &e2, ResolutionType::Contradiction, "resolved via test", "I")
            .unwrap();
        assert_eq!(resolution.properties["edge_type"], "resolution");
    }

    #[tokio::test]
    async fn nuance_verdict_is_queued_for_review() {
        let eng = engine();
        eng.graph
            .add_edge("I", "position_on_free_will", "HOLDS", None, Some(json!({"value": "compatibilist"})))
            .unwrap();
        eng.graph
            .add_edge("I", "position_on_free_will", "HOLDS2", None, Some(json!({"value": "compatibilist"})))
            .unwrap();

        let node_id = resolve_node_id(&eng, "I");
        let result = eng.dissonance_check(Scope::Full, Some(&node_id)).await.unwrap();
        assert_eq!(result.verdicts[0].verdict.verdict_type, DissonanceVerdictType::Nuance);

        let pending = eng.pending_reviews().unwrap();
        assert_eq!(pending.len(), 1);
    }

    #[tokio::test]
    async fn candidate_pairs_beyond_the_cap_are_truncated() {
        let eng = engine();
        for i in 0..15 {
            eng.graph
                .add_edge("I", "topic", &format!("REL_{i}"), None, Some(json!({"value": format!("v{i}")})))
                .unwrap();
        }
        // 15 edges all sharing (source, target) -> C(15,2) = 105 comparable pairs.
        let node_id = resolve_node_id(&eng, "I");
        let result = eng.dissonance_check(Scope::Full, Some(&node_id)).await.unwrap();
        assert!(result.pairs_capped);
        assert_eq!(result.pairs_considered, MAX_CANDIDATE_PAIRS);
    }

    fn resolve_node_id(eng: &DissonanceEngine<RuleBasedDissonanceClassifier>, name: &str) -> String {
        eng.graph.get_node_by_name(IMPLICIT_NODE_LABEL, name).unwrap().unwrap().id
    }
}
