//! `IefEngine`: `integrative_search` (value-weighted re-ranking atop the
//! RRF-fused hybrid-search output) and out-of-band feedback capture with
//! threshold-triggered recalibration (spec.md §4.8).

use std::sync::{Arc, RwLock};

use chrono::Utc;
use uuid::Uuid;

use ckg_core::config::{DecayConfig, IefConfig};
use ckg_core::models::{Edge, IefFeedback};
use ckg_core::{CkgError, CkgResult};
use ckg_retrieval::rrf::Candidate;
use ckg_storage::queries::{edge_ops, ief_feedback_ops};
use ckg_storage::StoragePool;

use crate::conflict::{self, ConflictDetails};
use crate::feedback::{self, FeedbackRequest};
use crate::scoring;

/// One re-ranked result: the original fused candidate, the IEF score, and an
/// optional conflict flag with details (spec.md §4.8).
#[derive(Debug, Clone)]
pub struct IntegrativeResult {
    pub candidate: Candidate,
    pub score: f64,
    pub conflict_flag: bool,
    pub conflict_details: Option<ConflictDetails>,
}

#[derive(Debug, Clone)]
pub struct IntegrativeSearchResponse {
    pub results: Vec<IntegrativeResult>,
    pub feedback_request: FeedbackRequest,
}

pub struct IefEngine {
    pool: Arc<StoragePool>,
    decay_config: DecayConfig,
    constitutive_weight: RwLock<IefConfig>,
}

impl IefEngine {
    pub fn new(pool: Arc<StoragePool>, decay_config: DecayConfig, config: IefConfig) -> Self {
        Self { pool, decay_config, constitutive_weight: RwLock::new(config) }
    }

    fn config(&self) -> IefConfig {
        *self.constitutive_weight.read().expect("ief config lock poisoned")
    }

    /// `integrative_search(query_text, query_vec, context_node, candidates)` (spec.md
    /// §4.8). Re-ranks `candidates` (typically `RetrievalEngine::hybrid_search`'s
    /// output) by the value-weighted formula, flags conflicts against
    /// `context_node`'s constitutive edges, and records a pending feedback
    /// row the caller can later resolve with `record_feedback`.
    pub fn integrative_search(
        &self,
        query_text: &str,
        query_vec: &[f32],
        context_node: Option<&str>,
        candidates: Vec<Candidate>,
    ) -> CkgResult<IntegrativeSearchResponse> {
        let now = Utc::now();
        let config = self.config();

        let context_constitutive: Vec<Edge> = match context_node {
            Some(node_id) => self
                .pool
                .with_reader(|conn| edge_ops::get_edges_for_node(conn, node_id))?
                .into_iter()
                .filter(|e| e.is_constitutive())
                .collect(),
            None => Vec::new(),
        };

        let mut results = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let representative = scoring::representative_edge(&self.pool, &candidate.insight, context_node)?;

            let relevance = scoring::relevance_sector(&representative.edge, &candidate.insight, &self.decay_config, now);
            let semantic = candidate
                .insight
                .embedding
                .as_deref()
                .map(|v| scoring::semantic_similarity(query_vec, v))
                .unwrap_or(0.0);
            let recency = representative
                .edge
                .as_ref()
                .map(|e| scoring::recency_score(e.last_accessed, now))
                .unwrap_or_else(|| scoring::recency_score(candidate.insight.created_at, now));
            let constitutive = scoring::constitutive_weight(representative.touches_constitutive, &config);

            let score = scoring::WEIGHT_RELEVANCE * relevance
                + scoring::WEIGHT_SEMANTIC * semantic
                + scoring::WEIGHT_RECENCY * recency
                + scoring::WEIGHT_CONSTITUTIVE * constitutive;

            let conflict_details = representative
                .edge
                .as_ref()
                .and_then(|e| conflict::check_conflict(e, &context_constitutive));

            results.push(IntegrativeResult {
                candidate,
                score,
                conflict_flag: conflict_details.is_some(),
                conflict_details,
            });
        }

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

        let query_id = Uuid::new_v4();
        let constitutive_weight_used = config.effective_constitutive_weight();
        let feedback_row = IefFeedback::new(query_id.to_string(), query_text, constitutive_weight_used);
        self.pool.with_writer(|conn| ief_feedback_ops::insert_feedback(conn, &feedback_row))?;

        Ok(IntegrativeSearchResponse {
            results,
            feedback_request: FeedbackRequest { query_id, helpful: None },
        })
    }

    /// Records out-of-band feedback on a prior `integrative_search` call,
    /// then recalibrates `constitutive_weight` once
    /// `RECALIBRATION_THRESHOLD` unlabeled entries have accumulated since
    /// the last recalibration (spec.md §4.8).
    pub fn record_feedback(&self, query_id: Uuid, helpful: bool, reason: Option<&str>) -> CkgResult<()> {
        self.pool
            .with_writer(|conn| ief_feedback_ops::record_answer(conn, &query_id.to_string(), helpful, reason))?;

        let entries_since_last = self.pool.with_reader(ief_feedback_ops::entries_since_last_recalibration)?;
        if feedback::should_recalibrate(entries_since_last) {
            self.recalibrate()?;
        }
        Ok(())
    }

    fn recalibrate(&self) -> CkgResult<()> {
        let pairs = self.pool.with_reader(ief_feedback_ops::labeled_pairs_since_last_recalibration)?;
        let current = self.config();
        if let Some(new_weight) = feedback::recalibrate(&current, &pairs) {
            let mut guard = self.constitutive_weight.write().map_err(|_| {
                CkgError::Internal {
                    correlation_id: Uuid::new_v4().to_string(),
                    message: "ief config lock poisoned during recalibration".to_string(),
                }
            })?;
            guard.constitutive_weight = new_weight;
            drop(guard);
            tracing::info!(new_weight, "ief constitutive_weight recalibrated");
        }
        self.pool.with_writer(ief_feedback_ops::mark_recalibrated)?;
        Ok(())
    }
}
