//! `SessionEngine`: raw dialogue / L2 insight / working-memory / episode
//! write-through operations (spec.md §4.10).

use std::sync::Arc;

use ckg_core::models::{
    Actor, Episode, Insight, InsightHistoryAction, InsightHistoryEntry, NeutralReasoning,
    RawDialogue, StaleMemoryItem, WorkingMemoryItem, EVICTION_IMPORTANCE_CEILING,
    EPISODE_RECALL_MIN_SIMILARITY, EPISODE_RECALL_TOP_K, WORKING_MEMORY_CAPACITY,
};
use ckg_core::traits::{EmbeddingOracle, NeutralityChecker};
use ckg_core::{CkgError, CkgResult};
use ckg_embeddings::EmbeddingGateway;
use ckg_smf::SmfEngine;
use ckg_storage::queries::{insight_ops, session_ops};
use ckg_storage::StoragePool;

use crate::fidelity::{semantic_fidelity_score, SEMANTIC_FIDELITY_THRESHOLD};
use crate::registry::SessionRegistry;

/// `compress_to_l2_insight`'s result: the persisted insight, its fidelity
/// score, and a non-fatal warning when the score falls below threshold
/// (spec.md §4.10: "stored regardless").
#[derive(Debug, Clone)]
pub struct CompressionResult {
    pub insight: Insight,
    pub fidelity_score: f64,
    pub warning: Option<String>,
}

/// `update_insight`'s result: applied directly by a primary actor, or
/// pending SMF approval when requested by a secondary actor (spec.md
/// §4.10: "When secondary, an SMF proposal is created and
/// `{status: pending, proposal_id}` returned").
#[derive(Debug, Clone)]
pub enum UpdateInsightOutcome {
    Applied(Insight),
    Pending { proposal_id: String },
}

#[derive(Debug, Clone)]
pub struct WorkingMemoryOutcome {
    pub inserted: WorkingMemoryItem,
    pub evicted: Option<StaleMemoryItem>,
}

pub struct SessionEngine<O: EmbeddingOracle, N: NeutralityChecker> {
    pool: Arc<StoragePool>,
    gateway: Arc<EmbeddingGateway<O>>,
    smf: Arc<SmfEngine<N>>,
    registry: SessionRegistry,
}

impl<O: EmbeddingOracle, N: NeutralityChecker> SessionEngine<O, N> {
    pub fn new(pool: Arc<StoragePool>, gateway: Arc<EmbeddingGateway<O>>, smf: Arc<SmfEngine<N>>) -> Self {
        Self { pool, gateway, smf, registry: SessionRegistry::new() }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// `store_raw_dialogue(session_id, speaker, content, metadata)` — L0
    /// append, registering the session in the in-process registry if it
    /// isn't already tracked.
    pub fn store_raw_dialogue(
        &self,
        session_id: &str,
        speaker: &str,
        content: &str,
        metadata: serde_json::Value,
    ) -> CkgResult<i64> {
        self.registry.create_session(session_id);
        let dialogue = RawDialogue {
            id: 0,
            session_id: session_id.to_string(),
            timestamp: chrono::Utc::now(),
            speaker: speaker.to_string(),
            content: content.to_string(),
            metadata,
        };
        self.pool.with_writer(|conn| session_ops::append_raw_dialogue(conn, &dialogue))
    }

    /// `compress_to_l2_insight(content, source_ids, tags?, metadata?)`
    /// (spec.md §4.10): embeds via the gateway, scores semantic fidelity,
    /// and persists with `memory_strength = 0.5` (`Insight::new`'s default)
    /// regardless of the fidelity score.
    pub async fn compress_to_l2_insight(
        &self,
        content: &str,
        source_ids: Vec<i64>,
        tags: Option<Vec<String>>,
        metadata: Option<serde_json::Value>,
    ) -> CkgResult<CompressionResult> {
        let embedding = self.gateway.embed("embed_insight", content).await?;
        let fidelity_score = semantic_fidelity_score(content);
        let warning = (fidelity_score < SEMANTIC_FIDELITY_THRESHOLD).then(|| {
            format!(
                "semantic fidelity score {fidelity_score:.2} is below the {SEMANTIC_FIDELITY_THRESHOLD:.2} threshold"
            )
        });

        let mut insight = Insight::new(content, source_ids);
        insight.embedding = Some(embedding);
        if let Some(tags) = tags {
            insight.tags = tags;
        }
        if let Some(metadata) = metadata {
            insight.metadata = metadata;
        }

        self.pool.with_writer(|conn| insight_ops::insert_insight(conn, &insight))?;

        Ok(CompressionResult { insight, fidelity_score, warning })
    }

    /// `update_insight(id, actor, reason, new_content?, new_memory_strength?)`
    /// (spec.md §4.10). Validates the request, then either applies it
    /// directly (primary actor) or routes it through an SMF proposal
    /// (secondary actor) — see `ckg-smf::execution`'s `update_insight`
    /// action, added for this path.
    pub async fn update_insight(
        &self,
        insight_id: &str,
        actor: Actor,
        reason: &str,
        new_content: Option<&str>,
        new_memory_strength: Option<f64>,
    ) -> CkgResult<UpdateInsightOutcome> {
        if reason.trim().is_empty() {
            return Err(CkgError::InvalidArgument("reason is required".to_string()));
        }
        if new_content.is_none() && new_memory_strength.is_none() {
            return Err(CkgError::InvalidArgument(
                "at least one of new_content or new_memory_strength is required".to_string(),
            ));
        }
        let trimmed_content = new_content.map(str::trim);
        if let Some(trimmed) = trimmed_content {
            if trimmed.is_empty() {
                return Err(CkgError::InvalidArgument("new_content must be non-empty after trimming".to_string()));
            }
        }

        let current = self
            .pool
            .with_reader(|conn| insight_ops::get_insight_by_id(conn, insight_id))?
            .ok_or_else(|| CkgError::NotFound { what: format!("insight {insight_id}") })?;

        match actor {
            Actor::Primary => {
                let mut history = InsightHistoryEntry::new(insight_id, InsightHistoryAction::Update, actor, reason);
                history.old_content = Some(current.content.clone());
                history.new_content = trimmed_content.map(str::to_string);
                history.old_memory_strength = Some(current.memory_strength);
                history.new_memory_strength = new_memory_strength;

                self.pool.with_writer(|conn| {
                    insight_ops::update_insight(conn, insight_id, trimmed_content, new_memory_strength, history)
                })?;

                let updated = self
                    .pool
                    .with_reader(|conn| insight_ops::get_insight_by_id(conn, insight_id))?
                    .ok_or_else(|| CkgError::NotFound { what: format!("insight {insight_id}") })?;
                Ok(UpdateInsightOutcome::Applied(updated))
            }
            Actor::Secondary => {
                let proposed_action = serde_json::json!({
                    "action": "update_insight",
                    "insight_id": insight_id,
                    "reason": reason,
                    "new_content": trimmed_content,
                    "new_memory_strength": new_memory_strength,
                });
                let reasoning = NeutralReasoning {
                    detected: "a secondary actor requested an insight update".to_string(),
                    affected: format!("insight {insight_id}"),
                    if_approved: format!("insight content/memory_strength updated: {reason}"),
                    if_rejected: "insight remains unchanged".to_string(),
                    neutral_summary: true,
                };
                let proposal = self
                    .smf
                    .create_proposal("update_insight", proposed_action, vec![], reasoning, "session:secondary")
                    .await?;
                tracing::info!(insight_id, proposal_id = %proposal.id, "secondary-actor insight update routed through SMF");
                Ok(UpdateInsightOutcome::Pending { proposal_id: proposal.id })
            }
        }
    }

    /// `delete_insight(id, actor, reason)` (spec.md §4.10): always a direct
    /// soft-delete — unlike `update_insight`, spec.md does not gate deletion
    /// behind an SMF proposal for secondary actors.
    pub fn delete_insight(&self, insight_id: &str, actor: Actor, reason: &str) -> CkgResult<()> {
        let current = self
            .pool
            .with_reader(|conn| insight_ops::get_insight_by_id(conn, insight_id))?
            .ok_or_else(|| CkgError::NotFound { what: format!("insight {insight_id}") })?;

        let mut history = InsightHistoryEntry::new(insight_id, InsightHistoryAction::Delete, actor, reason);
        history.old_content = Some(current.content);
        history.old_memory_strength = Some(current.memory_strength);

        self.pool
            .with_writer(|conn| insight_ops::delete_insight(conn, insight_id, actor_label(actor), reason, history))
    }

    /// `update_working_memory(content, importance)` (spec.md §4.10):
    /// inserts, then evicts the oldest `last_accessed` item whose
    /// `importance <= 0.8` if the capacity of 10 is exceeded.
    pub fn update_working_memory(&self, content: &str, importance: f64) -> CkgResult<WorkingMemoryOutcome> {
        let item = WorkingMemoryItem::new(content, importance);

        self.pool.with_writer(|conn| {
            session_ops::insert_working_memory_item(conn, &item)?;

            let size = session_ops::working_memory_size(conn)?;
            let evicted = if size > WORKING_MEMORY_CAPACITY {
                match session_ops::oldest_evictable(conn, EVICTION_IMPORTANCE_CEILING)? {
                    Some(victim) => {
                        session_ops::remove_working_memory_item(conn, &victim.id)?;
                        tracing::debug!(evicted_id = %victim.id, "working memory over capacity, evicted oldest evictable item");
                        let stale = StaleMemoryItem::from_evicted(victim, "LRU_EVICTION");
                        session_ops::insert_stale_memory_item(conn, &stale)?;
                        Some(stale)
                    }
                    None => None,
                }
            } else {
                None
            };

            Ok(WorkingMemoryOutcome { inserted: item.clone(), evicted })
        })
    }

    /// `store_episode(query, reward, reflection)` (spec.md §4.10): embeds
    /// the query and writes the episode row.
    pub async fn store_episode(&self, query: &str, reward: f64, reflection: &str) -> CkgResult<Episode> {
        let embedding = self.gateway.embed("embed_query", query).await?;
        let mut episode = Episode::new(query, reward, reflection);
        episode.embedding = Some(embedding);

        self.pool.with_writer(|conn| session_ops::insert_episode(conn, &episode))?;
        Ok(episode)
    }

    /// Episode-memory recall: cosine >= 0.70, top-3 by similarity (spec.md
    /// §4.10 / §5). Embeds `query` itself rather than taking a caller-
    /// supplied vector, mirroring `store_episode`.
    pub async fn recall_similar_episodes(&self, query: &str) -> CkgResult<Vec<(Episode, f64)>> {
        let embedding = self.gateway.embed("embed_query", query).await?;
        self.pool.with_reader(|conn| {
            session_ops::nearest_episodes(
                conn,
                &embedding,
                EPISODE_RECALL_MIN_SIMILARITY,
                EPISODE_RECALL_TOP_K as u32,
            )
        })
    }
}

fn actor_label(actor: Actor) -> &'static str {
    match actor {
        Actor::Primary => "primary",
        Actor::Secondary => "secondary",
    }
}
