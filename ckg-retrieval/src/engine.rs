//! Hybrid retrieval engine: semantic + lexical + graph, pre-filtered, fused
//! by RRF (spec.md §4.9). Grounded on the teacher's retrieval-engine shape
//! (`RetrievalEngine` owning a storage handle plus the fusion module) but
//! rebuilt against this engine's `Insight`/`Edge` domain instead of the
//! teacher's `BaseMemory`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use ckg_core::config::RetrievalConfig;
use ckg_core::models::{Insight, Sector};
use ckg_core::traits::EmbeddingOracle;
use ckg_core::CkgResult;
use ckg_embeddings::EmbeddingGateway;
use ckg_graph::GraphManager;
use ckg_storage::queries::{insight_ops, node_ops};
use ckg_storage::StoragePool;

use crate::intent::{extract_entity_candidates, select_weights};
use crate::rrf::{self, Candidate};

/// How many hops the graph leg walks out from each matched entity before
/// projecting to linked insights. Not pinned down by spec.md; chosen to
/// match `query_neighbors`'s own default depth clamp range without walking
/// the whole graph for a single query.
const GRAPH_LEG_DEPTH: u32 = 2;

/// Pre-filtering applied before the semantic/lexical/graph legs are fused
/// (spec.md §4.9 "Pre-filtering"). `sector_filter: None` means no
/// restriction; `Some(vec![])` deliberately matches nothing.
#[derive(Debug, Clone, Default)]
pub struct PreFilter {
    pub sector_filter: Option<Vec<Sector>>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub tags_filter: Vec<String>,
    pub include_superseded: bool,
}

impl PreFilter {
    fn passes_date_and_tags(&self, insight: &Insight) -> bool {
        if let Some(from) = self.date_from {
            if insight.created_at < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if insight.created_at > to {
                return false;
            }
        }
        self.tags_filter.iter().all(|tag| insight.tags.contains(tag))
    }

    /// Sector filtering is inherently graph-relative (`l2_insights` carries
    /// no sector column — only edges do). An insight passes when
    /// `sector_filter` is `None`, or when at least one edge linking to it
    /// (via `nodes.vector_id`) carries an allowed sector.
    fn passes_sector(&self, conn: &rusqlite::Connection, insight_id: &str) -> CkgResult<bool> {
        let Some(allowed) = &self.sector_filter else { return Ok(true) };
        if allowed.is_empty() {
            return Ok(false);
        }
        let sectors = insight_ops::sectors_for_insight(conn, insight_id)?;
        Ok(sectors.iter().any(|s| allowed.contains(s)))
    }
}

pub struct RetrievalEngine<O: EmbeddingOracle> {
    pool: Arc<StoragePool>,
    graph: Arc<GraphManager>,
    gateway: Arc<EmbeddingGateway<O>>,
    config: RetrievalConfig,
}

impl<O: EmbeddingOracle> RetrievalEngine<O> {
    pub fn new(
        pool: Arc<StoragePool>,
        graph: Arc<GraphManager>,
        gateway: Arc<EmbeddingGateway<O>>,
        config: RetrievalConfig,
    ) -> Self {
        Self { pool, graph, gateway, config }
    }

    /// `hybrid_search(query, top_k, filter)` (spec.md §4.9, §6). Returns the
    /// RRF-fused, pre-filtered candidate list, ranked best-first, truncated
    /// to `top_k` (default from config).
    pub async fn hybrid_search(
        &self,
        query: &str,
        top_k: Option<usize>,
        filter: &PreFilter,
    ) -> CkgResult<Vec<Candidate>> {
        let top_k = top_k.unwrap_or(self.config.default_top_k).max(1);
        let fetch_k = (top_k * 4).max(20) as u32;

        let mut insights: HashMap<String, Insight> = HashMap::new();

        let semantic_list = self.semantic_leg(query, fetch_k, filter, &mut insights).await?;
        let lexical_list = self.lexical_leg(query, fetch_k, filter, &mut insights)?;
        let graph_list = self.graph_leg(query, filter, &mut insights)?;

        let graph_leg_empty = graph_list.is_empty();
        let weights = select_weights(&self.config, query, graph_leg_empty);

        let semantic_opt = (!semantic_list.is_empty()).then_some(&semantic_list);
        let lexical_opt = (!lexical_list.is_empty()).then_some(&lexical_list);
        let graph_opt = (!graph_list.is_empty()).then_some(&graph_list);

        let mut fused = rrf::fuse(semantic_opt, lexical_opt, graph_opt, &insights, weights, self.config.rrf_k);
        fused.truncate(top_k);
        Ok(fused)
    }

    async fn semantic_leg(
        &self,
        query: &str,
        fetch_k: u32,
        filter: &PreFilter,
        insights: &mut HashMap<String, Insight>,
    ) -> CkgResult<Vec<(String, usize)>> {
        let query_vec = self.gateway.embed("embed_query", query).await?;
        let hits = self.pool.with_reader(|conn| insight_ops::nearest(conn, &query_vec, fetch_k))?;
        self.rank_filtered(hits.into_iter().map(|(i, _)| i).collect(), filter, insights)
    }

    fn lexical_leg(
        &self,
        query: &str,
        fetch_k: u32,
        filter: &PreFilter,
        insights: &mut HashMap<String, Insight>,
    ) -> CkgResult<Vec<(String, usize)>> {
        let hits = self.pool.with_reader(|conn| insight_ops::lexical_match(conn, query, fetch_k))?;
        self.rank_filtered(hits.into_iter().map(|(i, _)| i).collect(), filter, insights)
    }

    /// Extracts candidate entity mentions, walks each matched node out to
    /// `GRAPH_LEG_DEPTH`, and projects every distinct neighbor node with a
    /// `vector_id` to its insight — ranked by first-seen traversal order
    /// (itself already distance/weight sorted by `query_neighbors`).
    fn graph_leg(
        &self,
        query: &str,
        filter: &PreFilter,
        insights: &mut HashMap<String, Insight>,
    ) -> CkgResult<Vec<(String, usize)>> {
        let candidates = extract_entity_candidates(query);
        let matched_nodes = self.graph.match_entity_names(&candidates)?;

        let mut projected: Vec<Insight> = Vec::new();
        let mut seen_nodes = HashSet::new();
        for node_id in &matched_nodes {
            let hits = self.graph.query_neighbors(
                node_id,
                None,
                GRAPH_LEG_DEPTH,
                filter.sector_filter.as_deref(),
                filter.include_superseded,
            )?;
            for hit in hits {
                if !seen_nodes.insert(hit.node_id.clone()) {
                    continue;
                }
                let Some(node) = self.pool.with_reader(|conn| node_ops::get_node_by_id(conn, &hit.node_id))? else {
                    continue;
                };
                let Some(vector_id) = node.vector_id else { continue };
                let Some(insight) = self.pool.with_reader(|conn| insight_ops::get_insight_by_id(conn, &vector_id))?
                else {
                    continue;
                };
                projected.push(insight);
            }
        }

        self.rank_filtered(projected, filter, insights)
    }

    /// Applies date/tag pre-filtering (and sector filtering, which needs a
    /// store round-trip) to a leg's hits, re-ranking 0-based on the
    /// surviving order, and records survivors into the shared lookup map.
    fn rank_filtered(
        &self,
        hits: Vec<Insight>,
        filter: &PreFilter,
        insights: &mut HashMap<String, Insight>,
    ) -> CkgResult<Vec<(String, usize)>> {
        let mut ranked = Vec::with_capacity(hits.len());
        for insight in hits {
            if !filter.passes_date_and_tags(&insight) {
                continue;
            }
            let passes_sector = self.pool.with_reader(|conn| filter.passes_sector(conn, &insight.id))?;
            if !passes_sector {
                continue;
            }
            let rank = ranked.len();
            ranked.push((insight.id.clone(), rank));
            insights.insert(insight.id.clone(), insight);
        }
        Ok(ranked)
    }
}
