//! `GraphManager`: the single entry point through which every node/edge
//! mutation must pass, so protection and audit are inescapable (spec.md
//! §4.5, §9 "Graph core"). Wraps an `Arc<RwLock<IndexedGraph>>` in-memory
//! index (fast traversal) backed by `ckg-storage` (durable, authoritative),
//! grounded on `cortex_causal::graph::GraphManager`'s read/write-lock shape.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use ckg_core::errors::GraphError;
use ckg_core::models::{AuditEntry, Edge, EntrenchmentLevel, Node, Sector};
use ckg_core::{CkgError, CkgResult};
use ckg_storage::queries::{audit_ops, edge_ops, node_ops};
use ckg_storage::StoragePool;

use crate::classifier::classify;
use crate::protection::check_delete_allowed;
use crate::stable_graph::IndexedGraph;
use crate::traversal::{self, NeighborHit, PathResult};

/// Default label assigned to a node created implicitly by an edge naming an
/// endpoint that doesn't exist yet (spec.md §3 Node "Lifecycle: created ...
/// implicitly when an edge references a non-existent endpoint"). spec.md
/// leaves the label of an implicitly-created node unspecified; DESIGN.md
/// records this as the resolved Open Question.
pub const IMPLICIT_NODE_LABEL: &str = "Entity";

pub struct GraphManager {
    pool: Arc<StoragePool>,
    index: Arc<RwLock<IndexedGraph>>,
}

impl GraphManager {
    /// Builds the in-memory index from every row currently in storage.
    pub fn open(pool: Arc<StoragePool>) -> CkgResult<Self> {
        let mut index = IndexedGraph::new();
        pool.with_reader(|conn| {
            let nodes = node_ops::list_all_nodes(conn)?;
            let mut node_indices = std::collections::HashMap::new();
            for node in &nodes {
                let idx = index.ensure_node(node);
                node_indices.insert(node.id.clone(), idx);
            }
            for edge in edge_ops::list_all_edges(conn)? {
                if let (Some(&s), Some(&t)) = (node_indices.get(&edge.source), node_indices.get(&edge.target)) {
                    index.upsert_edge(s, t, &edge);
                }
            }
            Ok(())
        })?;
        Ok(Self { pool, index: Arc::new(RwLock::new(index)) })
    }

    fn read(&self) -> CkgResult<RwLockReadGuard<'_, IndexedGraph>> {
        self.index.read().map_err(|_| CkgError::Internal {
            correlation_id: uuid::Uuid::new_v4().to_string(),
            message: "graph index lock poisoned".to_string(),
        })
    }

    fn write(&self) -> CkgResult<RwLockWriteGuard<'_, IndexedGraph>> {
        self.index.write().map_err(|_| CkgError::Internal {
            correlation_id: uuid::Uuid::new_v4().to_string(),
            message: "graph index lock poisoned".to_string(),
        })
    }

    /// `add_node(label, name, properties, vector_id?)` (spec.md §4.5).
    /// Idempotent: a second call with the same `(label, name)` returns the
    /// existing node and mutates nothing.
    pub fn add_node(
        &self,
        label: &str,
        name: &str,
        properties: serde_json::Value,
        vector_id: Option<&str>,
    ) -> CkgResult<Node> {
        let node = self.pool.with_writer(|conn| node_ops::upsert_node(conn, label, name, properties, vector_id))?;
        self.write()?.ensure_node(&node);
        Ok(node)
    }

    /// `add_edge(source_name, target_name, relation, weight?, properties?)`
    /// (spec.md §4.5). Upserts both endpoints (creating them with
    /// `IMPLICIT_NODE_LABEL` if absent), classifies the sector on creation,
    /// and merges properties last-write-wins on conflict.
    pub fn add_edge(
        &self,
        source_name: &str,
        target_name: &str,
        relation: &str,
        weight: Option<f64>,
        properties: Option<serde_json::Value>,
    ) -> CkgResult<Edge> {
        let properties = properties.unwrap_or_else(|| serde_json::Value::Object(Default::default()));
        let weight = weight.unwrap_or(1.0).clamp(0.0, 1.0);

        let (source_node, target_node, edge, is_new) = self.pool.with_writer(|conn| {
            let source_node = resolve_or_create_endpoint(conn, source_name)?;
            let target_node = resolve_or_create_endpoint(conn, target_name)?;

            let existing = edge_ops::get_edge_by_ids(conn, &source_node.id, &target_node.id, relation)?;
            let is_new = existing.is_none();

            let sector = if is_new { classify(relation, &properties) } else { existing.as_ref().unwrap().sector };
            let entrenchment = if properties.get("edge_type").and_then(|v| v.as_str()) == Some("constitutive") {
                EntrenchmentLevel::Maximal
            } else {
                existing.as_ref().map(|e| e.entrenchment_level).unwrap_or_default()
            };

            let edge = edge_ops::upsert_edge(
                conn,
                &source_node.id,
                &target_node.id,
                relation,
                weight,
                properties,
                sector,
                entrenchment,
            )?;
            Ok((source_node, target_node, edge, is_new))
        })?;

        let mut index = self.write()?;
        let s_idx = index.ensure_node(&source_node);
        let t_idx = index.ensure_node(&target_node);
        index.upsert_edge(s_idx, t_idx, &edge);
        drop(index);

        tracing::debug!(edge_id = %edge.id, relation, is_new, "edge upserted");
        Ok(edge)
    }

    pub fn get_node_by_name(&self, label: &str, name: &str) -> CkgResult<Option<Node>> {
        self.pool.with_reader(|conn| node_ops::get_node_by_name(conn, label, name))
    }

    pub fn get_edge_by_names(&self, source_name: &str, target_name: &str, relation: &str) -> CkgResult<Option<Edge>> {
        let edge = self.pool.with_reader(|conn| {
            let source = node_ops::get_node_by_name_any_label(conn, source_name)?;
            let target = node_ops::get_node_by_name_any_label(conn, target_name)?;
            match (source, target) {
                (Some(s), Some(t)) => edge_ops::get_edge_by_ids(conn, &s.id, &t.id, relation),
                _ => Ok(None),
            }
        })?;
        if let Some(e) = &edge {
            self.touch_edges(std::slice::from_ref(&e.id));
        }
        Ok(edge)
    }

    /// Deletion under protection (spec.md §4.5 "Protection"). Every attempt
    /// — blocked or not — writes an audit entry in the same transaction as
    /// the mutation, if any.
    pub fn delete_edge(&self, edge_id: &str, consent_given: bool, actor: &str) -> CkgResult<()> {
        self.pool.with_writer(|conn| {
            let edge = edge_ops::get_edge_by_id(conn, edge_id)?
                .ok_or_else(|| CkgError::NotFound { what: format!("edge {edge_id}") })?;

            if let Err(e) = check_delete_allowed(&edge, consent_given) {
                let entry = AuditEntry::new("delete_edge", actor)
                    .for_edge(edge_id)
                    .blocked_with_reason(e.to_string());
                audit_ops::insert_audit_entry(conn, &entry)?;
                return Err(CkgError::Graph(e));
            }

            edge_ops::delete_edge_row(conn, edge_id)?;
            let entry = AuditEntry::new("delete_edge", actor).for_edge(edge_id);
            audit_ops::insert_audit_entry(conn, &entry)?;
            Ok(())
        })?;

        self.write()?.remove_edge(edge_id);
        Ok(())
    }

    /// `reclassify_memory_sector` (spec.md §4.5, §6 status enum). Returns
    /// `(old_sector, new_sector)`.
    pub fn reclassify_sector(&self, edge_id: &str, new_sector: Sector, actor: &str) -> CkgResult<(Sector, Sector)> {
        let (old_sector, updated) = self.pool.with_writer(|conn| {
            let edge = edge_ops::get_edge_by_id(conn, edge_id)?
                .ok_or_else(|| CkgError::NotFound { what: format!("edge {edge_id}") })?;
            let old_sector = edge.sector;
            edge_ops::reclassify_sector(conn, edge_id, old_sector, new_sector, actor)?;

            let mut entry = AuditEntry::new("reclassify_memory_sector", actor).for_edge(edge_id);
            entry.properties = serde_json::json!({"from_sector": old_sector, "to_sector": new_sector});
            audit_ops::insert_audit_entry(conn, &entry)?;

            let updated = edge_ops::get_edge_by_id(conn, edge_id)?
                .ok_or_else(|| CkgError::NotFound { what: format!("edge {edge_id}") })?;
            Ok((old_sector, updated))
        })?;

        // Look up both node indices before taking the write lock — never
        // hold a read guard and a write guard on the index at once.
        let endpoints = {
            let index = self.read()?;
            (index.get_node(&updated.source), index.get_node(&updated.target))
        };
        if let (Some(s), Some(t)) = endpoints {
            self.write()?.upsert_edge(s, t, &updated);
        }
        Ok((old_sector, new_sector))
    }

    /// Updates an edge's weight in place, auditing the mutation. Used by the
    /// SMF execution path (spec.md §4.7 "Execution always goes through Graph
    /// core; protection and audit apply") — bilateral-consent gating happens
    /// one level up, in `ckg-smf`, before this is ever called.
    pub fn update_edge_weight(&self, edge_id: &str, new_weight: f64, actor: &str) -> CkgResult<Edge> {
        let updated = self.pool.with_writer(|conn| {
            edge_ops::get_edge_by_id(conn, edge_id)?
                .ok_or_else(|| CkgError::NotFound { what: format!("edge {edge_id}") })?;
            edge_ops::update_weight(conn, edge_id, new_weight.clamp(0.0, 1.0))?;

            let mut entry = AuditEntry::new("update_edge_weight", actor).for_edge(edge_id);
            entry.properties = serde_json::json!({"new_weight": new_weight});
            audit_ops::insert_audit_entry(conn, &entry)?;

            edge_ops::get_edge_by_id(conn, edge_id)?
                .ok_or_else(|| CkgError::NotFound { what: format!("edge {edge_id}") })
        })?;

        let endpoints = {
            let index = self.read()?;
            (index.get_node(&updated.source), index.get_node(&updated.target))
        };
        if let (Some(s), Some(t)) = endpoints {
            self.write()?.upsert_edge(s, t, &updated);
        }
        Ok(updated)
    }

    /// Overwrites an edge's mutable fields with a prior snapshot, auditing
    /// the mutation. Used by `ckg-smf`'s undo path to restore pre-execution
    /// state (spec.md §4.7 Undo).
    pub fn restore_edge(&self, edge: &Edge, actor: &str) -> CkgResult<Edge> {
        let restored = self.pool.with_writer(|conn| {
            edge_ops::restore_edge_state(conn, edge)?;
            let entry = AuditEntry::new("restore_edge_state", actor).for_edge(&edge.id);
            audit_ops::insert_audit_entry(conn, &entry)?;
            edge_ops::get_edge_by_id(conn, &edge.id)?
                .ok_or_else(|| CkgError::NotFound { what: format!("edge {}", edge.id) })
        })?;

        let endpoints = {
            let index = self.read()?;
            (index.get_node(&restored.source), index.get_node(&restored.target))
        };
        if let (Some(s), Some(t)) = endpoints {
            self.write()?.upsert_edge(s, t, &restored);
        }
        Ok(restored)
    }

    /// `resolve_dissonance(edge_a, edge_b, resolution_type, context)` (spec.md
    /// §4.6). Inserts a resolution hyperedge between the shared endpoints of
    /// `superseded`/`surviving`, documenting the relationship without
    /// deleting either original. Goes through `GraphManager` like every
    /// other mutation so audit is inescapable (spec.md §2 "Dissonance and
    /// SMF mutate state only through Graph-core APIs").
    pub fn resolve_dissonance(
        &self,
        superseded: &Edge,
        surviving: &Edge,
        resolution_type: ckg_core::models::ResolutionType,
        context: &str,
        resolved_by: &str,
    ) -> CkgResult<Edge> {
        let properties = serde_json::json!({
            "edge_type": "resolution",
            "resolution_type": resolution_type,
            "supersedes": [superseded.id.clone()],
            "superseded_by": [surviving.id.clone()],
            "context": context,
        });
        let relation = format!("RESOLVES_{}", uuid::Uuid::new_v4());

        let resolution = self.pool.with_writer(|conn| {
            let resolution = edge_ops::upsert_edge(
                conn,
                &superseded.source,
                &superseded.target,
                &relation,
                1.0,
                properties,
                superseded.sector,
                EntrenchmentLevel::Default,
            )?;

            edge_ops::mark_superseded(conn, &superseded.id, &resolution.id, resolution_type, context, resolved_by)?;

            let entry = AuditEntry::new("resolve_dissonance", resolved_by)
                .for_edge(&resolution.id);
            audit_ops::insert_audit_entry(conn, &entry)?;

            edge_ops::get_edge_by_id(conn, &resolution.id)?
                .ok_or_else(|| CkgError::NotFound { what: format!("edge {}", resolution.id) })
        })?;

        // Refresh both the resolution edge and the now-superseded original in
        // the in-memory index.
        let superseded_reloaded = self.pool.with_reader(|conn| edge_ops::get_edge_by_id(conn, &superseded.id))?
            .ok_or_else(|| CkgError::NotFound { what: format!("edge {}", superseded.id) })?;
        let endpoints = {
            let index = self.read()?;
            (index.get_node(&resolution.source), index.get_node(&resolution.target))
        };
        if let (Some(s), Some(t)) = endpoints {
            let mut index = self.write()?;
            index.upsert_edge(s, t, &resolution);
            index.upsert_edge(s, t, &superseded_reloaded);
        }

        Ok(resolution)
    }

    /// Matches `(source, target, relation)` ambiguously when more than one
    /// edge satisfies it — surfaced as `GraphError::Ambiguous` (spec.md §7).
    /// In this engine `(source, target, relation)` is a DB-enforced unique
    /// key, so ambiguity can only arise when callers pass a bare relation
    /// name expected to match a set of candidate edges sharing an endpoint;
    /// exposed here for that caller shape.
    pub fn find_ambiguous_or_single(&self, source_name: &str, relation: &str) -> CkgResult<Edge> {
        let candidates = self.pool.with_reader(|conn| {
            let source = node_ops::get_node_by_name_any_label(conn, source_name)?
                .ok_or_else(|| CkgError::NotFound { what: format!("node {source_name}") })?;
            edge_ops::get_edges_for_node(conn, &source.id)
        })?;
        let matching: Vec<Edge> = candidates.into_iter().filter(|e| e.relation == relation).collect();
        match matching.len() {
            0 => Err(CkgError::NotFound { what: format!("edge {source_name}/{relation}") }),
            1 => Ok(matching.into_iter().next().unwrap()),
            n => Err(CkgError::Graph(GraphError::Ambiguous {
                count: n,
                edge_ids: matching.into_iter().map(|e| e.id).collect(),
            })),
        }
    }

    /// `query_neighbors(node, relation?, depth, sector_filter?, include_superseded)`
    /// (spec.md §4.5). Applies the TGN auto-update to every returned edge.
    pub fn query_neighbors(
        &self,
        node_id: &str,
        relation: Option<&str>,
        depth: u32,
        sector_filter: Option<&[Sector]>,
        include_superseded: bool,
    ) -> CkgResult<Vec<NeighborHit>> {
        let index = self.read()?;
        let Some(start) = index.get_node(node_id) else {
            return Err(CkgError::Graph(GraphError::NodeNotFound { label: String::new(), name: node_id.to_string() }));
        };
        let hits = traversal::query_neighbors(&index, start, relation, depth, sector_filter, include_superseded)?;
        drop(index);

        let edge_ids: Vec<String> = hits.iter().map(|h| h.edge_id.clone()).collect();
        self.touch_edges(&edge_ids);
        Ok(hits)
    }

    /// `find_path(start, end, max_depth)` (spec.md §4.5). Excludes superseded
    /// edges from the walk unless `include_superseded` (spec.md §8 universal
    /// invariant — same default `query_neighbors` honors).
    pub fn find_path(
        &self,
        start_id: &str,
        end_id: &str,
        max_depth: u32,
        include_superseded: bool,
    ) -> CkgResult<PathResult> {
        let index = self.read()?;
        let start = index
            .get_node(start_id)
            .ok_or_else(|| CkgError::Graph(GraphError::NodeNotFound { label: String::new(), name: start_id.to_string() }))?;
        let end = index
            .get_node(end_id)
            .ok_or_else(|| CkgError::Graph(GraphError::NodeNotFound { label: String::new(), name: end_id.to_string() }))?;
        let result = traversal::find_path(&index, start, end, max_depth, include_superseded)?;
        drop(index);

        let edge_ids: Vec<String> = result.paths.iter().flatten().filter_map(|s| s.edge_id.clone()).collect();
        self.touch_edges(&edge_ids);
        Ok(result)
    }

    /// TGN auto-update: best-effort, logged at WARN on failure, never fails
    /// the enclosing read (spec.md §4.5, §5 "TGN write visibility").
    pub fn touch_edges(&self, edge_ids: &[String]) {
        if edge_ids.is_empty() {
            return;
        }
        let now = Utc::now();
        let ids = edge_ids.to_vec();
        let result = self.pool.with_writer(|conn| edge_ops::touch_access_batch(conn, &ids, now));
        if let Err(e) = result {
            tracing::warn!(error = %e, "TGN auto-update failed; read result is unaffected");
        }
    }

    /// Best-effort entity-mention resolution for the hybrid retrieval graph
    /// leg (spec.md §4.9 "extracts salient entity names ... from the
    /// query"): case-insensitive exact match of each candidate string
    /// against indexed node names. Unmatched candidates are silently
    /// dropped; duplicate node hits across candidates are deduplicated.
    pub fn match_entity_names(&self, candidates: &[String]) -> CkgResult<Vec<String>> {
        let index = self.read()?;
        let mut seen = std::collections::HashSet::new();
        let mut matched = Vec::new();
        for candidate in candidates {
            if let Some(idx) = index.find_by_name_ci(candidate) {
                let id = index.node_record(idx).id.clone();
                if seen.insert(id.clone()) {
                    matched.push(id);
                }
            }
        }
        Ok(matched)
    }

    pub fn node_count(&self) -> CkgResult<usize> {
        Ok(self.read()?.node_count())
    }

    pub fn edge_count(&self) -> CkgResult<usize> {
        Ok(self.read()?.edge_count())
    }
}

fn resolve_or_create_endpoint(conn: &rusqlite::Connection, name: &str) -> CkgResult<Node> {
    if let Some(node) = node_ops::get_node_by_name_any_label(conn, name)? {
        return Ok(node);
    }
    node_ops::upsert_node(conn, IMPLICIT_NODE_LABEL, name, serde_json::Value::Object(Default::default()), None)
}
