//! In-memory graph index: `petgraph::stable_graph::StableDiGraph` plus a
//! `name -> NodeIndex` and `edge_id -> EdgeIndex` lookup, mirroring the
//! teacher's `cortex_causal::graph::stable_graph::IndexedGraph` shape but
//! generalized to a multigraph (several relations may connect the same pair
//! of nodes) instead of the teacher's DAG-of-causal-edges.

use std::collections::HashMap;

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};

use ckg_core::models::{Edge, Node};

/// Node payload carried by the graph: just enough to resolve a traversal hit
/// back to a storage row without a back-pointer (spec.md §9 "ownership is
/// flat").
#[derive(Debug, Clone)]
pub struct NodeRecord {
    pub id: String,
    pub label: String,
    pub name: String,
}

impl From<&Node> for NodeRecord {
    fn from(n: &Node) -> Self {
        Self { id: n.id.clone(), label: n.label.clone(), name: n.name.clone() }
    }
}

/// Edge payload carried by the graph: the fields `query_neighbors` sorts and
/// filters on, without needing a storage round-trip per hop.
#[derive(Debug, Clone)]
pub struct EdgeRecord {
    pub id: String,
    pub relation: String,
    pub weight: f64,
    pub sector: ckg_core::models::Sector,
    pub is_superseded: bool,
}

impl From<&Edge> for EdgeRecord {
    fn from(e: &Edge) -> Self {
        Self {
            id: e.id.clone(),
            relation: e.relation.clone(),
            weight: e.weight,
            sector: e.sector,
            is_superseded: e.is_superseded(),
        }
    }
}

/// The indexed graph: a multigraph over node surrogate IDs.
pub struct IndexedGraph {
    pub graph: StableDiGraph<NodeRecord, EdgeRecord>,
    by_id: HashMap<String, NodeIndex>,
    edge_by_id: HashMap<String, EdgeIndex>,
}

impl IndexedGraph {
    pub fn new() -> Self {
        Self { graph: StableDiGraph::new(), by_id: HashMap::new(), edge_by_id: HashMap::new() }
    }

    pub fn get_node(&self, node_id: &str) -> Option<NodeIndex> {
        self.by_id.get(node_id).copied()
    }

    pub fn node_index_for_name(&self, label: &str, name: &str) -> Option<NodeIndex> {
        self.graph.node_indices().find(|&idx| {
            let n = &self.graph[idx];
            n.label == label && n.name == name
        })
    }

    /// Case-insensitive exact match on name, any label — used by the hybrid
    /// retrieval graph leg's entity-mention resolution.
    pub fn find_by_name_ci(&self, name: &str) -> Option<NodeIndex> {
        let lowered = name.to_lowercase();
        self.graph.node_indices().find(|&idx| self.graph[idx].name.to_lowercase() == lowered)
    }

    pub fn node_record(&self, idx: NodeIndex) -> &NodeRecord {
        &self.graph[idx]
    }

    /// Inserts the node if its ID is not already indexed; returns its index
    /// either way.
    pub fn ensure_node(&mut self, node: &Node) -> NodeIndex {
        if let Some(&idx) = self.by_id.get(&node.id) {
            return idx;
        }
        let idx = self.graph.add_node(NodeRecord::from(node));
        self.by_id.insert(node.id.clone(), idx);
        idx
    }

    /// Inserts or replaces the edge payload for `edge.id` between its
    /// endpoints. Does not enforce `(source, target, relation)` uniqueness —
    /// that invariant is the store's (a `UNIQUE` constraint); this index
    /// only mirrors what the store already accepted.
    pub fn upsert_edge(&mut self, source_idx: NodeIndex, target_idx: NodeIndex, edge: &Edge) {
        if let Some(&existing) = self.edge_by_id.get(&edge.id) {
            if let Some(weight) = self.graph.edge_weight_mut(existing) {
                *weight = EdgeRecord::from(edge);
                return;
            }
        }
        let idx = self.graph.add_edge(source_idx, target_idx, EdgeRecord::from(edge));
        self.edge_by_id.insert(edge.id.clone(), idx);
    }

    pub fn remove_edge(&mut self, edge_id: &str) {
        if let Some(idx) = self.edge_by_id.remove(edge_id) {
            self.graph.remove_edge(idx);
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl Default for IndexedGraph {
    fn default() -> Self {
        Self::new()
    }
}
