//! Bounded recursive traversal and shortest-path search over the in-memory
//! index (spec.md §4.5 `query_neighbors`, `find_path`).

use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};

use petgraph::stable_graph::NodeIndex;
use petgraph::Direction;

use ckg_core::errors::GraphError;
use ckg_core::models::Sector;

use crate::stable_graph::IndexedGraph;

pub const FIND_PATH_DEADLINE: Duration = Duration::from_secs(1);
pub const FIND_PATH_MAX_RESULTS: usize = 10;

/// One `(node, relation, distance, weight, sector)` tuple (spec.md §4.5).
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborHit {
    pub node_id: String,
    pub node_label: String,
    pub node_name: String,
    pub relation: String,
    pub distance: u32,
    pub weight: f64,
    pub sector: Sector,
    pub edge_id: String,
}

/// `find_path` response shape (spec.md §4.5).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathResult {
    pub path_found: bool,
    pub path_length: usize,
    pub paths: Vec<Vec<PathStep>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathStep {
    pub node_id: String,
    pub edge_id: Option<String>,
}

/// Bounded BFS from `start`, depth `[1, 5]`, undirected (an edge connects
/// its endpoints regardless of direction — the CKG models claims, not flow),
/// with cycle suppression by tracking visited node IDs along the current
/// path. Optionally filtered by relation name and/or sector; superseded
/// edges excluded unless `include_superseded`.
#[allow(clippy::too_many_arguments)]
pub fn query_neighbors(
    graph: &IndexedGraph,
    start: NodeIndex,
    relation_filter: Option<&str>,
    depth: u32,
    sector_filter: Option<&[Sector]>,
    include_superseded: bool,
) -> Result<Vec<NeighborHit>, GraphError> {
    let depth = depth.clamp(1, 5);
    let mut hits = Vec::new();
    let mut frontier: VecDeque<(NodeIndex, u32, HashSet<NodeIndex>)> = VecDeque::new();
    let mut start_path = HashSet::new();
    start_path.insert(start);
    frontier.push_back((start, 0, start_path));

    while let Some((current, dist, visited)) = frontier.pop_front() {
        if dist >= depth {
            continue;
        }
        for direction in [Direction::Outgoing, Direction::Incoming] {
            let mut walker = graph.graph.neighbors_directed(current, direction).detach();
            while let Some((edge_idx, neighbor)) = walker.next(&graph.graph) {
                if visited.contains(&neighbor) {
                    continue;
                }
                let Some(edge) = graph.graph.edge_weight(edge_idx) else { continue };
                if !include_superseded && edge.is_superseded {
                    continue;
                }
                if let Some(rel) = relation_filter {
                    if edge.relation != rel {
                        continue;
                    }
                }
                if let Some(sectors) = sector_filter {
                    if !sectors.contains(&edge.sector) {
                        continue;
                    }
                }
                let Some(node) = graph.graph.node_weight(neighbor) else { continue };
                hits.push(NeighborHit {
                    node_id: node.id.clone(),
                    node_label: node.label.clone(),
                    node_name: node.name.clone(),
                    relation: edge.relation.clone(),
                    distance: dist + 1,
                    weight: edge.weight,
                    sector: edge.sector,
                    edge_id: edge.id.clone(),
                });

                let mut next_visited = visited.clone();
                next_visited.insert(neighbor);
                frontier.push_back((neighbor, dist + 1, next_visited));
            }
        }
    }

    hits.sort_by(|a, b| {
        a.distance
            .cmp(&b.distance)
            .then(b.weight.partial_cmp(&a.weight).unwrap_or(std::cmp::Ordering::Equal))
    });
    Ok(hits)
}

/// Bounded BFS shortest-path search between `start` and `end`. Returns up to
/// `FIND_PATH_MAX_RESULTS` shortest paths (ties kept at the winning length),
/// honoring a `FIND_PATH_DEADLINE` wall-clock cap (spec.md §4.5). Superseded
/// edges are excluded from the walk unless `include_superseded`, matching
/// `query_neighbors`'s default (spec.md §8 universal invariant).
pub fn find_path(
    graph: &IndexedGraph,
    start: NodeIndex,
    end: NodeIndex,
    max_depth: u32,
    include_superseded: bool,
) -> Result<PathResult, GraphError> {
    let deadline = Instant::now();
    let max_depth = max_depth.clamp(1, 5);

    if start == end {
        let node = &graph.graph[start];
        return Ok(PathResult {
            path_found: true,
            path_length: 0,
            paths: vec![vec![PathStep { node_id: node.id.clone(), edge_id: None }]],
        });
    }

    // BFS layer by layer, collecting every path that reaches `end` at the
    // first layer where any path does (shortest-path semantics with ties).
    let mut frontier: Vec<Vec<(NodeIndex, Option<petgraph::stable_graph::EdgeIndex>)>> =
        vec![vec![(start, None)]];
    let mut found: Vec<Vec<(NodeIndex, Option<petgraph::stable_graph::EdgeIndex>)>> = Vec::new();

    for _ in 0..max_depth {
        if deadline.elapsed() > FIND_PATH_DEADLINE {
            return Err(GraphError::DeadlineExceeded { elapsed_ms: deadline.elapsed().as_millis() as u64 });
        }
        let mut next_frontier = Vec::new();
        for path in &frontier {
            let (current, _) = *path.last().unwrap();
            let visited: HashSet<NodeIndex> = path.iter().map(|(n, _)| *n).collect();

            for direction in [Direction::Outgoing, Direction::Incoming] {
                let mut walker = graph.graph.neighbors_directed(current, direction).detach();
                while let Some((edge_idx, neighbor)) = walker.next(&graph.graph) {
                    if visited.contains(&neighbor) {
                        continue;
                    }
                    if !include_superseded {
                        let Some(edge) = graph.graph.edge_weight(edge_idx) else { continue };
                        if edge.is_superseded {
                            continue;
                        }
                    }
                    let mut extended = path.clone();
                    extended.push((neighbor, Some(edge_idx)));
                    if neighbor == end {
                        found.push(extended);
                    } else {
                        next_frontier.push(extended);
                    }
                }
            }
        }

        if !found.is_empty() {
            break;
        }
        if next_frontier.is_empty() {
            break;
        }
        frontier = next_frontier;
    }

    if found.is_empty() {
        return Ok(PathResult { path_found: false, path_length: 0, paths: Vec::new() });
    }

    found.truncate(FIND_PATH_MAX_RESULTS);
    let path_length = found[0].len() - 1;

    let paths = found
        .into_iter()
        .map(|path| {
            path.into_iter()
                .map(|(idx, edge_idx)| PathStep {
                    node_id: graph.graph[idx].id.clone(),
                    edge_id: edge_idx.and_then(|e| graph.graph.edge_weight(e)).map(|e| e.id.clone()),
                })
                .collect::<Vec<_>>()
        })
        .collect();

    Ok(PathResult { path_found: true, path_length, paths })
}
