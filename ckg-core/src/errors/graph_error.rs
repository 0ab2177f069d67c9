/// Errors surfaced by the graph core (node/edge CRUD, protection, traversal).
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("constitutive edge {edge_id} cannot be deleted without consent")]
    ConstitutiveEdgeProtection { edge_id: String },

    #[error("ambiguous match: {count} edges satisfy (source, target, relation)")]
    Ambiguous { count: usize, edge_ids: Vec<String> },

    #[error("node not found: {label}/{name}")]
    NodeNotFound { label: String, name: String },

    #[error("edge not found: {edge_id}")]
    EdgeNotFound { edge_id: String },

    #[error("unknown sector: {0}")]
    InvalidSector(String),

    #[error("traversal deadline exceeded after {elapsed_ms}ms")]
    DeadlineExceeded { elapsed_ms: u64 },
}
