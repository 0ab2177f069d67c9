/// Errors surfaced by the dissonance engine.
#[derive(Debug, thiserror::Error)]
pub enum DissonanceError {
    #[error("resolution references an edge that is already superseded: {edge_id}")]
    AlreadySuperseded { edge_id: String },

    #[error("supersedes and superseded_by sets overlap on edge(s): {edge_ids:?}")]
    SupersedesOverlap { edge_ids: Vec<String> },
}
