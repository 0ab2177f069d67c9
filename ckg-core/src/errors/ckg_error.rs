use super::{
    DissonanceError, EmbeddingError, GraphError, OracleError, SmfError, StorageError,
};

/// Top-level error type for the CKG engine. All subsystem errors convert into
/// this via `From` impls so call sites can propagate with `?` regardless of
/// which layer produced the failure.
#[derive(Debug, thiserror::Error)]
pub enum CkgError {
    #[error("not found: {what}")]
    NotFound { what: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Smf(#[from] SmfError),

    #[error(transparent)]
    Dissonance(#[from] DissonanceError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("internal error [{correlation_id}]: {message}")]
    Internal {
        correlation_id: String,
        message: String,
    },
}

/// Convenience type alias, used throughout the workspace the way
/// `cortex_core::CortexResult` is used in the teacher crate.
pub type CkgResult<T> = Result<T, CkgError>;

impl CkgError {
    /// The `ErrorKind` string carried in the JSON error envelope (spec.md §6).
    pub fn kind(&self) -> &'static str {
        match self {
            CkgError::NotFound { .. } => "NotFound",
            CkgError::InvalidArgument(_) => "InvalidArgument",
            CkgError::Graph(GraphError::ConstitutiveEdgeProtection { .. }) => {
                "ConstitutiveEdgeProtection"
            }
            CkgError::Graph(GraphError::Ambiguous { .. }) => "Ambiguous",
            CkgError::Graph(GraphError::InvalidSector(_)) => "InvalidArgument",
            CkgError::Graph(_) => "NotFound",
            CkgError::Smf(SmfError::ConsentRequired { .. }) => "ConsentRequired",
            CkgError::Smf(SmfError::FramingViolation { .. }) => "FramingViolation",
            CkgError::Smf(SmfError::RetentionExpired { .. }) => "RetentionExpired",
            CkgError::Smf(_) => "InvalidArgument",
            CkgError::Dissonance(_) => "InvalidArgument",
            CkgError::Storage(StorageError::ConnectionUnavailable) => "ConnectionUnavailable",
            CkgError::Storage(_) => "Internal",
            CkgError::Embedding(_) => "EmbeddingUnavailable",
            CkgError::Oracle(OracleError::ClassifierUnavailable(_)) => "ClassifierUnavailable",
            CkgError::Oracle(_) => "ClassifierUnavailable",
            CkgError::Serialization(_) => "InvalidArgument",
            CkgError::Config(_) => "InvalidArgument",
            CkgError::Internal { .. } => "Internal",
        }
    }
}
