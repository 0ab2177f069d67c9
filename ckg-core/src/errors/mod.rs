mod ckg_error;
mod dissonance_error;
mod embedding_error;
mod graph_error;
mod oracle_error;
mod smf_error;
mod storage_error;

pub use ckg_error::{CkgError, CkgResult};
pub use dissonance_error::DissonanceError;
pub use embedding_error::EmbeddingError;
pub use graph_error::GraphError;
pub use oracle_error::OracleError;
pub use smf_error::SmfError;
pub use storage_error::StorageError;
