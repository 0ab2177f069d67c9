//! # ckg-storage
//!
//! SQLite persistence layer for the constitutive knowledge graph engine.
//! Single write connection plus a bounded read pool (WAL mode), forward-only
//! transactional migrations, and the query modules that back the Graph
//! core, session/write-through, SMF, and log subsystems.

pub mod migrations;
pub mod pool;
pub mod queries;
pub mod transaction;
pub mod vector_fn;

pub use pool::StoragePool;
pub use transaction::with_transaction;

/// Convert a rusqlite error into a `ckg_core::CkgError::Storage`.
pub fn to_storage_err(msg: String) -> ckg_core::CkgError {
    ckg_core::CkgError::Storage(ckg_core::errors::StorageError::SqliteError { message: msg })
}
