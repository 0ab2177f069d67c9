//! Connection pool: one dedicated writer connection plus a bounded set of
//! read-only connections, all against the same WAL-mode database file
//! (spec.md §4.1 "Transactional unit", §5 "Scoped acquisition").

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use ckg_core::CkgResult;

use crate::to_storage_err;
use crate::vector_fn::register_vector_functions;

/// Opens a connection with the pragmas this engine requires and registers
/// the scalar functions the query layer relies on.
fn open_connection(db_path: &Path, busy_timeout_ms: u64) -> CkgResult<Connection> {
    let conn = Connection::open(db_path).map_err(|e| to_storage_err(e.to_string()))?;
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA foreign_keys = ON;
         PRAGMA synchronous = NORMAL;",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    conn.busy_timeout(std::time::Duration::from_millis(busy_timeout_ms))
        .map_err(|e| to_storage_err(e.to_string()))?;
    register_vector_functions(&conn)?;
    Ok(conn)
}

/// A single write connection guarded by a mutex, plus a round-robin pool of
/// read connections. All connections point at the same on-disk file so WAL
/// keeps readers and the writer consistent.
pub struct StoragePool {
    writer: Mutex<Connection>,
    readers: Vec<Mutex<Connection>>,
    next_reader: std::sync::atomic::AtomicUsize,
}

impl StoragePool {
    pub fn open(db_path: &Path, pool_size: u32, busy_timeout_ms: u64) -> CkgResult<Arc<Self>> {
        let writer = open_connection(db_path, busy_timeout_ms)?;
        crate::migrations::run_migrations(&writer)?;

        let reader_count = pool_size.max(1) as usize;
        let mut readers = Vec::with_capacity(reader_count);
        for _ in 0..reader_count {
            readers.push(Mutex::new(open_connection(db_path, busy_timeout_ms)?));
        }

        Ok(Arc::new(Self {
            writer: Mutex::new(writer),
            readers,
            next_reader: std::sync::atomic::AtomicUsize::new(0),
        }))
    }

    /// In-memory pool for tests and fixtures; no file survives the process.
    pub fn open_in_memory() -> CkgResult<Arc<Self>> {
        let writer = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        register_vector_functions(&writer)?;
        crate::migrations::run_migrations(&writer)?;
        Ok(Arc::new(Self {
            writer: Mutex::new(writer),
            readers: Vec::new(),
            next_reader: std::sync::atomic::AtomicUsize::new(0),
        }))
    }

    /// Acquire the single write connection. Holds the mutex for the
    /// duration of the closure so callers should keep write transactions
    /// short (spec.md §5 "Scheduling model").
    pub fn with_writer<T>(&self, f: impl FnOnce(&Connection) -> CkgResult<T>) -> CkgResult<T> {
        let conn = self
            .writer
            .lock()
            .map_err(|_| crate::to_storage_err("writer connection poisoned".to_string()))?;
        f(&conn)
    }

    /// Acquire a read connection, falling back to the writer when no read
    /// pool was configured (in-memory / single-connection mode).
    pub fn with_reader<T>(&self, f: impl FnOnce(&Connection) -> CkgResult<T>) -> CkgResult<T> {
        if self.readers.is_empty() {
            return self.with_writer(f);
        }
        let idx = self
            .next_reader
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed)
            % self.readers.len();
        let conn = self.readers[idx]
            .lock()
            .map_err(|_| crate::to_storage_err("reader connection poisoned".to_string()))?;
        f(&conn)
    }
}
