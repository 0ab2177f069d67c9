//! Scoped transaction helper: begin/commit/rollback on every exit path,
//! including an early return via `?` (spec.md §5 "Scoped acquisition").

use rusqlite::Connection;

use ckg_core::CkgResult;

use crate::to_storage_err;

pub fn with_transaction<T>(
    conn: &Connection,
    f: impl FnOnce(&Connection) -> CkgResult<T>,
) -> CkgResult<T> {
    conn.execute_batch("BEGIN IMMEDIATE")
        .map_err(|e| to_storage_err(format!("begin transaction: {e}")))?;

    match f(conn) {
        Ok(value) => {
            conn.execute_batch("COMMIT")
                .map_err(|e| to_storage_err(format!("commit: {e}")))?;
            Ok(value)
        }
        Err(e) => {
            let _ = conn.execute_batch("ROLLBACK");
            Err(e)
        }
    }
}
