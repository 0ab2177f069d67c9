//! v004: audit log — append-only record of every mutation attempt on edges,
//! including blocked ones (spec.md §3 Audit log).

use rusqlite::Connection;

use ckg_core::CkgResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> CkgResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE audit_log (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            edge_id     TEXT,
            action      TEXT NOT NULL,
            blocked     INTEGER NOT NULL DEFAULT 0,
            reason      TEXT,
            actor       TEXT NOT NULL,
            properties  TEXT NOT NULL DEFAULT '{}',
            created_at  TEXT NOT NULL
        );

        CREATE INDEX idx_audit_log_edge ON audit_log(edge_id);
        CREATE INDEX idx_audit_log_created_at ON audit_log(created_at DESC);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
