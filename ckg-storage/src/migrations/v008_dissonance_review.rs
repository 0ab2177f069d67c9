//! v008: pending-review queue for NUANCE dissonance verdicts (spec.md §4.6
//! "NUANCE verdicts are additionally placed in a pending-review queue
//! (PENDING_IO_REVIEW)").

use rusqlite::Connection;

use ckg_core::CkgResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> CkgResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE pending_io_review (
            id              TEXT PRIMARY KEY,
            edge_a_id       TEXT NOT NULL,
            edge_b_id       TEXT NOT NULL,
            confidence      REAL NOT NULL,
            context_node    TEXT,
            created_at      TEXT NOT NULL,
            reviewed        INTEGER NOT NULL DEFAULT 0,
            reviewed_at     TEXT,
            reviewed_by     TEXT
        );

        CREATE INDEX idx_pending_io_review_reviewed ON pending_io_review(reviewed);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
