//! v006: IEF feedback (spec.md §3, §4.9).

use rusqlite::Connection;

use ckg_core::CkgResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> CkgResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE ief_feedback (
            id                         INTEGER PRIMARY KEY AUTOINCREMENT,
            query_id                   TEXT NOT NULL,
            query_text                 TEXT NOT NULL,
            helpful                    INTEGER,
            feedback_reason            TEXT,
            constitutive_weight_used   REAL NOT NULL,
            created_at                 TEXT NOT NULL
        );

        CREATE INDEX idx_ief_feedback_created_at ON ief_feedback(created_at DESC);
        CREATE INDEX idx_ief_feedback_unlabeled ON ief_feedback(helpful) WHERE helpful IS NULL;
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
