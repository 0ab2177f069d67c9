//! v002: L2 insights, their history, and the FTS5 lexical index over
//! content (spec.md §3 Insight, Insight history; §4.1 "full-text index on
//! insight content"; §8 `l2_insights`, `l2_insight_history`).

use rusqlite::Connection;

use ckg_core::CkgResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> CkgResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE l2_insights (
            id               TEXT PRIMARY KEY,
            content          TEXT NOT NULL,
            embedding        BLOB,
            created_at       TEXT NOT NULL,
            source_ids       TEXT NOT NULL DEFAULT '[]',
            metadata         TEXT NOT NULL DEFAULT '{}',
            memory_strength  REAL NOT NULL DEFAULT 0.5,
            is_deleted       INTEGER NOT NULL DEFAULT 0,
            deleted_at       TEXT,
            deleted_by       TEXT,
            deleted_reason   TEXT,
            tags             TEXT NOT NULL DEFAULT '[]'
        );

        CREATE INDEX idx_l2_insights_is_deleted ON l2_insights(is_deleted);

        CREATE VIRTUAL TABLE l2_insights_fts USING fts5(
            content,
            content='l2_insights',
            content_rowid='rowid'
        );

        CREATE TRIGGER l2_insights_ai AFTER INSERT ON l2_insights BEGIN
            INSERT INTO l2_insights_fts(rowid, content) VALUES (new.rowid, new.content);
        END;
        CREATE TRIGGER l2_insights_ad AFTER DELETE ON l2_insights BEGIN
            INSERT INTO l2_insights_fts(l2_insights_fts, rowid, content) VALUES ('delete', old.rowid, old.content);
        END;
        CREATE TRIGGER l2_insights_au AFTER UPDATE ON l2_insights BEGIN
            INSERT INTO l2_insights_fts(l2_insights_fts, rowid, content) VALUES ('delete', old.rowid, old.content);
            INSERT INTO l2_insights_fts(rowid, content) VALUES (new.rowid, new.content);
        END;

        CREATE TABLE l2_insight_history (
            id                    TEXT PRIMARY KEY,
            insight_id            TEXT NOT NULL REFERENCES l2_insights(id),
            action                TEXT NOT NULL,
            actor                 TEXT NOT NULL,
            old_content           TEXT,
            new_content           TEXT,
            old_memory_strength   REAL,
            new_memory_strength   REAL,
            reason                TEXT NOT NULL,
            created_at            TEXT NOT NULL
        );

        CREATE INDEX idx_l2_insight_history_insight ON l2_insight_history(insight_id);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
