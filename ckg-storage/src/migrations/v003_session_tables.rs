//! v003: raw dialogue (L0), working/stale memory, episode memory
//! (spec.md §3 "Raw dialogue (L0)", §5 `update_working_memory`,
//! `store_episode`; §8).

use rusqlite::Connection;

use ckg_core::CkgResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> CkgResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE l0_raw (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id  TEXT NOT NULL,
            timestamp   TEXT NOT NULL,
            speaker     TEXT NOT NULL,
            content     TEXT NOT NULL,
            metadata    TEXT NOT NULL DEFAULT '{}'
        );

        CREATE INDEX idx_l0_raw_session ON l0_raw(session_id, timestamp);

        CREATE TABLE working_memory (
            id             TEXT PRIMARY KEY,
            content        TEXT NOT NULL,
            importance     REAL NOT NULL,
            created_at     TEXT NOT NULL,
            last_accessed  TEXT NOT NULL
        );

        CREATE TABLE stale_memory (
            id           TEXT PRIMARY KEY,
            content      TEXT NOT NULL,
            importance   REAL NOT NULL,
            reason       TEXT NOT NULL,
            evicted_at   TEXT NOT NULL
        );

        CREATE TABLE episode_memory (
            id          TEXT PRIMARY KEY,
            query       TEXT NOT NULL,
            reward      REAL NOT NULL,
            reflection  TEXT NOT NULL,
            embedding   BLOB,
            created_at  TEXT NOT NULL
        );
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
