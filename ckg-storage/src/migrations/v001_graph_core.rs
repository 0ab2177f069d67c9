//! v001: nodes and edges — the graph core (spec.md §3 Node, Edge; §8
//! "composite B-tree on edges(last_accessed desc) and on edges(sector)").

use rusqlite::Connection;

use ckg_core::CkgResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> CkgResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE nodes (
            id          TEXT PRIMARY KEY,
            label       TEXT NOT NULL,
            name        TEXT NOT NULL,
            properties  TEXT NOT NULL DEFAULT '{}',
            vector_id   TEXT,
            created_at  TEXT NOT NULL,
            UNIQUE(label, name)
        );

        CREATE TABLE edges (
            id                     TEXT PRIMARY KEY,
            source                 TEXT NOT NULL REFERENCES nodes(id),
            target                 TEXT NOT NULL REFERENCES nodes(id),
            relation               TEXT NOT NULL,
            weight                 REAL NOT NULL DEFAULT 1.0,
            properties             TEXT NOT NULL DEFAULT '{}',
            sector                 TEXT NOT NULL DEFAULT 'semantic',
            entrenchment_level     TEXT NOT NULL DEFAULT 'default',
            created_at             TEXT NOT NULL,
            modified_at            TEXT NOT NULL,
            last_accessed          TEXT NOT NULL,
            access_count           INTEGER NOT NULL DEFAULT 0,
            last_reclassification  TEXT,
            resolution_type        TEXT,
            supersedes             TEXT REFERENCES edges(id),
            superseded_by          TEXT REFERENCES edges(id),
            resolution_context     TEXT,
            resolved_at            TEXT,
            resolved_by            TEXT,
            UNIQUE(source, target, relation)
        );

        CREATE INDEX idx_edges_last_accessed ON edges(last_accessed DESC);
        CREATE INDEX idx_edges_sector ON edges(sector);
        CREATE INDEX idx_edges_source ON edges(source);
        CREATE INDEX idx_edges_target ON edges(target);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
