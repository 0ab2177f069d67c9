//! Migration runner — version tracking, forward-only, transactional per
//! migration (grounded in the teacher's storage migration runner).

mod v001_graph_core;
mod v002_insights_fts5;
mod v003_session_tables;
mod v004_audit;
mod v005_smf;
mod v006_ief_feedback;
mod v007_logs;
mod v008_dissonance_review;

use rusqlite::Connection;
use tracing::{debug, info, warn};

use ckg_core::CkgResult;

use crate::to_storage_err;

pub const LATEST_VERSION: u32 = 8;

type MigrationFn = fn(&Connection) -> CkgResult<()>;

const MIGRATIONS: [(u32, &str, MigrationFn); 8] = [
    (1, "graph_core", v001_graph_core::migrate),
    (2, "insights_fts5", v002_insights_fts5::migrate),
    (3, "session_tables", v003_session_tables::migrate),
    (4, "audit", v004_audit::migrate),
    (5, "smf", v005_smf::migrate),
    (6, "ief_feedback", v006_ief_feedback::migrate),
    (7, "logs", v007_logs::migrate),
    (8, "dissonance_review", v008_dissonance_review::migrate),
];

/// Returns 0 if the `schema_version` table doesn't exist yet.
pub fn current_version(conn: &Connection) -> CkgResult<u32> {
    let exists: bool = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version'")
        .and_then(|mut stmt| stmt.exists([]))
        .map_err(|e| to_storage_err(e.to_string()))?;

    if !exists {
        return Ok(0);
    }

    conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |row| {
        row.get(0)
    })
    .map_err(|e| to_storage_err(e.to_string()))
}

pub fn run_migrations(conn: &Connection) -> CkgResult<u32> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    let current = current_version(conn)?;
    let mut applied = 0;

    if current >= LATEST_VERSION {
        debug!("database schema is up to date (v{current})");
        return Ok(0);
    }

    info!("running migrations: v{current} -> v{LATEST_VERSION}");

    for &(version, name, migrate_fn) in &MIGRATIONS {
        if version <= current {
            continue;
        }

        debug!("applying migration v{version:03}: {name}");
        conn.execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| to_storage_err(format!("begin transaction for v{version:03}: {e}")))?;

        match migrate_fn(conn) {
            Ok(()) => {
                conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])
                    .map_err(|e| to_storage_err(format!("record version v{version:03}: {e}")))?;
                conn.execute_batch("COMMIT")
                    .map_err(|e| to_storage_err(format!("commit v{version:03}: {e}")))?;
                info!("applied migration v{version:03}: {name}");
                applied += 1;
            }
            Err(e) => {
                warn!("migration v{version:03} failed: {e}, rolling back");
                let _ = conn.execute_batch("ROLLBACK");
                return Err(ckg_core::CkgError::Storage(
                    ckg_core::errors::StorageError::MigrationFailed {
                        version,
                        reason: e.to_string(),
                    },
                ));
            }
        }
    }

    info!("applied {applied} migration(s), now at v{LATEST_VERSION}");
    Ok(applied)
}
