//! v007: ground truth, golden test set, model drift log, API cost/retry
//! logs, and the IEF recalibration marker (spec.md §6, §8).

use rusqlite::Connection;

use ckg_core::CkgResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> CkgResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE ground_truth (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            query           TEXT NOT NULL,
            expected_docs   TEXT NOT NULL DEFAULT '[]',
            judge1_score    REAL,
            judge2_score    REAL,
            judge1_model    TEXT,
            judge2_model    TEXT,
            kappa           REAL,
            created_at      TEXT NOT NULL
        );

        CREATE TABLE golden_test_set (
            id                TEXT PRIMARY KEY,
            query             TEXT NOT NULL,
            expected_doc_ids  TEXT NOT NULL DEFAULT '[]',
            sector_filter     TEXT,
            notes             TEXT,
            created_at        TEXT NOT NULL
        );

        CREATE TABLE model_drift_log (
            date                     TEXT PRIMARY KEY,
            precision_at_5           REAL NOT NULL,
            num_queries              INTEGER NOT NULL,
            avg_retrieval_time_ms    REAL NOT NULL,
            embedding_model_version  TEXT NOT NULL,
            drift_detected           INTEGER NOT NULL DEFAULT 0,
            baseline_p5              REAL NOT NULL
        );

        CREATE TABLE api_cost_log (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            provider    TEXT NOT NULL,
            operation   TEXT NOT NULL,
            tokens_in   INTEGER NOT NULL DEFAULT 0,
            tokens_out  INTEGER NOT NULL DEFAULT 0,
            cost_usd    REAL NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX idx_api_cost_log_created_at ON api_cost_log(created_at DESC);

        CREATE TABLE api_retry_log (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            provider       TEXT NOT NULL,
            operation      TEXT NOT NULL,
            attempt        INTEGER NOT NULL,
            delay_seconds  REAL NOT NULL,
            error          TEXT NOT NULL,
            created_at     TEXT NOT NULL
        );

        CREATE INDEX idx_api_retry_log_created_at ON api_retry_log(created_at DESC);

        -- Single-row marker tracking the last IEF recalibration, so
        -- RECALIBRATION_THRESHOLD can be measured against feedback rows
        -- created since that point (spec.md §4.9).
        CREATE TABLE ief_recalibration_marker (
            id                    INTEGER PRIMARY KEY CHECK (id = 1),
            last_recalibrated_at  TEXT
        );
        INSERT INTO ief_recalibration_marker (id, last_recalibrated_at) VALUES (1, NULL);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
