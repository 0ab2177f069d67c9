//! Ground truth, golden test set, drift/cost/retry logs (spec.md §6, §8).

use rusqlite::{params, Connection};

use ckg_core::models::{ApiCostLogEntry, ApiRetryLogEntry, GoldenTestCase, GroundTruth, ModelDriftLogEntry};
use ckg_core::CkgResult;

use crate::to_storage_err;

pub fn insert_ground_truth(conn: &Connection, gt: &GroundTruth) -> CkgResult<i64> {
    conn.execute(
        "INSERT INTO ground_truth (query, expected_docs, judge1_score, judge2_score, judge1_model, judge2_model, kappa, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            gt.query,
            serde_json::to_string(&gt.expected_docs).unwrap_or_else(|_| "[]".to_string()),
            gt.judge1_score,
            gt.judge2_score,
            gt.judge1_model,
            gt.judge2_model,
            gt.kappa,
            gt.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_golden_test_case(conn: &Connection, case: &GoldenTestCase) -> CkgResult<()> {
    conn.execute(
        "INSERT INTO golden_test_set (id, query, expected_doc_ids, sector_filter, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            case.id,
            case.query,
            serde_json::to_string(&case.expected_doc_ids).unwrap_or_else(|_| "[]".to_string()),
            case.sector_filter.as_ref().map(|f| serde_json::to_string(f).unwrap_or_else(|_| "[]".to_string())),
            case.notes,
            case.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn list_golden_test_cases(conn: &Connection) -> CkgResult<Vec<GoldenTestCase>> {
    let mut stmt = conn
        .prepare("SELECT id, query, expected_doc_ids, sector_filter, notes, created_at FROM golden_test_set ORDER BY created_at ASC")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| {
            let expected: String = row.get(2)?;
            let sector_filter: Option<String> = row.get(3)?;
            let created_at: String = row.get(5)?;
            Ok(GoldenTestCase {
                id: row.get(0)?,
                query: row.get(1)?,
                expected_doc_ids: serde_json::from_str(&expected).unwrap_or_default(),
                sector_filter: sector_filter.and_then(|s| serde_json::from_str(&s).ok()),
                notes: row.get(4)?,
                created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
                    .map(|dt| dt.with_timezone(&chrono::Utc))
                    .unwrap_or_else(|_| chrono::Utc::now()),
            })
        })
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(|e| to_storage_err(e.to_string()))
}

pub fn upsert_drift_log_entry(conn: &Connection, entry: &ModelDriftLogEntry) -> CkgResult<()> {
    conn.execute(
        "INSERT INTO model_drift_log (date, precision_at_5, num_queries, avg_retrieval_time_ms, embedding_model_version, drift_detected, baseline_p5)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(date) DO UPDATE SET
            precision_at_5 = excluded.precision_at_5,
            num_queries = excluded.num_queries,
            avg_retrieval_time_ms = excluded.avg_retrieval_time_ms,
            embedding_model_version = excluded.embedding_model_version,
            drift_detected = excluded.drift_detected,
            baseline_p5 = excluded.baseline_p5",
        params![
            entry.date.to_string(),
            entry.precision_at_5,
            entry.num_queries,
            entry.avg_retrieval_time_ms,
            entry.embedding_model_version,
            entry.drift_detected,
            entry.baseline_p5,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn insert_cost_log_entry(conn: &Connection, entry: &ApiCostLogEntry) -> CkgResult<i64> {
    conn.execute(
        "INSERT INTO api_cost_log (provider, operation, tokens_in, tokens_out, cost_usd, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            entry.provider,
            entry.operation,
            entry.tokens_in,
            entry.tokens_out,
            entry.cost_usd,
            entry.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_retry_log_entry(conn: &Connection, entry: &ApiRetryLogEntry) -> CkgResult<i64> {
    conn.execute(
        "INSERT INTO api_retry_log (provider, operation, attempt, delay_seconds, error, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            entry.provider,
            entry.operation,
            entry.attempt,
            entry.delay_seconds,
            entry.error,
            entry.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(conn.last_insert_rowid())
}
