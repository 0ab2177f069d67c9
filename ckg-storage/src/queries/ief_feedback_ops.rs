//! IEF feedback capture and recalibration-threshold bookkeeping
//! (spec.md §4.9).

use chrono::Utc;
use rusqlite::{params, Connection};

use ckg_core::models::IefFeedback;
use ckg_core::CkgResult;

use crate::to_storage_err;

pub fn insert_feedback(conn: &Connection, feedback: &IefFeedback) -> CkgResult<i64> {
    conn.execute(
        "INSERT INTO ief_feedback (query_id, query_text, helpful, feedback_reason, constitutive_weight_used, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            feedback.query_id,
            feedback.query_text,
            feedback.helpful,
            feedback.feedback_reason,
            feedback.constitutive_weight_used,
            feedback.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(conn.last_insert_rowid())
}

pub fn record_answer(conn: &Connection, query_id: &str, helpful: bool, reason: Option<&str>) -> CkgResult<()> {
    conn.execute(
        "UPDATE ief_feedback SET helpful = ?1, feedback_reason = ?2 WHERE query_id = ?3",
        params![helpful, reason, query_id],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Count of feedback entries (labeled or not) created since the last
/// recalibration marker.
pub fn entries_since_last_recalibration(conn: &Connection) -> CkgResult<u64> {
    let marker: Option<String> = conn
        .query_row("SELECT last_recalibrated_at FROM ief_recalibration_marker WHERE id = 1", [], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let count: i64 = match marker {
        Some(ts) => conn
            .query_row("SELECT COUNT(*) FROM ief_feedback WHERE created_at > ?1", params![ts], |row| row.get(0))
            .map_err(|e| to_storage_err(e.to_string()))?,
        None => conn
            .query_row("SELECT COUNT(*) FROM ief_feedback", [], |row| row.get(0))
            .map_err(|e| to_storage_err(e.to_string()))?,
    };
    Ok(count as u64)
}

/// Preference pairs `(helpful, constitutive_weight_used)` recorded since the
/// last recalibration — the input to the ICAI-style weight refit.
pub fn labeled_pairs_since_last_recalibration(conn: &Connection) -> CkgResult<Vec<(bool, f64)>> {
    let marker: Option<String> = conn
        .query_row("SELECT last_recalibrated_at FROM ief_recalibration_marker WHERE id = 1", [], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let row_fn = |row: &rusqlite::Row<'_>| Ok((row.get::<_, bool>(0)?, row.get::<_, f64>(1)?));

    let pairs = match marker {
        Some(ts) => {
            let mut stmt = conn
                .prepare("SELECT helpful, constitutive_weight_used FROM ief_feedback WHERE created_at > ?1 AND helpful IS NOT NULL")
                .map_err(|e| to_storage_err(e.to_string()))?;
            let rows = stmt.query_map(params![ts], row_fn).map_err(|e| to_storage_err(e.to_string()))?;
            rows.collect::<Result<Vec<_>, _>>().map_err(|e| to_storage_err(e.to_string()))?
        }
        None => {
            let mut stmt = conn
                .prepare("SELECT helpful, constitutive_weight_used FROM ief_feedback WHERE helpful IS NOT NULL")
                .map_err(|e| to_storage_err(e.to_string()))?;
            let rows = stmt.query_map([], row_fn).map_err(|e| to_storage_err(e.to_string()))?;
            rows.collect::<Result<Vec<_>, _>>().map_err(|e| to_storage_err(e.to_string()))?
        }
    };
    Ok(pairs)
}

pub fn mark_recalibrated(conn: &Connection) -> CkgResult<()> {
    conn.execute(
        "UPDATE ief_recalibration_marker SET last_recalibrated_at = ?1 WHERE id = 1",
        params![Utc::now().to_rfc3339()],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
