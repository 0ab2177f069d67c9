//! Pending-review queue for NUANCE dissonance verdicts (spec.md §4.6).

use chrono::Utc;
use rusqlite::{params, Connection};

use ckg_core::models::PendingIoReview;
use ckg_core::CkgResult;

use crate::to_storage_err;

pub fn insert_pending_review(conn: &Connection, item: &PendingIoReview) -> CkgResult<()> {
    conn.execute(
        "INSERT INTO pending_io_review (id, edge_a_id, edge_b_id, confidence, context_node, created_at, reviewed)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)",
        params![
            item.id,
            item.edge_a_id,
            item.edge_b_id,
            item.confidence,
            item.context_node,
            item.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn list_unreviewed(conn: &Connection) -> CkgResult<Vec<PendingIoReview>> {
    let mut stmt = conn
        .prepare(&select_sql("reviewed = 0 ORDER BY created_at DESC"))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt.query_map([], row_to_item).map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(|e| to_storage_err(e.to_string()))
}

pub fn mark_reviewed(conn: &Connection, id: &str, reviewed_by: &str) -> CkgResult<()> {
    conn.execute(
        "UPDATE pending_io_review SET reviewed = 1, reviewed_at = ?1, reviewed_by = ?2 WHERE id = ?3",
        params![Utc::now().to_rfc3339(), reviewed_by, id],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

fn select_sql(predicate: &str) -> String {
    format!(
        "SELECT id, edge_a_id, edge_b_id, confidence, context_node, created_at, reviewed, reviewed_at, reviewed_by
         FROM pending_io_review WHERE {predicate}"
    )
}

fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<PendingIoReview> {
    let created_at_str: String = row.get(5)?;
    let reviewed_at_str: Option<String> = row.get(7)?;
    Ok(PendingIoReview {
        id: row.get(0)?,
        edge_a_id: row.get(1)?,
        edge_b_id: row.get(2)?,
        confidence: row.get(3)?,
        context_node: row.get(4)?,
        created_at: chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        reviewed: row.get::<_, i64>(6)? != 0,
        reviewed_at: reviewed_at_str.and_then(|s| {
            chrono::DateTime::parse_from_rfc3339(&s).ok().map(|dt| dt.with_timezone(&Utc))
        }),
        reviewed_by: row.get(8)?,
    })
}
