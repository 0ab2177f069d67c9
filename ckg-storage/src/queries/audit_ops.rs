//! Audit log insert and query (spec.md §3 Audit log).

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use ckg_core::models::AuditEntry;
use ckg_core::CkgResult;

use crate::to_storage_err;

pub fn insert_audit_entry(conn: &Connection, entry: &AuditEntry) -> CkgResult<i64> {
    conn.execute(
        "INSERT INTO audit_log (edge_id, action, blocked, reason, actor, properties, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            entry.edge_id,
            entry.action,
            entry.blocked,
            entry.reason,
            entry.actor,
            entry.properties.to_string(),
            entry.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(conn.last_insert_rowid())
}

pub fn query_by_edge(conn: &Connection, edge_id: &str) -> CkgResult<Vec<AuditEntry>> {
    let mut stmt = conn
        .prepare(&select_sql("edge_id = ?1 ORDER BY created_at DESC"))
        .map_err(|e| to_storage_err(e.to_string()))?;
    collect(&mut stmt, params![edge_id])
}

pub fn query_by_time_range(conn: &Connection, from: DateTime<Utc>, to: DateTime<Utc>) -> CkgResult<Vec<AuditEntry>> {
    let mut stmt = conn
        .prepare(&select_sql("created_at >= ?1 AND created_at <= ?2 ORDER BY created_at DESC"))
        .map_err(|e| to_storage_err(e.to_string()))?;
    collect(&mut stmt, params![from.to_rfc3339(), to.to_rfc3339()])
}

pub fn query_recent(conn: &Connection, limit: u32) -> CkgResult<Vec<AuditEntry>> {
    let mut stmt = conn
        .prepare(&select_sql("1 = 1 ORDER BY created_at DESC LIMIT ?1"))
        .map_err(|e| to_storage_err(e.to_string()))?;
    collect(&mut stmt, params![limit])
}

fn select_sql(predicate: &str) -> String {
    format!("SELECT id, edge_id, action, blocked, reason, actor, properties, created_at FROM audit_log WHERE {predicate}")
}

fn collect(stmt: &mut rusqlite::Statement<'_>, params: impl rusqlite::Params) -> CkgResult<Vec<AuditEntry>> {
    let rows = stmt.query_map(params, row_to_entry).map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(|e| to_storage_err(e.to_string()))
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<AuditEntry> {
    let properties_str: String = row.get(6)?;
    let created_at_str: String = row.get(7)?;
    Ok(AuditEntry {
        id: row.get(0)?,
        edge_id: row.get(1)?,
        action: row.get(2)?,
        blocked: row.get(3)?,
        reason: row.get(4)?,
        actor: row.get(5)?,
        properties: serde_json::from_str(&properties_str).unwrap_or(serde_json::Value::Null),
        created_at: chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}
