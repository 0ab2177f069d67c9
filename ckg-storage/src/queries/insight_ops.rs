//! L2 insight CRUD, history, vector KNN (`nearest`), and lexical search
//! (`match`) (spec.md §3 Insight, §4.1).

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use ckg_core::models::{Insight, InsightHistoryEntry, Sector};
use ckg_core::CkgResult;

use crate::to_storage_err;
use crate::vector_fn::encode_vector;

pub fn insert_insight(conn: &Connection, insight: &Insight) -> CkgResult<()> {
    conn.execute(
        "INSERT INTO l2_insights (
            id, content, embedding, created_at, source_ids, metadata, memory_strength,
            is_deleted, deleted_at, deleted_by, deleted_reason, tags
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            insight.id,
            insight.content,
            insight.embedding.as_ref().map(|v| encode_vector(v)),
            insight.created_at.to_rfc3339(),
            serde_json::to_string(&insight.source_ids).unwrap_or_else(|_| "[]".to_string()),
            insight.metadata.to_string(),
            insight.memory_strength,
            insight.is_deleted,
            insight.deleted_at.map(|d| d.to_rfc3339()),
            insight.deleted_by,
            insight.deleted_reason,
            serde_json::to_string(&insight.tags).unwrap_or_else(|_| "[]".to_string()),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Returns `None` for soft-deleted insights as well as absent ones — callers
/// surface `NotFound` either way (spec.md §5 `get_insight_by_id`).
pub fn get_insight_by_id(conn: &Connection, id: &str) -> CkgResult<Option<Insight>> {
    let insight: Option<Insight> = conn
        .query_row(&select_sql("id = ?1"), params![id], row_to_insight)
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(insight.filter(|i| !i.is_deleted))
}

pub fn list_insights(conn: &Connection, limit: u32) -> CkgResult<Vec<Insight>> {
    let mut stmt = conn
        .prepare(&select_sql("is_deleted = 0 ORDER BY created_at DESC LIMIT ?1"))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt.query_map(params![limit], row_to_insight).map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(|e| to_storage_err(e.to_string()))
}

/// Vector KNN over non-deleted insight embeddings, ordered by cosine
/// distance ascending.
pub fn nearest(conn: &Connection, query_vec: &[f32], k: u32) -> CkgResult<Vec<(Insight, f64)>> {
    let encoded = encode_vector(query_vec);
    let mut stmt = conn
        .prepare(&format!(
            "{}, cosine_distance(embedding, ?1) AS distance
             FROM l2_insights WHERE is_deleted = 0 AND embedding IS NOT NULL
             ORDER BY distance ASC LIMIT ?2",
            select_sql_columns()
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map(params![encoded, k], |row| {
            let insight = row_to_insight(row)?;
            let distance: f64 = row.get(12)?;
            Ok((insight, distance))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(|e| to_storage_err(e.to_string()))
}

/// FTS5 lexical search over insight content, ranked by BM25.
pub fn lexical_match(conn: &Connection, query_text: &str, k: u32) -> CkgResult<Vec<(Insight, f64)>> {
    let mut stmt = conn
        .prepare(
            "SELECT i.id, i.content, i.embedding, i.created_at, i.source_ids, i.metadata,
                    i.memory_strength, i.is_deleted, i.deleted_at, i.deleted_by, i.deleted_reason,
                    i.tags, fts.rank
             FROM l2_insights_fts fts
             JOIN l2_insights i ON i.rowid = fts.rowid
             WHERE l2_insights_fts MATCH ?1 AND i.is_deleted = 0
             ORDER BY fts.rank LIMIT ?2",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map(params![query_text, k], |row| {
            let insight = row_to_insight(row)?;
            let rank: f64 = row.get(12)?;
            Ok((insight, rank))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(|e| to_storage_err(e.to_string()))
}

/// Sectors of every edge touching a node whose `vector_id` points at this
/// insight (hybrid retrieval's `sector_filter`, spec.md §4.9: "filter
/// applies to ... edge-linked insights"). An insight with no linked node, or
/// a node with no edges, yields an empty set — `sector_filter` then excludes
/// it unless the caller passes `None`.
pub fn sectors_for_insight(conn: &Connection, insight_id: &str) -> CkgResult<Vec<Sector>> {
    let mut stmt = conn
        .prepare(
            "SELECT DISTINCT e.sector FROM edges e
             JOIN nodes n ON n.id = e.source OR n.id = e.target
             WHERE n.vector_id = ?1",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![insight_id], |row| row.get::<_, String>(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
        .map(|strs| strs.into_iter().map(|s| Sector::from_str_name(&s).unwrap_or_default()).collect())
}

/// Updates content/strength and writes the paired history row in the same
/// transaction (spec.md §5 `update_insight`: "History row and L2 update
/// occur in one transaction").
pub fn update_insight(
    conn: &Connection,
    id: &str,
    new_content: Option<&str>,
    new_memory_strength: Option<f64>,
    history: InsightHistoryEntry,
) -> CkgResult<()> {
    if let Some(content) = new_content {
        conn.execute("UPDATE l2_insights SET content = ?1 WHERE id = ?2", params![content, id])
            .map_err(|e| to_storage_err(e.to_string()))?;
    }
    if let Some(strength) = new_memory_strength {
        conn.execute(
            "UPDATE l2_insights SET memory_strength = ?1 WHERE id = ?2",
            params![strength, id],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    }
    insert_history(conn, &history)?;
    Ok(())
}

pub fn delete_insight(conn: &Connection, id: &str, deleted_by: &str, reason: &str, history: InsightHistoryEntry) -> CkgResult<()> {
    let now = Utc::now();
    conn.execute(
        "UPDATE l2_insights SET is_deleted = 1, deleted_at = ?1, deleted_by = ?2, deleted_reason = ?3 WHERE id = ?4",
        params![now.to_rfc3339(), deleted_by, reason, id],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    insert_history(conn, &history)?;
    Ok(())
}

fn insert_history(conn: &Connection, entry: &InsightHistoryEntry) -> CkgResult<()> {
    conn.execute(
        "INSERT INTO l2_insight_history (
            id, insight_id, action, actor, old_content, new_content,
            old_memory_strength, new_memory_strength, reason, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            entry.id,
            entry.insight_id,
            history_action_str(entry.action),
            actor_str(entry.actor),
            entry.old_content,
            entry.new_content,
            entry.old_memory_strength,
            entry.new_memory_strength,
            entry.reason,
            entry.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

fn history_action_str(action: ckg_core::models::InsightHistoryAction) -> &'static str {
    match action {
        ckg_core::models::InsightHistoryAction::Update => "update",
        ckg_core::models::InsightHistoryAction::Delete => "delete",
    }
}

fn actor_str(actor: ckg_core::models::Actor) -> &'static str {
    match actor {
        ckg_core::models::Actor::Primary => "primary",
        ckg_core::models::Actor::Secondary => "secondary",
    }
}

fn select_sql_columns() -> &'static str {
    "SELECT id, content, embedding, created_at, source_ids, metadata, memory_strength,
            is_deleted, deleted_at, deleted_by, deleted_reason, tags"
}

fn select_sql_prefix(predicate: &str) -> String {
    format!("{} FROM l2_insights WHERE {predicate}", select_sql_columns())
}

fn select_sql(predicate: &str) -> String {
    select_sql_prefix(predicate)
}

fn row_to_insight(row: &rusqlite::Row<'_>) -> rusqlite::Result<Insight> {
    let created_at_str: String = row.get(3)?;
    let source_ids_str: String = row.get(4)?;
    let metadata_str: String = row.get(5)?;
    let tags_str: String = row.get(11)?;
    let embedding: Option<Vec<u8>> = row.get(2)?;

    Ok(Insight {
        id: row.get(0)?,
        content: row.get(1)?,
        embedding: embedding.map(|b| crate::vector_fn::decode_vector(&b)),
        created_at: chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        source_ids: serde_json::from_str(&source_ids_str).unwrap_or_default(),
        metadata: serde_json::from_str(&metadata_str).unwrap_or(serde_json::Value::Null),
        memory_strength: row.get(6)?,
        is_deleted: row.get(7)?,
        deleted_at: row.get::<_, Option<String>>(8)?.and_then(|s| {
            chrono::DateTime::parse_from_rfc3339(&s).map(|dt| dt.with_timezone(&Utc)).ok()
        }),
        deleted_by: row.get(9)?,
        deleted_reason: row.get(10)?,
        tags: serde_json::from_str(&tags_str).unwrap_or_default(),
    })
}
