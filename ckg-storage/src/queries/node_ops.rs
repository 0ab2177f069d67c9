//! Node upsert and name-based lookup (spec.md §3 Node, §4.1).

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use ckg_core::models::Node;
use ckg_core::CkgResult;

use crate::to_storage_err;

/// `add_node(label, name, properties, vector_id?)`: returns the existing row
/// matching `(label, name)` if present, otherwise inserts and returns it
/// (spec.md §4.5 "Upsert semantics").
pub fn upsert_node(
    conn: &Connection,
    label: &str,
    name: &str,
    properties: serde_json::Value,
    vector_id: Option<&str>,
) -> CkgResult<Node> {
    if let Some(existing) = get_node_by_name(conn, label, name)? {
        return Ok(existing);
    }

    let node = Node {
        id: uuid::Uuid::new_v4().to_string(),
        label: label.to_string(),
        name: name.to_string(),
        properties,
        vector_id: vector_id.map(str::to_string),
        created_at: Utc::now(),
    };

    conn.execute(
        "INSERT INTO nodes (id, label, name, properties, vector_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            node.id,
            node.label,
            node.name,
            node.properties.to_string(),
            node.vector_id,
            node.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    Ok(node)
}

pub fn get_node_by_name(conn: &Connection, label: &str, name: &str) -> CkgResult<Option<Node>> {
    conn.query_row(
        "SELECT id, label, name, properties, vector_id, created_at
         FROM nodes WHERE label = ?1 AND name = ?2",
        params![label, name],
        row_to_node,
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))
}

/// Looks a node up by `name` alone, across labels — used when a caller (an
/// edge upsert) names an endpoint without its label. Ambiguity between two
/// labels sharing a name is resolved by `created_at` ascending (first wins),
/// matching `add_node`'s own idempotent-upsert precedent.
pub fn get_node_by_name_any_label(conn: &Connection, name: &str) -> CkgResult<Option<Node>> {
    conn.query_row(
        "SELECT id, label, name, properties, vector_id, created_at
         FROM nodes WHERE name = ?1 ORDER BY created_at ASC LIMIT 1",
        params![name],
        row_to_node,
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))
}

/// Reverse lookup for the `nodes.vector_id -> l2_insights.id` coupling
/// (spec.md §4.9, §9 Open Question on insight/edge strength coupling): the
/// node whose embedding is carried by insight `insight_id`, if any. Multiple
/// nodes pointing at the same insight resolve to the first by `created_at`.
pub fn get_node_by_vector_id(conn: &Connection, insight_id: &str) -> CkgResult<Option<Node>> {
    conn.query_row(
        "SELECT id, label, name, properties, vector_id, created_at
         FROM nodes WHERE vector_id = ?1 ORDER BY created_at ASC LIMIT 1",
        params![insight_id],
        row_to_node,
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))
}

pub fn get_node_by_id(conn: &Connection, id: &str) -> CkgResult<Option<Node>> {
    conn.query_row(
        "SELECT id, label, name, properties, vector_id, created_at FROM nodes WHERE id = ?1",
        params![id],
        row_to_node,
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))
}

/// Full node set, used by `ckg-graph` to rebuild its in-memory index on
/// startup (spec.md §4.5; §9 "ownership is flat ... identified by surrogate
/// IDs").
pub fn list_all_nodes(conn: &Connection) -> CkgResult<Vec<Node>> {
    let mut stmt = conn
        .prepare("SELECT id, label, name, properties, vector_id, created_at FROM nodes")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt.query_map([], row_to_node).map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(|e| to_storage_err(e.to_string()))
}

pub fn count_by_label(conn: &Connection, label: &str) -> CkgResult<i64> {
    conn.query_row("SELECT COUNT(*) FROM nodes WHERE label = ?1", params![label], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))
}

fn row_to_node(row: &rusqlite::Row<'_>) -> rusqlite::Result<Node> {
    let properties_str: String = row.get(3)?;
    let created_at_str: String = row.get(5)?;
    Ok(Node {
        id: row.get(0)?,
        label: row.get(1)?,
        name: row.get(2)?,
        properties: serde_json::from_str(&properties_str).unwrap_or(serde_json::Value::Null),
        vector_id: row.get(4)?,
        created_at: chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}
