//! Edge upsert, mutation, and name/id-based lookup. Constitutive protection
//! is enforced one layer up (ckg-graph); this module is plain CRUD plus the
//! merge semantics the spec calls out explicitly (spec.md §4.5).

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use ckg_core::models::{Edge, EntrenchmentLevel, ResolutionType, Sector};
use ckg_core::CkgResult;

use crate::to_storage_err;

/// Inserts a new edge, or — on `(source, target, relation)` conflict —
/// merges `properties` (last-write-wins on overlapping keys) and bumps
/// `modified_at` (spec.md §4.5 "on conflict the edge properties merge").
#[allow(clippy::too_many_arguments)]
pub fn upsert_edge(
    conn: &Connection,
    source: &str,
    target: &str,
    relation: &str,
    weight: f64,
    properties: serde_json::Value,
    sector: Sector,
    entrenchment_level: EntrenchmentLevel,
) -> CkgResult<Edge> {
    if let Some(mut existing) = get_edge_by_ids(conn, source, target, relation)? {
        merge_properties(&mut existing.properties, &properties);
        existing.modified_at = Utc::now();
        conn.execute(
            "UPDATE edges SET properties = ?1, modified_at = ?2, weight = ?3 WHERE id = ?4",
            params![
                existing.properties.to_string(),
                existing.modified_at.to_rfc3339(),
                weight,
                existing.id,
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
        existing.weight = weight;
        return Ok(existing);
    }

    let now = Utc::now();
    let edge = Edge {
        id: uuid::Uuid::new_v4().to_string(),
        source: source.to_string(),
        target: target.to_string(),
        relation: relation.to_string(),
        weight,
        properties,
        sector,
        entrenchment_level,
        created_at: now,
        modified_at: now,
        last_accessed: now,
        access_count: 0,
        last_reclassification: None,
        resolution_type: None,
        supersedes: None,
        superseded_by: None,
        resolution_context: None,
        resolved_at: None,
        resolved_by: None,
    };

    conn.execute(
        "INSERT INTO edges (
            id, source, target, relation, weight, properties, sector, entrenchment_level,
            created_at, modified_at, last_accessed, access_count
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            edge.id,
            edge.source,
            edge.target,
            edge.relation,
            edge.weight,
            edge.properties.to_string(),
            edge.sector.as_str(),
            entrenchment_level_str(edge.entrenchment_level),
            edge.created_at.to_rfc3339(),
            edge.modified_at.to_rfc3339(),
            edge.last_accessed.to_rfc3339(),
            edge.access_count,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    Ok(edge)
}

fn merge_properties(into: &mut serde_json::Value, from: &serde_json::Value) {
    if let (Some(into_map), Some(from_map)) = (into.as_object_mut(), from.as_object()) {
        for (k, v) in from_map {
            into_map.insert(k.clone(), v.clone());
        }
    }
}

pub fn get_edge_by_id(conn: &Connection, id: &str) -> CkgResult<Option<Edge>> {
    conn.query_row(&select_edge_sql("id = ?1"), params![id], row_to_edge)
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))
}

pub fn get_edge_by_ids(conn: &Connection, source: &str, target: &str, relation: &str) -> CkgResult<Option<Edge>> {
    conn.query_row(
        &select_edge_sql("source = ?1 AND target = ?2 AND relation = ?3"),
        params![source, target, relation],
        row_to_edge,
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))
}

/// All non-superseded edges touching `node_id` as either endpoint.
pub fn get_edges_for_node(conn: &Connection, node_id: &str) -> CkgResult<Vec<Edge>> {
    let mut stmt = conn
        .prepare(&select_edge_sql("(source = ?1 OR target = ?1) AND superseded_by IS NULL"))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![node_id], row_to_edge)
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

pub fn list_edges_by_sector(conn: &Connection, sector: Sector) -> CkgResult<Vec<Edge>> {
    let mut stmt = conn
        .prepare(&select_edge_sql("sector = ?1 AND superseded_by IS NULL"))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![sector.as_str()], row_to_edge)
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Hard-deletes an edge row. Callers are responsible for the protection
/// check and audit emission (ckg-graph).
pub fn delete_edge_row(conn: &Connection, id: &str) -> CkgResult<()> {
    conn.execute("DELETE FROM edges WHERE id = ?1", params![id])
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn touch_access(conn: &Connection, id: &str, at: chrono::DateTime<Utc>) -> CkgResult<()> {
    conn.execute(
        "UPDATE edges SET last_accessed = ?1, access_count = access_count + 1 WHERE id = ?2",
        params![at.to_rfc3339(), id],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Bulk `(last_accessed, access_count)` bump for every edge ID in `ids`, in
/// one statement — the TGN auto-update any read that returns edges must
/// perform (spec.md §4.5 "bulk-update ... for every returned edge in a
/// single statement"). Best-effort: callers log failures at WARN and do not
/// fail the enclosing read.
pub fn touch_access_batch(conn: &Connection, ids: &[String], at: chrono::DateTime<Utc>) -> CkgResult<()> {
    if ids.is_empty() {
        return Ok(());
    }
    let placeholders = ids.iter().enumerate().map(|(i, _)| format!("?{}", i + 2)).collect::<Vec<_>>().join(", ");
    let sql = format!(
        "UPDATE edges SET last_accessed = ?1, access_count = access_count + 1 WHERE id IN ({placeholders})"
    );
    let mut params_vec: Vec<&dyn rusqlite::ToSql> = Vec::with_capacity(ids.len() + 1);
    let at_str = at.to_rfc3339();
    params_vec.push(&at_str);
    for id in ids {
        params_vec.push(id);
    }
    conn.execute(&sql, params_vec.as_slice()).map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn update_weight(conn: &Connection, id: &str, weight: f64) -> CkgResult<()> {
    conn.execute(
        "UPDATE edges SET weight = ?1, modified_at = ?2 WHERE id = ?3",
        params![weight, Utc::now().to_rfc3339(), id],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Reclassifies an edge's sector, leaving a structured record reachable
/// straight off the edge (`properties.last_reclassification`), not solely in
/// the audit log — `{from_sector, to_sector, actor, at}` (spec.md §8
/// round-trip test: "a read of the edge ... returns
/// `properties.last_reclassification.{from_sector,to_sector} = (old, s)`";
/// scenario 2: "`last_reclassification.actor` and timestamp are updated").
pub fn reclassify_sector(conn: &Connection, id: &str, old_sector: Sector, sector: Sector, actor: &str) -> CkgResult<()> {
    let now = Utc::now();
    let mut edge = get_edge_by_id(conn, id)?.ok_or_else(|| to_storage_err(format!("edge {id} vanished mid-reclassification")))?;
    if let Some(obj) = edge.properties.as_object_mut() {
        obj.insert(
            "last_reclassification".to_string(),
            serde_json::json!({
                "from_sector": old_sector,
                "to_sector": sector,
                "actor": actor,
                "at": now.to_rfc3339(),
            }),
        );
    }
    conn.execute(
        "UPDATE edges SET sector = ?1, properties = ?2, modified_at = ?3, last_reclassification = ?3 WHERE id = ?4",
        params![sector.as_str(), edge.properties.to_string(), now.to_rfc3339(), id],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Records edge `superseded_id` as resolved by `resolution_id` — the
/// resolution hyperedge documents the contradiction/evolution without
/// deleting history (spec.md §4.6).
pub fn mark_superseded(
    conn: &Connection,
    superseded_id: &str,
    resolution_id: &str,
    resolution_type: ResolutionType,
    context: &str,
    resolved_by: &str,
) -> CkgResult<()> {
    let now = Utc::now();
    conn.execute(
        "UPDATE edges SET superseded_by = ?1 WHERE id = ?2",
        params![resolution_id, superseded_id],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    conn.execute(
        "UPDATE edges SET
            supersedes = ?1, resolution_type = ?2, resolution_context = ?3,
            resolved_at = ?4, resolved_by = ?5
         WHERE id = ?6",
        params![
            superseded_id,
            resolution_type_str(resolution_type),
            context,
            now.to_rfc3339(),
            resolved_by,
            resolution_id,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Full edge set, used by `ckg-graph` to rebuild its in-memory index on
/// startup.
pub fn list_all_edges(conn: &Connection) -> CkgResult<Vec<Edge>> {
    let mut stmt = conn.prepare(&select_edge_sql("1 = 1")).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt.query_map([], row_to_edge).map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(|e| to_storage_err(e.to_string()))
}

/// Overwrites every mutable field of an existing edge row with `edge`'s
/// values — used by `smf_undo` to restore a pre-execution snapshot
/// (spec.md §4.7 Undo). The identity fields (`id`, `source`, `target`,
/// `relation`) are assumed unchanged.
pub fn restore_edge_state(conn: &Connection, edge: &Edge) -> CkgResult<()> {
    conn.execute(
        "UPDATE edges SET
            weight = ?1, properties = ?2, sector = ?3, entrenchment_level = ?4,
            modified_at = ?5, last_accessed = ?6, access_count = ?7,
            last_reclassification = ?8, resolution_type = ?9, supersedes = ?10,
            superseded_by = ?11, resolution_context = ?12, resolved_at = ?13, resolved_by = ?14
         WHERE id = ?15",
        params![
            edge.weight,
            edge.properties.to_string(),
            edge.sector.as_str(),
            entrenchment_level_str(edge.entrenchment_level),
            edge.modified_at.to_rfc3339(),
            edge.last_accessed.to_rfc3339(),
            edge.access_count,
            edge.last_reclassification.map(|d| d.to_rfc3339()),
            edge.resolution_type.map(resolution_type_str),
            edge.supersedes,
            edge.superseded_by,
            edge.resolution_context,
            edge.resolved_at.map(|d| d.to_rfc3339()),
            edge.resolved_by,
            edge.id,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn edge_count(conn: &Connection) -> CkgResult<i64> {
    conn.query_row("SELECT COUNT(*) FROM edges", [], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))
}

fn select_edge_sql(predicate: &str) -> String {
    format!(
        "SELECT id, source, target, relation, weight, properties, sector, entrenchment_level,
                created_at, modified_at, last_accessed, access_count, last_reclassification,
                resolution_type, supersedes, superseded_by, resolution_context, resolved_at, resolved_by
         FROM edges WHERE {predicate}"
    )
}

fn entrenchment_level_str(level: EntrenchmentLevel) -> &'static str {
    match level {
        EntrenchmentLevel::Default => "default",
        EntrenchmentLevel::Maximal => "maximal",
    }
}

fn resolution_type_str(rt: ResolutionType) -> &'static str {
    match rt {
        ResolutionType::Evolution => "evolution",
        ResolutionType::Contradiction => "contradiction",
        ResolutionType::Nuance => "nuance",
    }
}

fn row_to_edge(row: &rusqlite::Row<'_>) -> rusqlite::Result<Edge> {
    let properties_str: String = row.get(5)?;
    let sector_str: String = row.get(6)?;
    let entrenchment_str: String = row.get(7)?;
    let parse_ts = |s: String| {
        chrono::DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    };

    Ok(Edge {
        id: row.get(0)?,
        source: row.get(1)?,
        target: row.get(2)?,
        relation: row.get(3)?,
        weight: row.get(4)?,
        properties: serde_json::from_str(&properties_str).unwrap_or(serde_json::Value::Null),
        sector: Sector::from_str_name(&sector_str).unwrap_or_default(),
        entrenchment_level: if entrenchment_str == "maximal" {
            EntrenchmentLevel::Maximal
        } else {
            EntrenchmentLevel::Default
        },
        created_at: parse_ts(row.get(8)?),
        modified_at: parse_ts(row.get(9)?),
        last_accessed: parse_ts(row.get(10)?),
        access_count: row.get::<_, i64>(11)? as u64,
        last_reclassification: row.get::<_, Option<String>>(12)?.map(parse_ts),
        resolution_type: row.get::<_, Option<String>>(13)?.and_then(|s| match s.as_str() {
            "evolution" => Some(ResolutionType::Evolution),
            "contradiction" => Some(ResolutionType::Contradiction),
            "nuance" => Some(ResolutionType::Nuance),
            _ => None,
        }),
        supersedes: row.get(14)?,
        superseded_by: row.get(15)?,
        resolution_context: row.get(16)?,
        resolved_at: row.get::<_, Option<String>>(17)?.map(parse_ts),
        resolved_by: row.get(18)?,
    })
}
