//! Raw dialogue, working/stale memory, episode memory CRUD (spec.md §3,
//! §5 `store_raw_dialogue`, `update_working_memory`, `store_episode`).

use rusqlite::{params, Connection};

use ckg_core::models::{Episode, RawDialogue, StaleMemoryItem, WorkingMemoryItem};
use ckg_core::CkgResult;

use crate::to_storage_err;
use crate::vector_fn::{decode_vector, encode_vector};

pub fn append_raw_dialogue(conn: &Connection, dialogue: &RawDialogue) -> CkgResult<i64> {
    conn.execute(
        "INSERT INTO l0_raw (session_id, timestamp, speaker, content, metadata)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            dialogue.session_id,
            dialogue.timestamp.to_rfc3339(),
            dialogue.speaker,
            dialogue.content,
            dialogue.metadata.to_string(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_working_memory_item(conn: &Connection, item: &WorkingMemoryItem) -> CkgResult<()> {
    conn.execute(
        "INSERT INTO working_memory (id, content, importance, created_at, last_accessed)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            item.id,
            item.content,
            item.importance,
            item.created_at.to_rfc3339(),
            item.last_accessed.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn working_memory_size(conn: &Connection) -> CkgResult<usize> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM working_memory", [], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(count as usize)
}

/// The oldest-by-`last_accessed` item with `importance <= ceiling`, if any
/// (spec.md §5 "evicts the oldest last_accessed item whose importance <= 0.8").
pub fn oldest_evictable(conn: &Connection, importance_ceiling: f64) -> CkgResult<Option<WorkingMemoryItem>> {
    conn.query_row(
        "SELECT id, content, importance, created_at, last_accessed FROM working_memory
         WHERE importance <= ?1 ORDER BY last_accessed ASC LIMIT 1",
        params![importance_ceiling],
        row_to_working_item,
    )
    .optional_or_none()
}

pub fn remove_working_memory_item(conn: &Connection, id: &str) -> CkgResult<()> {
    conn.execute("DELETE FROM working_memory WHERE id = ?1", params![id])
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn insert_stale_memory_item(conn: &Connection, item: &StaleMemoryItem) -> CkgResult<()> {
    conn.execute(
        "INSERT INTO stale_memory (id, content, importance, reason, evicted_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![item.id, item.content, item.importance, item.reason, item.evicted_at.to_rfc3339()],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn insert_episode(conn: &Connection, episode: &Episode) -> CkgResult<()> {
    conn.execute(
        "INSERT INTO episode_memory (id, query, reward, reflection, embedding, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            episode.id,
            episode.query,
            episode.reward,
            episode.reflection,
            episode.embedding.as_ref().map(|v| encode_vector(v)),
            episode.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn list_episodes(conn: &Connection, limit: u32) -> CkgResult<Vec<Episode>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, query, reward, reflection, embedding, created_at
             FROM episode_memory ORDER BY created_at DESC LIMIT ?1",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt.query_map(params![limit], row_to_episode).map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(|e| to_storage_err(e.to_string()))
}

/// Top-`k` episodes by cosine similarity to `query_vec`, pre-filtered at
/// `min_similarity` (spec.md §5: "cosine >= 0.70, top-3 by similarity").
pub fn nearest_episodes(conn: &Connection, query_vec: &[f32], min_similarity: f64, k: u32) -> CkgResult<Vec<(Episode, f64)>> {
    let encoded = encode_vector(query_vec);
    let max_distance = 1.0 - min_similarity;
    let mut stmt = conn
        .prepare(
            "SELECT id, query, reward, reflection, embedding, created_at, cosine_distance(embedding, ?1) AS dist
             FROM episode_memory WHERE embedding IS NOT NULL AND cosine_distance(embedding, ?1) <= ?2
             ORDER BY dist ASC LIMIT ?3",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![encoded, max_distance, k], |row| {
            let episode = row_to_episode(row)?;
            let distance: f64 = row.get(6)?;
            Ok((episode, 1.0 - distance))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(|e| to_storage_err(e.to_string()))
}

fn row_to_working_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<WorkingMemoryItem> {
    let created_at: String = row.get(3)?;
    let last_accessed: String = row.get(4)?;
    Ok(WorkingMemoryItem {
        id: row.get(0)?,
        content: row.get(1)?,
        importance: row.get(2)?,
        created_at: parse_ts(&created_at),
        last_accessed: parse_ts(&last_accessed),
    })
}

fn row_to_episode(row: &rusqlite::Row<'_>) -> rusqlite::Result<Episode> {
    let created_at: String = row.get(5)?;
    let embedding: Option<Vec<u8>> = row.get(4)?;
    Ok(Episode {
        id: row.get(0)?,
        query: row.get(1)?,
        reward: row.get(2)?,
        reflection: row.get(3)?,
        embedding: embedding.map(|b| decode_vector(&b)),
        created_at: parse_ts(&created_at),
    })
}

fn parse_ts(s: &str) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .unwrap_or_else(|_| chrono::Utc::now())
}

/// Small adapter so `query_row`'s `QueryReturnedNoRows` collapses to `None`
/// instead of surfacing as a storage error, mirroring `.optional()` for a
/// hand-rolled parse step.
trait OptionalOrNone<T> {
    fn optional_or_none(self) -> CkgResult<Option<T>>;
}

impl<T> OptionalOrNone<T> for Result<T, rusqlite::Error> {
    fn optional_or_none(self) -> CkgResult<Option<T>> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(to_storage_err(e.to_string())),
        }
    }
}
