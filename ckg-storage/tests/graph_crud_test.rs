//! Node/edge upsert, merge semantics, and the sector/last-accessed indices.

use ckg_core::models::{EntrenchmentLevel, Sector};
use ckg_storage::queries::{edge_ops, node_ops};
use ckg_storage::StoragePool;

fn open() -> std::sync::Arc<StoragePool> {
    StoragePool::open_in_memory().expect("open in-memory pool")
}

#[test]
fn add_node_upsert_returns_existing_on_second_call() {
    let pool = open();
    pool.with_writer(|conn| {
        let a = node_ops::upsert_node(conn, "Person", "I", serde_json::json!({}), None)?;
        let b = node_ops::upsert_node(conn, "Person", "I", serde_json::json!({}), None)?;
        assert_eq!(a.id, b.id);
        Ok(())
    })
    .unwrap();
}

#[test]
fn add_edge_upsert_merges_properties_last_write_wins() {
    let pool = open();
    pool.with_writer(|conn| {
        node_ops::upsert_node(conn, "Person", "I", serde_json::json!({}), None)?;
        node_ops::upsert_node(conn, "Person", "ethr", serde_json::json!({}), None)?;

        let first = edge_ops::upsert_edge(
            conn, "I", "ethr", "LOVES", 1.0,
            serde_json::json!({"edge_type": "constitutive", "note": "original"}),
            Sector::Emotional, EntrenchmentLevel::Maximal,
        )?;
        assert!(first.is_constitutive());

        let merged = edge_ops::upsert_edge(
            conn, "I", "ethr", "LOVES", 1.0,
            serde_json::json!({"note": "updated"}),
            Sector::Emotional, EntrenchmentLevel::Maximal,
        )?;

        assert_eq!(merged.id, first.id, "same (source,target,relation) key must not create a second edge");
        assert_eq!(merged.properties["note"], "updated");
        assert_eq!(merged.properties["edge_type"], "constitutive", "untouched key survives the merge");
        Ok(())
    })
    .unwrap();
}

#[test]
fn list_edges_by_sector_excludes_superseded() {
    let pool = open();
    pool.with_writer(|conn| {
        node_ops::upsert_node(conn, "Person", "a", serde_json::json!({}), None)?;
        node_ops::upsert_node(conn, "Person", "b", serde_json::json!({}), None)?;
        node_ops::upsert_node(conn, "Person", "c", serde_json::json!({}), None)?;

        let e1 = edge_ops::upsert_edge(conn, "a", "b", "KNOWS", 1.0, serde_json::json!({}), Sector::Semantic, EntrenchmentLevel::Default)?;
        edge_ops::upsert_edge(conn, "a", "c", "KNOWS", 1.0, serde_json::json!({}), Sector::Semantic, EntrenchmentLevel::Default)?;

        let resolution = edge_ops::upsert_edge(conn, "a", "b", "CONTRADICTS", 1.0, serde_json::json!({}), Sector::Semantic, EntrenchmentLevel::Default)?;
        edge_ops::mark_superseded(conn, &e1.id, &resolution.id, ckg_core::models::ResolutionType::Contradiction, "ctx", "system")?;

        let remaining = edge_ops::list_edges_by_sector(conn, Sector::Semantic)?;
        assert!(remaining.iter().all(|e| e.id != e1.id));
        Ok(())
    })
    .unwrap();
}

#[test]
fn touch_access_increments_count() {
    let pool = open();
    pool.with_writer(|conn| {
        node_ops::upsert_node(conn, "Person", "a", serde_json::json!({}), None)?;
        node_ops::upsert_node(conn, "Person", "b", serde_json::json!({}), None)?;
        let edge = edge_ops::upsert_edge(conn, "a", "b", "KNOWS", 1.0, serde_json::json!({}), Sector::Semantic, EntrenchmentLevel::Default)?;

        edge_ops::touch_access(conn, &edge.id, chrono::Utc::now())?;
        let reloaded = edge_ops::get_edge_by_id(conn, &edge.id)?.unwrap();
        assert_eq!(reloaded.access_count, 1);
        Ok(())
    })
    .unwrap();
}
