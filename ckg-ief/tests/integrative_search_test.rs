//! End-to-end `integrative_search`: constitutive-weighted re-ranking and the
//! conflict sub-check against a seeded graph + insight store.

use std::sync::Arc;

use ckg_core::config::{DecayConfig, IefConfig};
use ckg_core::models::Insight;
use ckg_graph::GraphManager;
use ckg_ief::IefEngine;
use ckg_retrieval::rrf::{Candidate, Source};
use ckg_storage::queries::insight_ops;
use ckg_storage::StoragePool;
use serde_json::json;

fn setup() -> (Arc<StoragePool>, Arc<GraphManager>) {
    let pool = StoragePool::open_in_memory().unwrap();
    let graph = Arc::new(GraphManager::open(pool.clone()).unwrap());
    (pool, graph)
}

fn seed_insight(pool: &StoragePool, content: &str, embedding: Vec<f32>) -> Insight {
    let mut insight = Insight::new(content, vec![]);
    insight.embedding = Some(embedding);
    pool.with_writer(|conn| insight_ops::insert_insight(conn, &insight)).unwrap();
    insight
}

fn candidate(insight: Insight, rrf_score: f64) -> Candidate {
    Candidate { insight, rrf_score, sources: vec![Source::Semantic] }
}

#[test]
fn candidate_touching_a_constitutive_edge_scores_higher_than_an_otherwise_identical_peer() {
    let (pool, graph) = setup();

    let loves = graph
        .add_edge("I", "ethr", "LOVES", None, Some(json!({"edge_type": "constitutive"})))
        .unwrap();
    assert!(loves.is_constitutive());

    let ethr_node = graph.get_node_by_name("Entity", "ethr").unwrap().unwrap();
    let unrelated_node = graph.add_node("Entity", "weather", json!({}), None).unwrap();

    let insight_a = seed_insight(&pool, "a memory about ethr", vec![1.0, 0.0]);
    let insight_b = seed_insight(&pool, "a memory about the weather", vec![1.0, 0.0]);

    pool.with_writer(|conn| {
        conn.execute("UPDATE nodes SET vector_id = ?1 WHERE id = ?2", rusqlite::params![insight_a.id, ethr_node.id])
            .unwrap();
        conn.execute("UPDATE nodes SET vector_id = ?1 WHERE id = ?2", rusqlite::params![insight_b.id, unrelated_node.id])
            .unwrap();
        Ok(())
    })
    .unwrap();
    graph
        .add_edge("weather", "mild", "DESCRIBES", None, Some(json!({"value": "mild"})))
        .unwrap();

    let engine = IefEngine::new(pool, DecayConfig::default(), IefConfig { constitutive_weight: 3.0 });
    let response = engine
        .integrative_search("query", &[1.0, 0.0], Some(&ethr_node.id), vec![candidate(insight_a.clone(), 1.0), candidate(insight_b.clone(), 1.0)])
        .unwrap();

    assert_eq!(response.results.len(), 2);
    let top = &response.results[0];
    assert_eq!(top.candidate.insight.id, insight_a.id, "the constitutive-adjacent insight should outrank its peer");
}

#[test]
fn disagreeing_constitutive_and_candidate_edges_set_the_conflict_flag() {
    let (pool, graph) = setup();
    graph
        .add_edge("I", "position_on_free_will", "HOLDS", None, Some(json!({"edge_type": "constitutive", "value": "libertarian"})))
        .unwrap();
    let topic_node = graph.add_node("Entity", "position_on_free_will", json!({}), None).unwrap();
    graph
        .add_edge("I", "position_on_free_will", "BELIEVES", None, Some(json!({"value": "compatibilist"})))
        .unwrap();

    let insight = seed_insight(&pool, "a shifting belief about free will", vec![1.0, 0.0]);
    pool.with_writer(|conn| {
        conn.execute("UPDATE nodes SET vector_id = ?1 WHERE id = ?2", rusqlite::params![insight.id, topic_node.id]).unwrap();
        Ok(())
    })
    .unwrap();

    let i_node = graph.get_node_by_name("Entity", "I").unwrap().unwrap();
    let engine = IefEngine::new(pool, DecayConfig::default(), IefConfig::default());
    let response = engine.integrative_search("query", &[1.0, 0.0], Some(&i_node.id), vec![candidate(insight, 1.0)]).unwrap();

    assert_eq!(response.results.len(), 1);
    assert!(response.results[0].conflict_flag, "disagreeing value under a comparable relation should flag a conflict");
}

#[test]
fn insight_with_no_linked_node_still_scores_without_erroring() {
    let (pool, _graph) = setup();
    let insight = seed_insight(&pool, "a freestanding insight never attached to the graph", vec![0.0, 1.0]);

    let engine = IefEngine::new(pool, DecayConfig::default(), IefConfig::default());
    let response = engine.integrative_search("query", &[0.0, 1.0], None, vec![candidate(insight, 1.0)]).unwrap();

    assert_eq!(response.results.len(), 1);
    assert!(!response.results[0].conflict_flag);
    assert!(response.results[0].score > 0.0);
}

#[test]
fn feedback_below_threshold_does_not_recalibrate_the_weight() {
    let (pool, _graph) = setup();
    let engine = IefEngine::new(pool.clone(), DecayConfig::default(), IefConfig { constitutive_weight: 2.0 });
    let insight = seed_insight(&pool, "insight", vec![1.0, 0.0]);
    let response = engine.integrative_search("query", &[1.0, 0.0], None, vec![candidate(insight, 1.0)]).unwrap();

    engine.record_feedback(response.feedback_request.query_id, true, None).unwrap();

    let entries = pool
        .with_reader(ckg_storage::queries::ief_feedback_ops::entries_since_last_recalibration)
        .unwrap();
    assert_eq!(entries, 1);
}

#[test]
fn sector_filter_insight_without_embedding_scores_zero_semantic_component_not_an_error() {
    let (pool, _graph) = setup();
    let mut insight = Insight::new("no embedding here", vec![]);
    insight.embedding = None;
    pool.with_writer(|conn| insight_ops::insert_insight(conn, &insight)).unwrap();

    let engine = IefEngine::new(pool, DecayConfig::default(), IefConfig::default());
    let response = engine.integrative_search("query", &[1.0, 0.0], None, vec![candidate(insight, 1.0)]).unwrap();
    assert_eq!(response.results.len(), 1);
}
