//! End-to-end session write-through: dialogue append, insight compression/
//! update/delete, working-memory eviction, and episode recall.

use std::sync::Arc;

use ckg_core::config::{EmbeddingConfig, RetryConfig, SmfConfig};
use ckg_core::models::Actor;
use ckg_graph::GraphManager;
use ckg_session::{SessionEngine, UpdateInsightOutcome};
use ckg_smf::SmfEngine;
use ckg_storage::queries::insight_ops;
use ckg_storage::StoragePool;
use test_fixtures::{DeterministicEmbeddingOracle, KeywordNeutralityChecker};

fn fast_embedding_config() -> EmbeddingConfig {
    EmbeddingConfig { dimensions: 8, retry: RetryConfig { max_retries: 0, base_delay_seconds: 0.0, jitter_enabled: false } }
}

fn setup() -> SessionEngine<DeterministicEmbeddingOracle, KeywordNeutralityChecker> {
    let pool = StoragePool::open_in_memory().unwrap();
    let graph = Arc::new(GraphManager::open(pool.clone()).unwrap());
    let gateway = Arc::new(ckg_embeddings::EmbeddingGateway::new(
        DeterministicEmbeddingOracle::new(8),
        "test-oracle",
        fast_embedding_config(),
        pool.clone(),
    ));
    let smf = Arc::new(SmfEngine::new(pool.clone(), graph, KeywordNeutralityChecker, SmfConfig::default()));
    SessionEngine::new(pool, gateway, smf)
}

#[test]
fn store_raw_dialogue_appends_and_registers_the_session() {
    let engine = setup();
    let row_id = engine.store_raw_dialogue("sess-1", "user", "hello there", serde_json::json!({})).unwrap();
    assert!(row_id >= 1);
    assert_eq!(engine.registry().session_count(), 1);
}

#[tokio::test]
async fn compress_to_l2_insight_persists_with_default_memory_strength() {
    let engine = setup();
    let result = engine
        .compress_to_l2_insight("Ethr prefers morning hikes along the coastal trail", vec![1, 2], None, None)
        .await
        .unwrap();

    assert_eq!(result.insight.memory_strength, 0.5);
    assert!(result.insight.embedding.is_some());
    assert!(result.warning.is_none(), "content-dense text shouldn't warn");
}

#[tokio::test]
async fn compress_to_l2_insight_warns_but_still_stores_low_fidelity_content() {
    let engine = setup();
    let result = engine.compress_to_l2_insight("it is the of a in to for with by", vec![], None, None).await.unwrap();

    assert!(result.warning.is_some());
    assert!(result.fidelity_score < 0.5);
}

#[tokio::test]
async fn primary_actor_update_insight_applies_directly() {
    let engine = setup();
    let created = engine.compress_to_l2_insight("original content here", vec![], None, None).await.unwrap();

    let outcome = engine
        .update_insight(&created.insight.id, Actor::Primary, "correction", Some("revised content here"), None)
        .await
        .unwrap();

    match outcome {
        UpdateInsightOutcome::Applied(updated) => assert_eq!(updated.content, "revised content here"),
        UpdateInsightOutcome::Pending { .. } => panic!("primary actor should apply directly"),
    }
}

#[tokio::test]
async fn secondary_actor_update_insight_creates_a_pending_proposal() {
    let engine = setup();
    let created = engine.compress_to_l2_insight("original content here", vec![], None, None).await.unwrap();

    let outcome = engine
        .update_insight(&created.insight.id, Actor::Secondary, "suggested correction", Some("alternate phrasing"), None)
        .await
        .unwrap();

    match outcome {
        UpdateInsightOutcome::Pending { proposal_id } => assert!(!proposal_id.is_empty()),
        UpdateInsightOutcome::Applied(_) => panic!("secondary actor should be routed through SMF"),
    }
}

#[tokio::test]
async fn update_insight_requires_a_reason() {
    let engine = setup();
    let created = engine.compress_to_l2_insight("content", vec![], None, None).await.unwrap();
    let err = engine.update_insight(&created.insight.id, Actor::Primary, "  ", Some("x"), None).await.unwrap_err();
    assert!(matches!(err, ckg_core::CkgError::InvalidArgument(_)));
}

#[tokio::test]
async fn update_insight_requires_at_least_one_field() {
    let engine = setup();
    let created = engine.compress_to_l2_insight("content", vec![], None, None).await.unwrap();
    let err = engine.update_insight(&created.insight.id, Actor::Primary, "reason", None, None).await.unwrap_err();
    assert!(matches!(err, ckg_core::CkgError::InvalidArgument(_)));
}

#[tokio::test]
async fn update_insight_on_a_soft_deleted_insight_is_not_found() {
    let engine = setup();
    let created = engine.compress_to_l2_insight("content", vec![], None, None).await.unwrap();
    engine.delete_insight(&created.insight.id, Actor::Primary, "no longer relevant").unwrap();

    let err = engine
        .update_insight(&created.insight.id, Actor::Primary, "reason", Some("new"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ckg_core::CkgError::NotFound { .. }));
}

#[tokio::test]
async fn delete_insight_is_reflected_via_get_insight_by_id() {
    let engine = setup();
    let created = engine.compress_to_l2_insight("content to remove", vec![], None, None).await.unwrap();
    engine.delete_insight(&created.insight.id, Actor::Primary, "duplicate entry").unwrap();

    let err = engine.delete_insight(&created.insight.id, Actor::Primary, "again").unwrap_err();
    assert!(matches!(err, ckg_core::CkgError::NotFound { .. }));
}

#[test]
fn update_working_memory_evicts_the_oldest_evictable_item_past_capacity() {
    let engine = setup();
    for i in 0..10 {
        engine.update_working_memory(&format!("item-{i}"), 0.3).unwrap();
    }
    let outcome = engine.update_working_memory("item-10", 0.3).unwrap();
    assert!(outcome.evicted.is_some(), "11th insert past capacity 10 should evict the oldest");
    assert_eq!(outcome.evicted.unwrap().reason, "LRU_EVICTION");
}

#[test]
fn update_working_memory_skips_high_importance_items_when_evicting() {
    let engine = setup();
    for i in 0..10 {
        engine.update_working_memory(&format!("pinned-{i}"), 0.95).unwrap();
    }
    let outcome = engine.update_working_memory("overflow", 0.95).unwrap();
    assert!(outcome.evicted.is_none(), "no item has importance <= 0.8, so nothing is evictable");
}

#[tokio::test]
async fn store_episode_and_recall_finds_a_similar_prior_episode() {
    let engine = setup();
    engine.store_episode("what hiking trails are nearby", 0.8, "answered with coastal trail info").await.unwrap();

    let recalled = engine.recall_similar_episodes("what hiking trails are nearby").await.unwrap();
    assert!(!recalled.is_empty(), "identical query text should recall the episode it just stored");
    assert!(recalled[0].1 >= 0.70);
}

#[tokio::test]
async fn recall_never_returns_results_below_the_similarity_floor() {
    let engine = setup();
    engine.store_episode("completely unrelated topic about cooking", 0.1, "n/a").await.unwrap();

    let recalled = engine.recall_similar_episodes("quantum chromodynamics seminar notes").await.unwrap();
    assert!(recalled.iter().all(|(_, similarity)| *similarity >= 0.70));
}

#[tokio::test]
async fn update_insight_memory_strength_only_is_valid() {
    let engine = setup();
    let created = engine.compress_to_l2_insight("content", vec![], None, None).await.unwrap();
    let outcome = engine.update_insight(&created.insight.id, Actor::Primary, "reinforced", None, Some(0.9)).await.unwrap();
    match outcome {
        UpdateInsightOutcome::Applied(updated) => assert_eq!(updated.memory_strength, 0.9),
        _ => panic!("expected direct application"),
    }
}

#[test]
fn get_insight_by_id_returns_none_for_an_unknown_id() {
    let pool = StoragePool::open_in_memory().unwrap();
    let found = pool.with_reader(|conn| insight_ops::get_insight_by_id(conn, "missing")).unwrap();
    assert!(found.is_none());
}
