//! # ckg-decay
//!
//! Memory-strength / Ebbinghaus relevance scoring (spec.md §4.4). A pure,
//! per-edge calculation — no I/O — grounded on the teacher's
//! `cortex_decay::{DecayEngine, DecayContext}` shape (`DecayEngine::new()`,
//! `process_batch(&items, &ctx)`), generalized from the teacher's
//! `BaseMemory` batch to this engine's `Edge` batch.

use std::time::Instant;

use chrono::{DateTime, Utc};

use ckg_core::config::{DecayConfig, SectorDecayParams};
use ckg_core::models::Edge;

/// Evaluation instant the batch is scored against. Kept out of `DecayEngine`
/// so the same engine instance can score different moments in time (tests,
/// backfills) without reconstructing it.
#[derive(Debug, Clone, Copy)]
pub struct DecayContext {
    pub now: DateTime<Utc>,
}

impl Default for DecayContext {
    fn default() -> Self {
        Self { now: Utc::now() }
    }
}

/// `S = S_base × (1 + ln(1 + access_count))`, floored and importance-boosted
/// (spec.md §4.4).
pub fn memory_strength(params: SectorDecayParams, access_count: u64, properties: &serde_json::Value) -> f64 {
    let mut s = params.s_base * (1.0 + (1.0 + access_count as f64).ln());
    if let Some(floor) = params.s_floor {
        s = s.max(floor);
    }
    match properties.get("importance").and_then(|v| v.as_str()) {
        Some("medium") => s = s.max(100.0),
        Some("high") => s = s.max(200.0),
        _ => {}
    }
    s
}

/// `relevance_score = exp(-days_since_last_access / S)`. Constitutive edges
/// (or any edge entrenched at `maximal`) short-circuit to `1.0` — they never
/// decay (spec.md §4.4, §3 Edge).
pub fn relevance_score(edge: &Edge, config: &DecayConfig, now: DateTime<Utc>) -> f64 {
    if edge.is_decay_exempt() {
        return 1.0;
    }
    let params = config.params_for(edge.sector);
    let strength = memory_strength(params, edge.access_count, &edge.properties);
    let days_since = (now - edge.last_accessed).num_milliseconds() as f64 / 86_400_000.0;
    (-days_since.max(0.0) / strength).exp()
}

/// One edge's decay result, carrying the score and whether the per-edge
/// budget was honored (debug-logged either way, per spec.md §4.4).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayResult {
    pub relevance_score: f64,
    pub elapsed_micros: u64,
}

pub struct DecayEngine {
    config: DecayConfig,
}

impl DecayEngine {
    pub fn new(config: DecayConfig) -> Self {
        Self { config }
    }

    /// Scores a single edge, timing the pure calculation against the 5ms
    /// budget spec.md §4.4 calls out.
    pub fn score_edge(&self, edge: &Edge, ctx: &DecayContext) -> DecayResult {
        let start = Instant::now();
        let score = relevance_score(edge, &self.config, ctx.now);
        let elapsed = start.elapsed();

        tracing::debug!(edge_id = %edge.id, sector = %edge.sector, score, elapsed_us = elapsed.as_micros() as u64, "decay scored");
        if elapsed > std::time::Duration::from_millis(5) {
            tracing::warn!(edge_id = %edge.id, elapsed_us = elapsed.as_micros() as u64, "decay scoring exceeded 5ms budget");
        }

        DecayResult { relevance_score: score, elapsed_micros: elapsed.as_micros() as u64 }
    }

    /// Scores a batch, one edge at a time (rayon-parallelized across cores —
    /// each edge's score is independent, so this is embarrassingly
    /// parallel; spec.md §5 "all CPU work ... is in-memory and cheap").
    pub fn process_batch(&self, edges: &[Edge], ctx: &DecayContext) -> Vec<DecayResult> {
        use rayon::prelude::*;
        edges.par_iter().map(|edge| self.score_edge(edge, ctx)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ckg_core::models::{EntrenchmentLevel, Sector};
    use serde_json::json;

    fn edge_with(sector: Sector, access_count: u64, days_ago: i64, properties: serde_json::Value) -> Edge {
        let mut e = Edge::new("a", "b", "RELATES_TO");
        e.sector = sector;
        e.access_count = access_count;
        e.properties = properties;
        e.last_accessed = Utc::now() - chrono::Duration::days(days_ago);
        e
    }

    #[test]
    fn constitutive_edge_never_decays() {
        let mut e = edge_with(Sector::Semantic, 0, 9999, json!({}));
        e.properties = json!({"edge_type": "constitutive"});
        let engine = DecayEngine::new(DecayConfig::default());
        let result = engine.score_edge(&e, &DecayContext::default());
        assert_eq!(result.relevance_score, 1.0);
    }

    #[test]
    fn maximal_entrenchment_never_decays() {
        let mut e = edge_with(Sector::Semantic, 0, 9999, json!({}));
        e.entrenchment_level = EntrenchmentLevel::Maximal;
        let engine = DecayEngine::new(DecayConfig::default());
        let result = engine.score_edge(&e, &DecayContext::default());
        assert_eq!(result.relevance_score, 1.0);
    }

    #[test]
    fn recent_access_scores_near_one() {
        let e = edge_with(Sector::Semantic, 5, 0, json!({}));
        let engine = DecayEngine::new(DecayConfig::default());
        let result = engine.score_edge(&e, &DecayContext::default());
        assert!(result.relevance_score > 0.99);
    }

    #[test]
    fn stale_semantic_edge_decays_below_floor_sectors() {
        let stale_semantic = edge_with(Sector::Semantic, 0, 365, json!({}));
        let stale_emotional = edge_with(Sector::Emotional, 0, 365, json!({}));
        let engine = DecayEngine::new(DecayConfig::default());
        let ctx = DecayContext::default();
        let semantic_score = engine.score_edge(&stale_semantic, &ctx).relevance_score;
        let emotional_score = engine.score_edge(&stale_emotional, &ctx).relevance_score;
        // Emotional has a higher S_base and an S_floor, so it should retain
        // more relevance than semantic at the same staleness.
        assert!(emotional_score > semantic_score);
    }

    #[test]
    fn high_importance_floors_strength_at_200() {
        let params = SectorDecayParams { s_base: 10.0, s_floor: None };
        let low = memory_strength(params, 0, &json!({}));
        let high = memory_strength(params, 0, &json!({"importance": "high"}));
        assert!(low < 200.0);
        assert_eq!(high, 200.0);
    }

    #[test]
    fn medium_importance_floors_strength_at_100() {
        let params = SectorDecayParams { s_base: 10.0, s_floor: None };
        let medium = memory_strength(params, 0, &json!({"importance": "medium"}));
        assert_eq!(medium, 100.0);
    }

    #[test]
    fn sector_floor_is_enforced() {
        let params = SectorDecayParams { s_base: 1.0, s_floor: Some(150.0) };
        let s = memory_strength(params, 0, &json!({}));
        assert_eq!(s, 150.0);
    }

    #[test]
    fn process_batch_matches_individual_scores() {
        let edges = vec![
            edge_with(Sector::Semantic, 1, 10, json!({})),
            edge_with(Sector::Episodic, 2, 20, json!({})),
            edge_with(Sector::Procedural, 3, 30, json!({})),
        ];
        let engine = DecayEngine::new(DecayConfig::default());
        let ctx = DecayContext::default();
        let batch = engine.process_batch(&edges, &ctx);
        assert_eq!(batch.len(), 3);
        for (edge, result) in edges.iter().zip(batch.iter()) {
            let individual = engine.score_edge(edge, &ctx);
            assert!((individual.relevance_score - result.relevance_score).abs() < 1e-12);
        }
    }
}
