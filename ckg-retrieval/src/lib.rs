//! # ckg-retrieval
//!
//! Hybrid retrieval: semantic (vector KNN) + lexical (FTS5) + graph
//! (entity-mention traversal) fused by Reciprocal Rank Fusion, with
//! pre-filtering by sector/date/tags and a relational-query routing
//! heuristic that shifts per-source weights (spec.md §4.9). Grounded on the
//! teacher's `cortex_retrieval::search::rrf_fusion` module.

pub mod engine;
pub mod intent;
pub mod rrf;

pub use engine::{PreFilter, RetrievalEngine};
pub use rrf::{Candidate, Source};
