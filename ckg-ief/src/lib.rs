//! # ckg-ief
//!
//! Integrative Evaluation Function: value-weighted re-ranking atop the
//! hybrid-retrieval candidate set, a per-result conflict sub-check against a
//! context node's constitutive edges, and feedback-driven recalibration of
//! the constitutive-weight term (spec.md §4.8).

pub mod conflict;
pub mod engine;
pub mod feedback;
pub mod scoring;

pub use engine::{IefEngine, IntegrativeResult, IntegrativeSearchResponse};
pub use feedback::FeedbackRequest;
