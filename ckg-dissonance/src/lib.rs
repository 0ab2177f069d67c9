//! Dissonance engine: enumerates edge pairs sharing a common endpoint,
//! dispatches them to a pluggable `DissonanceClassifier`, queues `NUANCE`
//! verdicts for review, and resolves `EVOLUTION`/`CONTRADICTION` verdicts
//! into resolution hyperedges via `ckg-graph` — never deleting an original
//! (spec.md §4.6).

pub mod agm;
pub mod candidates;
pub mod engine;

pub use candidates::{is_comparable, Scope, MAX_CANDIDATE_PAIRS};
pub use engine::{ClassifiedPair, DissonanceCheckResult, DissonanceEngine};
