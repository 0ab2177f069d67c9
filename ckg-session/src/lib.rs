//! # ckg-session
//!
//! Session write-through: raw dialogue (L0) append, L2 insight compression/
//! update/delete, working-memory LRU eviction, and episode-memory capture +
//! recall (spec.md §4.10). Also carries the in-process session bookkeeping
//! (`SessionRegistry`) the teacher's `cortex-session` models, kept alongside
//! the persisted write-through operations as an ambient concern.

pub mod engine;
pub mod fidelity;
pub mod registry;

pub use engine::{CompressionResult, SessionEngine, UpdateInsightOutcome, WorkingMemoryOutcome};
pub use registry::{SessionContext, SessionRegistry};
