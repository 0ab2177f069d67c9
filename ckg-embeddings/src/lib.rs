//! # ckg-embeddings
//!
//! The embedding gateway: a thin retry-with-backoff wrapper around whatever
//! `EmbeddingOracle` the host process wires up (spec.md §4.2, §6 "Oracles
//! consumed"). Grounded on the pack's HTTP retry idiom (exponential backoff,
//! jittered, logged per attempt) rather than the teacher's local
//! TF-IDF/ONNX provider chain — this engine treats the embedding model as an
//! external collaborator, not an in-process one.

pub mod gateway;
pub mod jitter;

pub use gateway::EmbeddingGateway;
