//! # test-fixtures
//!
//! Fixture-backed oracle doubles shared across crate test suites, grounded
//! on the teacher's `test-fixtures` crate role (a shared dependency `tests/`
//! suites reach for instead of hand-rolling the same stub per crate) and on
//! spec.md §9 "Dissonance classifier replaceability ... a rule-based or
//! fixture-backed test double". Not used by production code.

pub mod embedding;
pub mod judge;
pub mod neutrality;
pub mod dissonance;

pub use dissonance::RuleBasedDissonanceClassifier;
pub use embedding::DeterministicEmbeddingOracle;
pub use judge::FixedJudge;
pub use neutrality::KeywordNeutralityChecker;
