pub mod dissonance_classifier;
pub mod embedding_oracle;
pub mod judge;
pub mod neutrality_checker;

pub use dissonance_classifier::{DissonanceClassifier, DissonanceVerdict, DissonanceVerdictType};
pub use embedding_oracle::EmbeddingOracle;
pub use judge::{Judge, JudgeVerdict};
pub use neutrality_checker::{NeutralityCheckResult, NeutralityChecker, NeutralityVerdict};
