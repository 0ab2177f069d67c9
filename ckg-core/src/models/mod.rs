pub mod audit;
pub mod cost_log;
pub mod dissonance;
pub mod drift_log;
pub mod edge;
pub mod episode;
pub mod golden_test;
pub mod ground_truth;
pub mod ief_feedback;
pub mod insight;
pub mod insight_history;
pub mod node;
pub mod raw_dialogue;
pub mod retry_log;
pub mod sector;
pub mod smf;
pub mod working_memory;

pub use audit::AuditEntry;
pub use cost_log::ApiCostLogEntry;
pub use dissonance::PendingIoReview;
pub use drift_log::ModelDriftLogEntry;
pub use edge::{Edge, EntrenchmentLevel, ResolutionType};
pub use episode::{Episode, EPISODE_RECALL_MIN_SIMILARITY, EPISODE_RECALL_TOP_K};
pub use golden_test::GoldenTestCase;
pub use ground_truth::GroundTruth;
pub use ief_feedback::IefFeedback;
pub use insight::{Actor, Insight, InsightHistoryAction};
pub use insight_history::InsightHistoryEntry;
pub use node::Node;
pub use raw_dialogue::RawDialogue;
pub use retry_log::ApiRetryLogEntry;
pub use sector::Sector;
pub use smf::{ApprovalLevel, NeutralReasoning, ProposalStatus, SmfProposal, IMMUTABLE_SAFEGUARDS};
pub use working_memory::{
    StaleMemoryItem, WorkingMemoryItem, EVICTION_IMPORTANCE_CEILING, WORKING_MEMORY_CAPACITY,
};
