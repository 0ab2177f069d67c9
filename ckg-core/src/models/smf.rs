use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalLevel {
    Primary,
    Bilateral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Pending,
    Approved,
    Rejected,
    Executed,
    Undone,
}

/// Immutable safeguards the SMF can never propose changing (spec.md §4.7).
/// Kept as a `const` slice rather than config so a proposal targeting one of
/// these names can be rejected without a round-trip to configuration.
pub const IMMUTABLE_SAFEGUARDS: &[&str] = &[
    "constitutive_edge_protection",
    "bilateral_consent_requirement",
    "audit_log_enabled",
    "smf_safeguards_list",
];

/// A proposed system-initiated change to the graph, gated on review and
/// (for constitutive-touching changes) bilateral consent (spec.md §3, §4.7).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmfProposal {
    pub id: String,
    pub trigger_type: String,
    pub proposed_action: serde_json::Value,
    pub affected_edges: Vec<String>,
    pub reasoning: NeutralReasoning,
    pub approval_level: ApprovalLevel,
    pub status: ProposalStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<String>,
    /// Actors who have granted consent so far; bilateral proposals need both
    /// parties present before execution.
    pub consents: Vec<String>,
}

impl SmfProposal {
    pub fn new(
        trigger_type: impl Into<String>,
        proposed_action: serde_json::Value,
        affected_edges: Vec<String>,
        reasoning: NeutralReasoning,
        approval_level: ApprovalLevel,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            trigger_type: trigger_type.into(),
            proposed_action,
            affected_edges,
            reasoning,
            approval_level,
            status: ProposalStatus::Pending,
            created_at: Utc::now(),
            resolved_at: None,
            resolved_by: None,
            consents: Vec::new(),
        }
    }

    /// Whether enough consent has been recorded to execute this proposal.
    pub fn has_required_consent(&self) -> bool {
        match self.approval_level {
            ApprovalLevel::Primary => !self.consents.is_empty(),
            ApprovalLevel::Bilateral => self.consents.len() >= 2,
        }
    }
}

/// Generated reasoning with fixed, templated fields (spec.md §4.7
/// "Neutrality contract"). Prohibited constructs — recommendations, urgency,
/// emotional qualifiers, directive phrasings — are a property of the
/// rendered text, checked by the external neutrality oracle, not of this
/// struct's shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeutralReasoning {
    pub detected: String,
    pub affected: String,
    pub if_approved: String,
    pub if_rejected: String,
    pub neutral_summary: bool,
}
