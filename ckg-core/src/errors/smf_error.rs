/// Errors surfaced by the self-modification framework.
#[derive(Debug, thiserror::Error)]
pub enum SmfError {
    #[error("bilateral consent required for proposal {proposal_id}")]
    ConsentRequired { proposal_id: String },

    #[error("proposal {proposal_id} reasoning classified as biased: {reason}")]
    FramingViolation { proposal_id: String, reason: String },

    #[error("undo window expired for proposal {proposal_id} ({days_elapsed}d > {retention_days}d)")]
    RetentionExpired {
        proposal_id: String,
        days_elapsed: i64,
        retention_days: i64,
    },

    #[error("proposal {proposal_id} is not in a state that allows this transition ({status})")]
    InvalidTransition { proposal_id: String, status: String },

    #[error("attempted to modify an SMF safeguard: {safeguard}")]
    SafeguardViolation { safeguard: String },
}
