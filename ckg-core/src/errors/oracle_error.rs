/// Errors surfaced by the pluggable classification/neutrality oracles
/// (dissonance classifier, SMF neutrality checker, evaluator/judge).
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    #[error("neutrality checker unavailable: {0}")]
    NeutralityCheckerUnavailable(String),

    #[error("judge unavailable: {0}")]
    JudgeUnavailable(String),
}
