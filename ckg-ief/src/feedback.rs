//! IEF feedback capture and recalibration (spec.md §4.8): every response
//! carries a `feedback_request`; once `RECALIBRATION_THRESHOLD` unlabeled
//! entries accumulate since the last recalibration, `constitutive_weight` is
//! recomputed "by optimizing helpful-rate on preference pairs (ICAI)".

use ckg_core::config::{IefConfig, RECALIBRATION_THRESHOLD, W_MIN_CONSTITUTIVE};

/// Upper bound on a recalibrated weight. spec.md pins only the floor
/// (`W_MIN_CONSTITUTIVE`); an unbounded climb would let one run of good
/// feedback make every constitutive-adjacent result functionally mandatory.
/// Chosen as 4x the floor, documented as a resolved Open Question in
/// DESIGN.md.
pub const W_MAX_CONSTITUTIVE: f64 = 6.0;

/// Step size per recalibration pass, scaled by how far the observed
/// helpful-rate sits from the 0.5 neutral point.
const ADJUSTMENT_GAIN: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackRequest {
    pub query_id: uuid::Uuid,
    pub helpful: Option<bool>,
}

/// `true` once `unlabeled_since_last` has crossed `RECALIBRATION_THRESHOLD`
/// (spec.md §4.8).
pub fn should_recalibrate(entries_since_last: u64) -> bool {
    entries_since_last as usize >= RECALIBRATION_THRESHOLD
}

/// ICAI-style weight refit: `pairs` are `(helpful, constitutive_weight_used)`
/// entries accumulated since the last recalibration. The helpful-rate among
/// labeled pairs pulls the weight up (low helpful-rate while boosting
/// constitutive results means the boost is miscalibrated — pull toward the
/// floor) or down (high helpful-rate means headroom to weight constitutive
/// results even more) — preference-pair optimization without a held-out
/// ranking model, matching the ICAI reference spec.md names without pulling
/// in a training framework. Returns `None` when there's nothing to learn
/// from (no labeled pairs).
pub fn recalibrate(config: &IefConfig, pairs: &[(bool, f64)]) -> Option<f64> {
    if pairs.is_empty() {
        return None;
    }
    let helpful_count = pairs.iter().filter(|(h, _)| *h).count();
    let helpful_rate = helpful_count as f64 / pairs.len() as f64;

    // Centered on 0.5: above it, nudge the weight up; below it, down.
    let delta = (helpful_rate - 0.5) * 2.0 * ADJUSTMENT_GAIN;
    let new_weight = (config.constitutive_weight + delta).clamp(W_MIN_CONSTITUTIVE, W_MAX_CONSTITUTIVE);
    Some(new_weight)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_inclusive() {
        assert!(!should_recalibrate(49));
        assert!(should_recalibrate(50));
        assert!(should_recalibrate(51));
    }

    #[test]
    fn no_labeled_pairs_yields_no_recalibration() {
        let config = IefConfig::default();
        assert_eq!(recalibrate(&config, &[]), None);
    }

    #[test]
    fn high_helpful_rate_increases_weight() {
        let config = IefConfig { constitutive_weight: 2.0 };
        let pairs = vec![(true, 2.0); 10];
        let new_weight = recalibrate(&config, &pairs).unwrap();
        assert!(new_weight > 2.0);
    }

    #[test]
    fn low_helpful_rate_decreases_weight_but_never_below_floor() {
        let config = IefConfig { constitutive_weight: 2.0 };
        let pairs = vec![(false, 2.0); 10];
        let new_weight = recalibrate(&config, &pairs).unwrap();
        assert!(new_weight < 2.0);
        assert!(new_weight >= W_MIN_CONSTITUTIVE);
    }

    #[test]
    fn weight_never_exceeds_the_configured_ceiling() {
        let config = IefConfig { constitutive_weight: 5.9 };
        let pairs = vec![(true, 5.9); 20];
        let new_weight = recalibrate(&config, &pairs).unwrap();
        assert!(new_weight <= W_MAX_CONSTITUTIVE);
    }
}
