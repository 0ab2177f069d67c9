//! Jitter source for the retry backoff. Uses the system clock's sub-second
//! nanosecond component rather than pulling in a `rand` dependency — the
//! same "no extra crate needed" idiom the pack's HTTP retry helpers use for
//! jitter.

use std::time::SystemTime;

/// A uniform factor in `[0.8, 1.2)` (spec.md §4.2 "multiplied by a uniform
/// jitter factor in [0.8, 1.2]").
pub fn jitter_factor() -> f64 {
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    0.8 + (nanos % 1000) as f64 / 1000.0 * 0.4
}
