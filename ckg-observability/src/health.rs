//! Health reporting: independent probes for the store and any external
//! oracle, aggregated into one report (spec.md §5 "Health probes target the
//! store and the embedding oracle independently").

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ckg_storage::StoragePool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsystemHealth {
    pub name: String,
    pub status: HealthStatus,
    pub detail: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl SubsystemHealth {
    fn ok(name: impl Into<String>) -> Self {
        Self { name: name.into(), status: HealthStatus::Healthy, detail: None, checked_at: Utc::now() }
    }

    fn down(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { name: name.into(), status: HealthStatus::Unhealthy, detail: Some(detail.into()), checked_at: Utc::now() }
    }

    fn degraded(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { name: name.into(), status: HealthStatus::Degraded, detail: Some(detail.into()), checked_at: Utc::now() }
    }
}

/// Aggregate health across every independently-probed subsystem. Overall
/// status is the worst of its parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub subsystems: Vec<SubsystemHealth>,
    /// Set when the decay or retrieval-weights config fell back to hardcoded
    /// defaults (spec.md §7 "Config load failure ... surfaced via a health
    /// endpoint").
    pub config_fallback_active: bool,
}

impl HealthReport {
    pub fn overall_status(&self) -> HealthStatus {
        if self.subsystems.iter().any(|s| s.status == HealthStatus::Unhealthy) {
            return HealthStatus::Unhealthy;
        }
        if self.config_fallback_active || self.subsystems.iter().any(|s| s.status == HealthStatus::Degraded) {
            return HealthStatus::Degraded;
        }
        HealthStatus::Healthy
    }
}

/// Probes the store with a trivial read — failure means the pool is
/// exhausted or the file is unreachable (spec.md §7 `ConnectionUnavailable`).
pub fn probe_store(pool: &Arc<StoragePool>) -> SubsystemHealth {
    match pool.with_reader(|conn| ckg_storage::queries::node_ops::count_by_label(conn, "__health_probe__")) {
        Ok(_) => SubsystemHealth::ok("store"),
        Err(e) => SubsystemHealth::down("store", e.to_string()),
    }
}

/// Probes an external oracle by invoking a caller-supplied no-op check
/// (e.g. a lightweight ping call). Oracles are pluggable traits (spec.md
/// §6), so this takes the result of that call rather than the oracle
/// itself — keeps this crate free of a dependency on any oracle trait.
pub fn probe_oracle(name: &str, result: Result<(), String>) -> SubsystemHealth {
    match result {
        Ok(()) => SubsystemHealth::ok(name),
        Err(e) => SubsystemHealth::degraded(name, e),
    }
}

pub fn build_report(subsystems: Vec<SubsystemHealth>, config_fallback_active: bool) -> HealthReport {
    HealthReport { subsystems, config_fallback_active }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_probe_succeeds_against_fresh_pool() {
        let pool = StoragePool::open_in_memory().unwrap();
        let health = probe_store(&pool);
        assert_eq!(health.status, HealthStatus::Healthy);
    }

    #[test]
    fn overall_status_is_worst_of_parts() {
        let report = build_report(
            vec![SubsystemHealth::ok("store"), SubsystemHealth::degraded("embedding", "slow")],
            false,
        );
        assert_eq!(report.overall_status(), HealthStatus::Degraded);
    }

    #[test]
    fn config_fallback_forces_degraded_even_when_subsystems_are_healthy() {
        let report = build_report(vec![SubsystemHealth::ok("store")], true);
        assert_eq!(report.overall_status(), HealthStatus::Degraded);
    }

    #[test]
    fn any_unhealthy_subsystem_dominates() {
        let report = build_report(
            vec![SubsystemHealth::ok("store"), SubsystemHealth::down("embedding", "timeout")],
            false,
        );
        assert_eq!(report.overall_status(), HealthStatus::Unhealthy);
    }
}
