//! # ckg-observability
//!
//! Tracing setup and health reporting. Grounded on the teacher's
//! `cortex-core::models::health_report` shape (`HealthStatus`,
//! `SubsystemHealth`) and the workspace's existing `tracing`/
//! `tracing-subscriber` dependency (spec.md §5 "Health probes target the
//! store and the embedding oracle independently", §7 "Config load failure
//! ... surfaced via a health endpoint").

pub mod health;
pub mod tracing_init;

pub use health::{HealthReport, HealthStatus, SubsystemHealth};
pub use tracing_init::init_tracing;
