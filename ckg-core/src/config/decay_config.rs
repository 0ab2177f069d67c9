//! Per-sector decay configuration (spec.md §4.4).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::Sector;

/// Decay parameters for a single memory sector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectorDecayParams {
    pub s_base: f64,
    pub s_floor: Option<f64>,
}

/// `sector -> { S_base, S_floor }`, loaded from disk at start (cold reload only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecayConfig {
    pub sectors: BTreeMap<Sector, SectorDecayParams>,
}

impl DecayConfig {
    /// Returns `true` iff all five sectors are present — a loaded config missing
    /// one is treated as invalid and the hardcoded default table is used instead.
    pub fn is_complete(&self) -> bool {
        Sector::ALL.iter().all(|s| self.sectors.contains_key(s))
    }

    pub fn params_for(&self, sector: Sector) -> SectorDecayParams {
        self.sectors
            .get(&sector)
            .copied()
            .unwrap_or_else(|| Self::default().sectors[&sector])
    }
}

impl Default for DecayConfig {
    fn default() -> Self {
        let mut sectors = BTreeMap::new();
        sectors.insert(
            Sector::Emotional,
            SectorDecayParams {
                s_base: 200.0,
                s_floor: Some(150.0),
            },
        );
        sectors.insert(
            Sector::Episodic,
            SectorDecayParams {
                s_base: 150.0,
                s_floor: Some(100.0),
            },
        );
        sectors.insert(
            Sector::Semantic,
            SectorDecayParams {
                s_base: 100.0,
                s_floor: None,
            },
        );
        sectors.insert(
            Sector::Procedural,
            SectorDecayParams {
                s_base: 120.0,
                s_floor: None,
            },
        );
        sectors.insert(
            Sector::Reflective,
            SectorDecayParams {
                s_base: 180.0,
                s_floor: Some(120.0),
            },
        );
        Self { sectors }
    }
}
