use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::sector::Sector;

/// Constitutive edges are load-bearing identity claims; descriptive edges are
/// everything else. `entrenchment_level = maximal` pins an edge against the
/// normal decay/reclassification path regardless of `is_constitutive`
/// (spec.md §3 Edge, §4.3, §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrenchmentLevel {
    Default,
    Maximal,
}

impl Default for EntrenchmentLevel {
    fn default() -> Self {
        EntrenchmentLevel::Default
    }
}

/// Resolution hyperedges document a contradiction or an evolution of belief
/// without deleting the superseded edge (spec.md §4.6 dissonance detection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionType {
    Evolution,
    Contradiction,
    Nuance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub relation: String,
    pub weight: f64,
    pub properties: serde_json::Value,
    pub sector: Sector,
    pub entrenchment_level: EntrenchmentLevel,

    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub access_count: u64,

    pub last_reclassification: Option<DateTime<Utc>>,

    // Resolution-hyperedge fields. Populated only when this edge documents a
    // contradiction/evolution over another edge; `None` for ordinary edges.
    pub resolution_type: Option<ResolutionType>,
    pub supersedes: Option<String>,
    pub superseded_by: Option<String>,
    pub resolution_context: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<String>,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, relation: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source: source.into(),
            target: target.into(),
            relation: relation.into(),
            weight: 1.0,
            properties: serde_json::Value::Object(Default::default()),
            sector: Sector::default(),
            entrenchment_level: EntrenchmentLevel::default(),
            created_at: now,
            modified_at: now,
            last_accessed: now,
            access_count: 0,
            last_reclassification: None,
            resolution_type: None,
            supersedes: None,
            superseded_by: None,
            resolution_context: None,
            resolved_at: None,
            resolved_by: None,
        }
    }

    /// `is_constitutive ≡ properties.edge_type == "constitutive"` (spec.md §3).
    pub fn is_constitutive(&self) -> bool {
        self.properties
            .get("edge_type")
            .and_then(|v| v.as_str())
            .map(|s| s == "constitutive")
            .unwrap_or(false)
    }

    /// Constitutive edges are always entrenched at `maximal` and are exempt
    /// from decay (spec.md §3, §4.3).
    pub fn is_decay_exempt(&self) -> bool {
        self.is_constitutive() || matches!(self.entrenchment_level, EntrenchmentLevel::Maximal)
    }

    pub fn is_superseded(&self) -> bool {
        self.superseded_by.is_some()
    }

    pub fn touch_access(&mut self, at: DateTime<Utc>) {
        self.last_accessed = at;
        self.access_count = self.access_count.saturating_add(1);
    }
}
