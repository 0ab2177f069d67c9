use serde::{Deserialize, Serialize};

/// Memory sector — governs decay parameters (spec.md §3, §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sector {
    Emotional,
    Episodic,
    Semantic,
    Procedural,
    Reflective,
}

impl Sector {
    pub const ALL: [Sector; 5] = [
        Sector::Emotional,
        Sector::Episodic,
        Sector::Semantic,
        Sector::Procedural,
        Sector::Reflective,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Sector::Emotional => "emotional",
            Sector::Episodic => "episodic",
            Sector::Semantic => "semantic",
            Sector::Procedural => "procedural",
            Sector::Reflective => "reflective",
        }
    }

    pub fn from_str_name(s: &str) -> Option<Self> {
        match s {
            "emotional" => Some(Sector::Emotional),
            "episodic" => Some(Sector::Episodic),
            "semantic" => Some(Sector::Semantic),
            "procedural" => Some(Sector::Procedural),
            "reflective" => Some(Sector::Reflective),
            _ => None,
        }
    }
}

impl Default for Sector {
    fn default() -> Self {
        Sector::Semantic
    }
}

impl std::fmt::Display for Sector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
