//! Pure rule function `classify(relation, properties) -> sector` (spec.md
//! §4.3). Deterministic, no I/O, ordered rules with first-match-wins.

use ckg_core::models::Sector;

/// Rule-set size cap (spec.md §4.3 "capped at a configurable maximum,
/// default 50 per sector"). The built-in rule table below is far smaller;
/// this constant exists so a future rule-authoring surface can enforce the
/// bound without this module needing to change shape.
pub const MAX_RULES_PER_SECTOR: usize = 50;

const PROCEDURAL_RELATIONS: &[&str] = &["LEARNED", "CAN_DO"];
const REFLECTIVE_RELATIONS: &[&str] = &["REFLECTS", "REALIZED"];

/// Classifies a (relation, properties) pair into a memory sector. First
/// matching rule wins; unmatched input defaults to `Sector::Semantic`.
pub fn classify(relation: &str, properties: &serde_json::Value) -> Sector {
    let sector = classify_inner(relation, properties);
    tracing::debug!(relation, sector = %sector, "sector classification");
    sector
}

fn classify_inner(relation: &str, properties: &serde_json::Value) -> Sector {
    if properties.get("emotional_valence").is_some() {
        return Sector::Emotional;
    }
    if properties.get("context_type").and_then(|v| v.as_str()) == Some("shared_experience") {
        return Sector::Episodic;
    }
    if PROCEDURAL_RELATIONS.contains(&relation) {
        return Sector::Procedural;
    }
    if REFLECTIVE_RELATIONS.contains(&relation) {
        return Sector::Reflective;
    }
    Sector::Semantic
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn emotional_valence_wins_first() {
        let props = json!({"emotional_valence": "joy", "context_type": "shared_experience"});
        assert_eq!(classify("LEARNED", &props), Sector::Emotional);
    }

    #[test]
    fn shared_experience_is_episodic() {
        let props = json!({"context_type": "shared_experience"});
        assert_eq!(classify("KNOWS", &props), Sector::Episodic);
    }

    #[test]
    fn learned_and_can_do_are_procedural() {
        assert_eq!(classify("LEARNED", &json!({})), Sector::Procedural);
        assert_eq!(classify("CAN_DO", &json!({})), Sector::Procedural);
    }

    #[test]
    fn reflects_and_realized_are_reflective() {
        assert_eq!(classify("REFLECTS", &json!({})), Sector::Reflective);
        assert_eq!(classify("REALIZED", &json!({})), Sector::Reflective);
    }

    #[test]
    fn default_is_semantic() {
        assert_eq!(classify("KNOWS", &json!({})), Sector::Semantic);
    }

    #[test]
    fn deterministic_same_input_same_output() {
        let props = json!({"foo": "bar"});
        assert_eq!(classify("HOLDS", &props), classify("HOLDS", &props));
    }
}
