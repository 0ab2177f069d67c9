#![allow(clippy::field_reassign_with_default)]
//! E2E tests for config loading and validation.

use ckg_core::config::{CkgConfig, ConfigLoadError};

#[test]
fn empty_toml_all_defaults() {
    let config: CkgConfig = toml::from_str("").unwrap();
    assert_eq!(config, CkgConfig::default());
}

#[test]
fn partial_toml_only_overrides_named_fields() {
    let toml_str = r#"
        [storage]
        pool_size = 32
    "#;
    let config = CkgConfig::from_toml(toml_str).unwrap();
    assert_eq!(config.storage.pool_size, 32);
    assert_eq!(config.storage.db_path, "ckg.db", "untouched field should keep its default");
    assert_eq!(config.smf.undo_retention_days, 30, "untouched section should keep its defaults");
}

#[test]
fn decay_defaults_cover_all_five_sectors() {
    let config = CkgConfig::default();
    assert!(config.decay.is_complete());
}

#[test]
fn weights_must_sum_to_one() {
    let toml_str = r#"
        [retrieval.weights]
        semantic = 0.5
        lexical = 0.5
        graph = 0.5
    "#;
    let result = CkgConfig::from_toml(toml_str);
    assert!(matches!(result, Err(ConfigLoadError::Validation(_))));
}

#[test]
fn incomplete_decay_table_is_rejected() {
    let toml_str = r#"
        [decay.sectors.semantic]
        s_base = 100.0
    "#;
    let result = CkgConfig::from_toml(toml_str);
    assert!(matches!(result, Err(ConfigLoadError::Validation(_))));
}

#[test]
fn load_or_default_falls_back_on_missing_file() {
    let config = CkgConfig::load_or_default(std::path::Path::new("/nonexistent/ckg.toml"));
    assert_eq!(config, CkgConfig::default());
}

#[test]
fn constitutive_weight_floor_is_respected() {
    let mut config = CkgConfig::default();
    config.ief.constitutive_weight = 0.1;
    assert!(config.ief.effective_constitutive_weight() >= ckg_core::config::W_MIN_CONSTITUTIVE);
}
