// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Warden configuration system.

use std::io::Write;

use warden_config::diagnostic::ConfigError;
use warden_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

#[test]
fn full_toml_deserializes() {
    let toml = r#"
[agent]
name = "warden-test"
log_level = "debug"

[backends]
default_backend = "small"
premium_backend = "large"
max_tokens = 800

[cost]
embedding_per_mtok = 0.01

[cost.ceilings]
truth_general = 0.10

[cost.rates.small]
input_per_mtok = 0.1
output_per_mtok = 0.2

[cost.rates.large]
input_per_mtok = 3.0
output_per_mtok = 15.0

[semantic]
cache_max_entries = 50

[enforcement.founder]
minimum_price_usd = 997.0

[drift]
interval_secs = 60
"#;

    let config = load_and_validate_str(toml).expect("valid TOML should load");
    assert_eq!(config.agent.name, "warden-test");
    assert_eq!(config.backends.default_backend, "small");
    assert_eq!(config.backends.max_tokens, 800);
    assert_eq!(config.cost.rates.len(), 2);
    assert!((config.cost.ceilings.truth_general - 0.10).abs() < f64::EPSILON);
    // Untouched keys in a partially specified section keep their defaults.
    assert!((config.cost.ceilings.site_monkeys - 1.00).abs() < f64::EPSILON);
    assert_eq!(config.semantic.cache_max_entries, 50);
    assert!((config.enforcement.founder.minimum_price_usd - 997.0).abs() < f64::EPSILON);
    assert!((config.enforcement.founder.target_margin_pct - 87.0).abs() < f64::EPSILON);
    assert_eq!(config.drift.interval_secs, 60);
}

#[test]
fn unknown_key_gets_suggestion() {
    let toml = r#"
[routing]
confidence_treshold = 0.9
"#;

    let errors = load_and_validate_str(toml).expect_err("unknown key must be rejected");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "confidence_treshold");
            assert_eq!(suggestion.as_deref(), Some("confidence_threshold"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_top_level_section_is_rejected() {
    let err = load_config_from_str("[telemetry]\nenabled = true\n").expect_err("should fail");
    assert!(err.to_string().contains("telemetry"));
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[context]\nvault_budget = \"lots\"\n")
        .expect_err("string budget must be rejected");
    assert!(matches!(errors[0], ConfigError::InvalidType { .. }));
}

#[test]
fn semantic_errors_surface_as_validation() {
    let errors = load_and_validate_str("[routing]\ncomplexity_threshold = 2.0\n")
        .expect_err("out-of-range threshold must be rejected");
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}

#[test]
fn loads_from_explicit_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[context]\nmemory_budget = 1200").unwrap();

    let config = load_and_validate_path(file.path()).expect("file should load");
    assert_eq!(config.context.memory_budget, 1200);
}
