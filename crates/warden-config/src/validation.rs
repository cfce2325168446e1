// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation.
//!
//! Collects every semantic error instead of failing on the first one.

use crate::diagnostic::ConfigError;
use crate::model::WardenConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &WardenConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        fail(format!(
            "agent.log_level must be one of {}, got `{}`",
            LOG_LEVELS.join(", "),
            config.agent.log_level
        ));
    }

    let backends = &config.backends;
    if backends.default_backend.trim().is_empty() {
        fail("backends.default_backend must not be empty".to_string());
    }
    if backends.premium_backend.trim().is_empty() {
        fail("backends.premium_backend must not be empty".to_string());
    }
    if backends.max_tokens == 0 {
        fail("backends.max_tokens must be greater than zero".to_string());
    }
    if !(0.0..=2.0).contains(&backends.temperature) {
        fail(format!(
            "backends.temperature must be within [0, 2], got {}",
            backends.temperature
        ));
    }

    if config.openai.base_url.trim().is_empty() {
        fail("openai.base_url must not be empty".to_string());
    }

    let cost = &config.cost;
    for (name, ceiling) in [
        ("truth_general", cost.ceilings.truth_general),
        ("business_validation", cost.ceilings.business_validation),
        ("site_monkeys", cost.ceilings.site_monkeys),
    ] {
        if !(ceiling.is_finite() && ceiling > 0.0) {
            fail(format!("cost.ceilings.{name} must be positive, got {ceiling}"));
        }
    }
    if cost.rates.is_empty() {
        fail("cost.rates must price at least one backend".to_string());
    }
    for (backend, rate) in &cost.rates {
        if rate.input_per_mtok < 0.0 || rate.output_per_mtok < 0.0 {
            fail(format!("cost.rates.{backend} must be non-negative"));
        }
    }
    if cost.embedding_per_mtok < 0.0 {
        fail(format!(
            "cost.embedding_per_mtok must be non-negative, got {}",
            cost.embedding_per_mtok
        ));
    }
    if !(cost.warn_threshold_pct > 0.0 && cost.warn_threshold_pct <= 100.0) {
        fail(format!(
            "cost.warn_threshold_pct must be within (0, 100], got {}",
            cost.warn_threshold_pct
        ));
    }

    let semantic = &config.semantic;
    if semantic.init_timeout_secs == 0 {
        fail("semantic.init_timeout_secs must be greater than zero".to_string());
    }
    if semantic.cache_max_entries == 0 {
        fail("semantic.cache_max_entries must be greater than zero".to_string());
    }
    if semantic.embedding_dimensions == 0 {
        fail("semantic.embedding_dimensions must be greater than zero".to_string());
    }
    check_unit(&mut fail, "semantic.degraded_confidence_cap", semantic.degraded_confidence_cap);

    let routing = &config.routing;
    check_unit(&mut fail, "routing.confidence_threshold", routing.confidence_threshold);
    check_unit(&mut fail, "routing.complexity_threshold", routing.complexity_threshold);
    check_unit(&mut fail, "routing.expertise_similarity", routing.expertise_similarity);

    let context = &config.context;
    for (name, budget) in [
        ("memory_budget", context.memory_budget),
        ("document_budget", context.document_budget),
        ("vault_budget", context.vault_budget),
        ("total_budget", context.total_budget),
    ] {
        if budget == 0 {
            fail(format!("context.{name} must be greater than zero"));
        }
    }

    let founder = &config.enforcement.founder;
    if founder.minimum_price_usd < 0.0 {
        fail("enforcement.founder.minimum_price_usd must be non-negative".to_string());
    }
    for (name, pct) in [
        ("target_margin_pct", founder.target_margin_pct),
        ("max_discount_pct", founder.max_discount_pct),
    ] {
        if !(0.0..=100.0).contains(&pct) {
            fail(format!("enforcement.founder.{name} must be within [0, 100], got {pct}"));
        }
    }
    check_unit(
        &mut fail,
        "enforcement.truth.min_confidence_for_certainty",
        config.enforcement.truth.min_confidence_for_certainty,
    );

    if config.drift.interval_secs == 0 {
        fail("drift.interval_secs must be greater than zero".to_string());
    }
    for path in &config.drift.critical_paths {
        if path.trim().is_empty() || path.split('.').any(str::is_empty) {
            fail(format!("drift.critical_paths entry `{path}` is not a dotted path"));
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn check_unit(fail: &mut impl FnMut(String), key: &str, value: f64) {
    if !(0.0..=1.0).contains(&value) {
        fail(format!("{key} must be within [0, 1], got {value}"));
    }
}
