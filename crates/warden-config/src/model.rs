// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Warden orchestration engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use warden_core::Mode;

/// Top-level Warden configuration.
///
/// Every section is optional and falls back to compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WardenConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Backend selection and call dispatch.
    #[serde(default)]
    pub backends: BackendsConfig,

    /// OpenAI-compatible HTTP endpoint.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Rates and per-mode spending ceilings.
    #[serde(default)]
    pub cost: CostConfig,

    /// Semantic classifier settings.
    #[serde(default)]
    pub semantic: SemanticConfig,

    /// Confidence-driven routing thresholds.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Context token budgets.
    #[serde(default)]
    pub context: ContextConfig,

    /// Enforcement policy parameters. Also the drift baseline.
    #[serde(default)]
    pub enforcement: EnforcementConfig,

    /// Drift monitor settings.
    #[serde(default)]
    pub drift: DriftConfig,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used in logs.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "warden".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Backend selection and call dispatch configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackendsConfig {
    /// Cheaper backend used when confidence is high.
    #[serde(default = "default_backend")]
    pub default_backend: String,

    /// Stronger backend used for low-confidence or expert queries.
    #[serde(default = "default_premium_backend")]
    pub premium_backend: String,

    /// Maximum tokens requested from either backend.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Minimum spacing between external call starts.
    #[serde(default = "default_min_call_spacing_ms")]
    pub min_call_spacing_ms: u64,

    /// Retries for rate-limited calls.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base for exponential backoff between retries.
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,
}

impl Default for BackendsConfig {
    fn default() -> Self {
        Self {
            default_backend: default_backend(),
            premium_backend: default_premium_backend(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            min_call_spacing_ms: default_min_call_spacing_ms(),
            max_retries: default_max_retries(),
            base_backoff_ms: default_base_backoff_ms(),
        }
    }
}

fn default_backend() -> String {
    "gpt-4o-mini".to_string()
}

fn default_premium_backend() -> String {
    "gpt-4o".to_string()
}

fn default_max_tokens() -> u32 {
    1200
}

fn default_temperature() -> f32 {
    0.3
}

fn default_min_call_spacing_ms() -> u64 {
    250
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_backoff_ms() -> u64 {
    500
}

/// OpenAI-compatible endpoint configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// API key. `None` falls back to the `OPENAI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the API (no trailing slash).
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    /// Model used for embeddings.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Per-request HTTP timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_base_url(),
            embedding_model: default_embedding_model(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// Price of a backend in USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackendRate {
    pub input_per_mtok: f64,
    pub output_per_mtok: f64,
}

/// Per-mode session spending ceilings in USD.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CeilingsConfig {
    #[serde(default = "default_truth_general_ceiling")]
    pub truth_general: f64,

    #[serde(default = "default_business_validation_ceiling")]
    pub business_validation: f64,

    #[serde(default = "default_site_monkeys_ceiling")]
    pub site_monkeys: f64,
}

impl CeilingsConfig {
    /// Ceiling for the given mode.
    pub fn for_mode(&self, mode: Mode) -> f64 {
        match mode {
            Mode::TruthGeneral => self.truth_general,
            Mode::BusinessValidation => self.business_validation,
            Mode::SiteMonkeys => self.site_monkeys,
        }
    }
}

impl Default for CeilingsConfig {
    fn default() -> Self {
        Self {
            truth_general: default_truth_general_ceiling(),
            business_validation: default_business_validation_ceiling(),
            site_monkeys: default_site_monkeys_ceiling(),
        }
    }
}

fn default_truth_general_ceiling() -> f64 {
    0.25
}

fn default_business_validation_ceiling() -> f64 {
    0.50
}

fn default_site_monkeys_ceiling() -> f64 {
    1.00
}

/// Cost tracking and admission configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CostConfig {
    /// Session ceilings per mode.
    #[serde(default)]
    pub ceilings: CeilingsConfig,

    /// Backend id to price.
    #[serde(default = "default_rates")]
    pub rates: BTreeMap<String, BackendRate>,

    /// Embedding price in USD per million tokens.
    #[serde(default = "default_embedding_per_mtok")]
    pub embedding_per_mtok: f64,

    /// Percentage of a ceiling at which a warning is logged.
    #[serde(default = "default_warn_threshold_pct")]
    pub warn_threshold_pct: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            ceilings: CeilingsConfig::default(),
            rates: default_rates(),
            embedding_per_mtok: default_embedding_per_mtok(),
            warn_threshold_pct: default_warn_threshold_pct(),
        }
    }
}

fn default_rates() -> BTreeMap<String, BackendRate> {
    BTreeMap::from([
        (
            "gpt-4o-mini".to_string(),
            BackendRate {
                input_per_mtok: 0.15,
                output_per_mtok: 0.60,
            },
        ),
        (
            "gpt-4o".to_string(),
            BackendRate {
                input_per_mtok: 2.50,
                output_per_mtok: 10.00,
            },
        ),
    ])
}

fn default_embedding_per_mtok() -> f64 {
    0.02
}

fn default_warn_threshold_pct() -> f64 {
    80.0
}

/// Semantic classifier configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SemanticConfig {
    /// Deadline for precomputing reference embeddings at startup.
    #[serde(default = "default_init_timeout_secs")]
    pub init_timeout_secs: u64,

    /// Maximum number of cached query embeddings.
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,

    /// Vector length used for zero reference vectors in degraded mode.
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: usize,

    /// Upper bound on embedding-derived confidences while degraded.
    #[serde(default = "default_degraded_confidence_cap")]
    pub degraded_confidence_cap: f64,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            init_timeout_secs: default_init_timeout_secs(),
            cache_max_entries: default_cache_max_entries(),
            embedding_dimensions: default_embedding_dimensions(),
            degraded_confidence_cap: default_degraded_confidence_cap(),
        }
    }
}

fn default_init_timeout_secs() -> u64 {
    20
}

fn default_cache_max_entries() -> usize {
    500
}

fn default_embedding_dimensions() -> usize {
    1536
}

fn default_degraded_confidence_cap() -> f64 {
    0.5
}

/// Routing thresholds.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Below this confidence the premium backend is used.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Above this complexity, deep-analysis modes escalate.
    #[serde(default = "default_complexity_threshold")]
    pub complexity_threshold: f64,

    /// Similarity to the technical exemplar that marks a query as expert.
    #[serde(default = "default_expertise_similarity")]
    pub expertise_similarity: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            complexity_threshold: default_complexity_threshold(),
            expertise_similarity: default_expertise_similarity(),
        }
    }
}

fn default_confidence_threshold() -> f64 {
    0.85
}

fn default_complexity_threshold() -> f64 {
    0.7
}

fn default_expertise_similarity() -> f64 {
    0.6
}

/// Context assembly token budgets.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ContextConfig {
    #[serde(default = "default_memory_budget")]
    pub memory_budget: usize,

    #[serde(default = "default_document_budget")]
    pub document_budget: usize,

    #[serde(default = "default_vault_budget")]
    pub vault_budget: usize,

    /// Global cap across all sources.
    #[serde(default = "default_total_budget")]
    pub total_budget: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            memory_budget: default_memory_budget(),
            document_budget: default_document_budget(),
            vault_budget: default_vault_budget(),
            total_budget: default_total_budget(),
        }
    }
}

fn default_memory_budget() -> usize {
    2400
}

fn default_document_budget() -> usize {
    3000
}

fn default_vault_budget() -> usize {
    9000
}

fn default_total_budget() -> usize {
    15000
}

/// Policy parameters for every enforcement stage.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EnforcementConfig {
    #[serde(default)]
    pub truth: TruthPolicy,

    #[serde(default)]
    pub initiative: InitiativePolicy,

    #[serde(default)]
    pub political: PoliticalPolicy,

    #[serde(default)]
    pub product: ProductPolicy,

    #[serde(default)]
    pub founder: FounderPolicy,

    #[serde(default)]
    pub vault: VaultPolicy,
}

/// Truth-first validation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TruthPolicy {
    /// Phrases that assert certainty.
    #[serde(default = "default_overconfident_phrases")]
    pub overconfident_phrases: Vec<String>,

    /// Appended when certainty is claimed without enough confidence.
    #[serde(default = "default_uncertainty_disclosure")]
    pub uncertainty_disclosure: String,

    /// Confidence required before certainty language is left alone.
    #[serde(default = "default_min_confidence_for_certainty")]
    pub min_confidence_for_certainty: f64,
}

impl Default for TruthPolicy {
    fn default() -> Self {
        Self {
            overconfident_phrases: default_overconfident_phrases(),
            uncertainty_disclosure: default_uncertainty_disclosure(),
            min_confidence_for_certainty: default_min_confidence_for_certainty(),
        }
    }
}

fn default_overconfident_phrases() -> Vec<String> {
    [
        "definitely",
        "certainly",
        "guaranteed",
        "without a doubt",
        "100%",
        "always works",
        "absolutely",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_uncertainty_disclosure() -> String {
    "Confidence note: parts of this answer are uncertain. Verify the critical details before acting on them.".to_string()
}

fn default_min_confidence_for_certainty() -> f64 {
    0.7
}

/// Initiative enforcement.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InitiativePolicy {
    /// Passive closing lines removed from responses.
    #[serde(default = "default_passive_phrases")]
    pub passive_phrases: Vec<String>,

    /// Appended when a response ends without a concrete next step.
    #[serde(default = "default_next_step_prompt")]
    pub next_step_prompt: String,
}

impl Default for InitiativePolicy {
    fn default() -> Self {
        Self {
            passive_phrases: default_passive_phrases(),
            next_step_prompt: default_next_step_prompt(),
        }
    }
}

fn default_passive_phrases() -> Vec<String> {
    [
        "let me know if you have any questions",
        "i hope this helps",
        "hope this helps",
        "feel free to ask",
        "let me know if you need anything else",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_next_step_prompt() -> String {
    "Next step: pick the highest-impact action above and commit to a date for it.".to_string()
}

/// Political neutrality guard.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PoliticalPolicy {
    /// Terms that mark a partisan request or answer.
    #[serde(default = "default_partisan_terms")]
    pub partisan_terms: Vec<String>,

    /// Replacement text for responses that take a partisan position.
    #[serde(default = "default_neutral_response")]
    pub neutral_response: String,
}

impl Default for PoliticalPolicy {
    fn default() -> Self {
        Self {
            partisan_terms: default_partisan_terms(),
            neutral_response: default_neutral_response(),
        }
    }
}

fn default_partisan_terms() -> Vec<String> {
    [
        "vote for",
        "who should i vote",
        "democrat",
        "republican",
        "liberal",
        "conservative",
        "left-wing",
        "right-wing",
        "political party",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_neutral_response() -> String {
    "I don't take sides on political questions. I can lay out the strongest arguments on each side, or point you to nonpartisan sources so you can decide.".to_string()
}

/// Product recommendation validation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProductPolicy {
    /// Whether recommendations must be backed by stated evidence.
    #[serde(default = "default_true")]
    pub require_evidence: bool,

    /// Phrases that mark a product recommendation.
    #[serde(default = "default_recommendation_phrases")]
    pub recommendation_phrases: Vec<String>,

    /// Phrases that count as stated evidence.
    #[serde(default = "default_evidence_markers")]
    pub evidence_markers: Vec<String>,

    /// Appended to unsupported recommendations.
    #[serde(default = "default_product_disclosure")]
    pub disclosure: String,
}

impl Default for ProductPolicy {
    fn default() -> Self {
        Self {
            require_evidence: default_true(),
            recommendation_phrases: default_recommendation_phrases(),
            evidence_markers: default_evidence_markers(),
            disclosure: default_product_disclosure(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_recommendation_phrases() -> Vec<String> {
    [
        "i recommend",
        "you should buy",
        "you should use",
        "the best tool",
        "the best product",
        "go with",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_evidence_markers() -> Vec<String> {
    [
        "because",
        "based on",
        "according to",
        "benchmark",
        "data shows",
        "evidence",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_product_disclosure() -> String {
    "Recommendation note: this suggestion has not been validated against your requirements. Compare alternatives before you commit.".to_string()
}

/// Founder and business protection.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FounderPolicy {
    /// Lowest price a response may propose.
    #[serde(default = "default_minimum_price_usd")]
    pub minimum_price_usd: f64,

    /// Lowest acceptable gross margin.
    #[serde(default = "default_target_margin_pct")]
    pub target_margin_pct: f64,

    /// Largest acceptable discount.
    #[serde(default = "default_max_discount_pct")]
    pub max_discount_pct: f64,

    /// Appended when a response breaks a business-protection rule.
    #[serde(default = "default_protection_notice")]
    pub protection_notice: String,
}

impl Default for FounderPolicy {
    fn default() -> Self {
        Self {
            minimum_price_usd: default_minimum_price_usd(),
            target_margin_pct: default_target_margin_pct(),
            max_discount_pct: default_max_discount_pct(),
            protection_notice: default_protection_notice(),
        }
    }
}

fn default_minimum_price_usd() -> f64 {
    697.0
}

fn default_target_margin_pct() -> f64 {
    87.0
}

fn default_max_discount_pct() -> f64 {
    20.0
}

fn default_protection_notice() -> String {
    "Business protection: the figures above conflict with the pricing floor, margin target or discount limit. Do not act on them without review.".to_string()
}

/// Vault compliance.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultPolicy {
    /// Whether responses must reflect the active vault.
    #[serde(default = "default_true")]
    pub require_vault_reference: bool,

    /// Appended when a response does not draw on the vault.
    #[serde(default = "default_vault_notice")]
    pub vault_notice: String,
}

impl Default for VaultPolicy {
    fn default() -> Self {
        Self {
            require_vault_reference: default_true(),
            vault_notice: default_vault_notice(),
        }
    }
}

fn default_vault_notice() -> String {
    "Vault note: this answer was not matched against the operating vault. Check it against the vault rules before acting.".to_string()
}

/// Drift monitor configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DriftConfig {
    /// Interval between periodic checks.
    #[serde(default = "default_drift_interval_secs")]
    pub interval_secs: u64,

    /// Dotted paths whose absence or emptiness is a critical failure.
    #[serde(default = "default_critical_paths")]
    pub critical_paths: Vec<String>,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_drift_interval_secs(),
            critical_paths: default_critical_paths(),
        }
    }
}

fn default_drift_interval_secs() -> u64 {
    300
}

fn default_critical_paths() -> Vec<String> {
    [
        "truth.uncertainty_disclosure",
        "political.neutral_response",
        "founder.minimum_price_usd",
        "founder.target_margin_pct",
        "founder.max_discount_pct",
        "vault.require_vault_reference",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = WardenConfig::default();
        assert_eq!(config.context.memory_budget, 2400);
        assert_eq!(config.context.document_budget, 3000);
        assert_eq!(config.context.vault_budget, 9000);
        assert_eq!(config.context.total_budget, 15000);
        assert_eq!(config.semantic.init_timeout_secs, 20);
        assert_eq!(config.semantic.cache_max_entries, 500);
        assert!((config.routing.confidence_threshold - 0.85).abs() < f64::EPSILON);
        assert!((config.cost.ceilings.truth_general - 0.25).abs() < f64::EPSILON);
        assert!((config.enforcement.founder.minimum_price_usd - 697.0).abs() < f64::EPSILON);
        assert!(config.cost.rates.contains_key(&config.backends.default_backend));
        assert!(config.cost.rates.contains_key(&config.backends.premium_backend));
    }

    #[test]
    fn ceilings_resolve_per_mode() {
        let ceilings = CeilingsConfig::default();
        assert!((ceilings.for_mode(Mode::TruthGeneral) - 0.25).abs() < f64::EPSILON);
        assert!((ceilings.for_mode(Mode::BusinessValidation) - 0.50).abs() < f64::EPSILON);
        assert!((ceilings.for_mode(Mode::SiteMonkeys) - 1.00).abs() < f64::EPSILON);
    }

    #[test]
    fn critical_paths_exist_in_enforcement_defaults() {
        let tree = serde_json::to_value(EnforcementConfig::default()).unwrap();
        for path in default_critical_paths() {
            let pointer = format!("/{}", path.replace('.', "/"));
            assert!(tree.pointer(&pointer).is_some(), "missing {path}");
        }
    }
}
