// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend selection.
//!
//! The premium backend is chosen when any trigger fires: low confidence,
//! required expertise, or a deep-analysis mode facing a complex query.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::info;
use warden_config::WardenConfig;
use warden_config::model::{BackendsConfig, RoutingConfig};
use warden_core::{Mode, ProviderAdapter};
use warden_cost::RateTable;
use warden_semantic::SemanticAnalysis;

use crate::confidence::ConfidenceScore;

/// Which of the two configured backends a decision targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BackendTier {
    Default,
    Premium,
}

/// Why a backend was chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RouteReason {
    LowConfidence { confidence: f64, threshold: f64 },
    ExpertiseRequired,
    DeepAnalysis { complexity: f64, threshold: f64 },
    /// No premium trigger fired.
    ConfidentDefault { confidence: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub tier: BackendTier,
    /// Backend id sent as the request's model.
    pub backend: String,
    pub reasons: Vec<RouteReason>,
    pub confidence: f64,
}

/// Provider adapters behind each tier.
///
/// Both tiers may share one adapter; the backend id travels in the request.
#[derive(Clone)]
pub struct BackendSet {
    pub default: Arc<dyn ProviderAdapter>,
    pub premium: Arc<dyn ProviderAdapter>,
}

impl BackendSet {
    pub fn shared(provider: Arc<dyn ProviderAdapter>) -> Self {
        Self {
            default: Arc::clone(&provider),
            premium: provider,
        }
    }

    pub fn get(&self, tier: BackendTier) -> &Arc<dyn ProviderAdapter> {
        match tier {
            BackendTier::Default => &self.default,
            BackendTier::Premium => &self.premium,
        }
    }
}

/// Chooses and invokes backends.
pub struct ModelRouter {
    pub(crate) routing: RoutingConfig,
    pub(crate) backends: BackendsConfig,
    pub(crate) rates: RateTable,
    pub(crate) providers: BackendSet,
}

impl ModelRouter {
    pub fn new(
        routing: RoutingConfig,
        backends: BackendsConfig,
        rates: RateTable,
        providers: BackendSet,
    ) -> Self {
        Self {
            routing,
            backends,
            rates,
            providers,
        }
    }

    pub fn from_config(config: &WardenConfig, providers: BackendSet) -> Self {
        Self::new(
            config.routing.clone(),
            config.backends.clone(),
            RateTable::from_config(&config.cost),
            providers,
        )
    }

    pub fn backend_id(&self, tier: BackendTier) -> &str {
        match tier {
            BackendTier::Default => &self.backends.default_backend,
            BackendTier::Premium => &self.backends.premium_backend,
        }
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub fn route(
        &self,
        analysis: &SemanticAnalysis,
        confidence: &ConfidenceScore,
        mode: Mode,
    ) -> RoutingDecision {
        let mut reasons = Vec::new();

        if confidence.value < self.routing.confidence_threshold {
            reasons.push(RouteReason::LowConfidence {
                confidence: confidence.value,
                threshold: self.routing.confidence_threshold,
            });
        }
        if analysis.requires_expertise() {
            reasons.push(RouteReason::ExpertiseRequired);
        }
        if mode.behavior().deep_analysis() && analysis.complexity > self.routing.complexity_threshold {
            reasons.push(RouteReason::DeepAnalysis {
                complexity: analysis.complexity,
                threshold: self.routing.complexity_threshold,
            });
        }

        let tier = if reasons.is_empty() {
            reasons.push(RouteReason::ConfidentDefault {
                confidence: confidence.value,
            });
            BackendTier::Default
        } else {
            BackendTier::Premium
        };

        let backend = self.backend_id(tier).to_string();
        info!(
            %tier,
            backend = backend.as_str(),
            confidence = confidence.value,
            complexity = analysis.complexity,
            %mode,
            "backend selected"
        );

        RoutingDecision {
            tier,
            backend,
            reasons,
            confidence: confidence.value,
        }
    }
}

#[cfg(test)]
mod tests {
    use warden_semantic::heuristic_analysis;
    use warden_test_utils::MockProvider;

    use super::*;

    fn router() -> ModelRouter {
        ModelRouter::from_config(
            &WardenConfig::default(),
            BackendSet::shared(Arc::new(MockProvider::new())),
        )
    }

    fn score(value: f64) -> ConfidenceScore {
        ConfidenceScore {
            value,
            base: value,
            adjustments: Vec::new(),
        }
    }

    fn simple_analysis() -> SemanticAnalysis {
        let mut a = heuristic_analysis("what time is it");
        a.fallback_used = false;
        a.complexity = 0.1;
        a
    }

    #[test]
    fn confident_simple_query_uses_default() {
        let decision = router().route(&simple_analysis(), &score(0.9), Mode::TruthGeneral);
        assert_eq!(decision.tier, BackendTier::Default);
        assert_eq!(decision.backend, "gpt-4o-mini");
        assert!(matches!(decision.reasons[..], [RouteReason::ConfidentDefault { .. }]));
    }

    #[test]
    fn low_confidence_escalates() {
        let decision = router().route(&simple_analysis(), &score(0.84), Mode::TruthGeneral);
        assert_eq!(decision.tier, BackendTier::Premium);
        assert_eq!(decision.backend, "gpt-4o");
        assert!(matches!(decision.reasons[0], RouteReason::LowConfidence { .. }));
    }

    #[test]
    fn expertise_escalates_even_when_confident() {
        let mut analysis = simple_analysis();
        analysis.complexity_factors.expertise_required = true;
        let decision = router().route(&analysis, &score(0.99), Mode::TruthGeneral);
        assert_eq!(decision.tier, BackendTier::Premium);
        assert_eq!(decision.reasons, vec![RouteReason::ExpertiseRequired]);
    }

    #[test]
    fn deep_analysis_depends_on_mode() {
        let mut analysis = simple_analysis();
        analysis.complexity = 0.75;

        let general = router().route(&analysis, &score(0.99), Mode::TruthGeneral);
        assert_eq!(general.tier, BackendTier::Default);

        let business = router().route(&analysis, &score(0.99), Mode::BusinessValidation);
        assert_eq!(business.tier, BackendTier::Premium);
        assert!(matches!(business.reasons[0], RouteReason::DeepAnalysis { .. }));
    }

    #[test]
    fn all_triggers_are_reported() {
        let mut analysis = simple_analysis();
        analysis.complexity = 0.9;
        analysis.complexity_factors.expertise_required = true;
        let decision = router().route(&analysis, &score(0.2), Mode::SiteMonkeys);
        assert_eq!(decision.reasons.len(), 3);
    }
}
