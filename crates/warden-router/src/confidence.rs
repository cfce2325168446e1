// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Confidence scoring for a classified query.
//!
//! Starts from a base scaled by classifier certainty, then applies named
//! adjustments. The final value is clamped to [0, 1].

use serde::{Deserialize, Serialize};
use warden_semantic::{Domain, Intent, SemanticAnalysis};

const BASE_CONFIDENCE: f64 = 0.95;
const COMPLEXITY_PENALTY: f64 = 0.15;
const MEMORY_BOOST: f64 = 0.03;
const DOCUMENT_BOOST: f64 = 0.03;
const VAULT_BOOST: f64 = 0.05;
const HIGH_STAKES_PENALTY: f64 = 0.10;
const DECISION_PENALTY: f64 = 0.05;
const FALLBACK_PENALTY: f64 = 0.15;

/// Everything confidence depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInputs {
    pub intent: Intent,
    pub intent_confidence: f64,
    pub domain: Domain,
    pub domain_confidence: f64,
    pub complexity: f64,
    pub has_memory: bool,
    pub has_documents: bool,
    pub has_vault: bool,
    pub fallback_used: bool,
}

impl ConfidenceInputs {
    pub fn from_analysis(
        analysis: &SemanticAnalysis,
        has_memory: bool,
        has_documents: bool,
        has_vault: bool,
    ) -> Self {
        Self {
            intent: analysis.intent,
            intent_confidence: analysis.intent_confidence,
            domain: analysis.domain,
            domain_confidence: analysis.domain_confidence,
            complexity: analysis.complexity,
            has_memory,
            has_documents,
            has_vault,
            fallback_used: analysis.fallback_used,
        }
    }
}

/// One named change to the base confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceAdjustment {
    pub reason: String,
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceScore {
    /// Final confidence in [0, 1].
    pub value: f64,
    /// Base before adjustments.
    pub base: f64,
    pub adjustments: Vec<ConfidenceAdjustment>,
}

pub fn compute_confidence(inputs: &ConfidenceInputs) -> ConfidenceScore {
    let intent = inputs.intent_confidence.clamp(0.0, 1.0);
    let domain = inputs.domain_confidence.clamp(0.0, 1.0);
    let base = BASE_CONFIDENCE * (0.6 + 0.4 * intent) * (0.6 + 0.4 * domain);

    let mut adjustments = Vec::new();
    let mut adjust = |reason: &str, delta: f64| {
        adjustments.push(ConfidenceAdjustment {
            reason: reason.to_string(),
            delta,
        })
    };

    let complexity = inputs.complexity.clamp(0.0, 1.0);
    if complexity > 0.0 {
        adjust("complexity", -COMPLEXITY_PENALTY * complexity);
    }
    if inputs.has_memory {
        adjust("memory_context", MEMORY_BOOST);
    }
    if inputs.has_documents {
        adjust("document_context", DOCUMENT_BOOST);
    }
    if inputs.has_vault {
        adjust("vault_context", VAULT_BOOST);
    }
    if inputs.domain.is_high_stakes() {
        adjust("high_stakes_domain", -HIGH_STAKES_PENALTY);
    }
    if inputs.intent == Intent::DecisionMaking {
        adjust("decision_making", -DECISION_PENALTY);
    }
    if inputs.fallback_used {
        adjust("classification_fallback", -FALLBACK_PENALTY);
    }

    let value = (base + adjustments.iter().map(|a| a.delta).sum::<f64>()).clamp(0.0, 1.0);
    ConfidenceScore {
        value,
        base,
        adjustments,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn inputs() -> ConfidenceInputs {
        ConfidenceInputs {
            intent: Intent::Question,
            intent_confidence: 1.0,
            domain: Domain::General,
            domain_confidence: 1.0,
            complexity: 0.0,
            has_memory: false,
            has_documents: false,
            has_vault: false,
            fallback_used: false,
        }
    }

    #[test]
    fn perfect_classification_scores_base() {
        let score = compute_confidence(&inputs());
        assert!((score.value - 0.95).abs() < 1e-12);
        assert!(score.adjustments.is_empty());
    }

    #[test]
    fn context_boosts_add_up() {
        let score = compute_confidence(&ConfidenceInputs {
            has_memory: true,
            has_documents: true,
            has_vault: true,
            ..inputs()
        });
        assert!((score.value - 1.0).abs() < 1e-12, "clamped at 1.0");
        assert_eq!(score.adjustments.len(), 3);
    }

    #[test]
    fn penalties_apply() {
        let score = compute_confidence(&ConfidenceInputs {
            intent: Intent::DecisionMaking,
            domain: Domain::Financial,
            complexity: 1.0,
            fallback_used: true,
            ..inputs()
        });
        let expected = 0.95 - 0.15 - 0.10 - 0.05 - 0.15;
        assert!((score.value - expected).abs() < 1e-12);
        let reasons: Vec<&str> = score.adjustments.iter().map(|a| a.reason.as_str()).collect();
        assert_eq!(
            reasons,
            vec!["complexity", "high_stakes_domain", "decision_making", "classification_fallback"]
        );
    }

    #[test]
    fn neutral_classifier_confidence_scales_base() {
        let score = compute_confidence(&ConfidenceInputs {
            intent_confidence: 0.5,
            domain_confidence: 0.5,
            ..inputs()
        });
        assert!((score.value - 0.95 * 0.8 * 0.8).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn confidence_stays_in_unit_range(
            ic in -1.0f64..2.0,
            dc in -1.0f64..2.0,
            complexity in -1.0f64..2.0,
            flags in proptest::array::uniform4(any::<bool>()),
        ) {
            let score = compute_confidence(&ConfidenceInputs {
                intent: Intent::DecisionMaking,
                intent_confidence: ic,
                domain: Domain::Health,
                domain_confidence: dc,
                complexity,
                has_memory: flags[0],
                has_documents: flags[1],
                has_vault: flags[2],
                fallback_used: flags[3],
            });
            prop_assert!((0.0..=1.0).contains(&score.value));
        }
    }
}
