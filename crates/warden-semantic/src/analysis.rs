// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The result of analyzing one query.

use serde::{Deserialize, Serialize};

use crate::exemplars::{Domain, Intent, Tone};
use crate::signals::{self, ContextSignals, ReasoningNeeds};

/// Weights of the complexity factors; they sum to one.
const DEPTH_WEIGHT: f64 = 0.3;
const INTERDEPENDENCY_WEIGHT: f64 = 0.3;
const AMBIGUITY_WEIGHT: f64 = 0.2;
const EXPERTISE_WEIGHT: f64 = 0.2;

/// Named inputs to the complexity score, each in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplexityFactors {
    pub conceptual_depth: f64,
    pub interdependency: f64,
    pub ambiguity: f64,
    pub expertise_required: bool,
}

impl ComplexityFactors {
    /// Lexical factors for `text`; expertise comes from embeddings.
    pub fn lexical(text: &str, expertise_required: bool) -> Self {
        Self {
            conceptual_depth: signals::conceptual_depth(text),
            interdependency: signals::interdependency(text),
            ambiguity: signals::ambiguity(text),
            expertise_required,
        }
    }

    pub fn score(&self) -> f64 {
        let expertise = if self.expertise_required { 1.0 } else { 0.0 };
        (DEPTH_WEIGHT * self.conceptual_depth
            + INTERDEPENDENCY_WEIGHT * self.interdependency
            + AMBIGUITY_WEIGHT * self.ambiguity
            + EXPERTISE_WEIGHT * expertise)
            .clamp(0.0, 1.0)
    }
}

/// Everything the router needs to know about a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticAnalysis {
    pub intent: Intent,
    pub intent_confidence: f64,
    pub domain: Domain,
    pub domain_confidence: f64,
    pub complexity: f64,
    pub complexity_factors: ComplexityFactors,
    pub tone: Tone,
    pub tone_weight: f64,
    pub signals: ContextSignals,
    pub reasoning: ReasoningNeeds,
    /// The query embedding came from the cache.
    pub cache_hit: bool,
    /// Embedding spend for this analysis in USD.
    pub cost_usd: f64,
    /// The regex-only path produced this analysis.
    pub fallback_used: bool,
    /// Reference embeddings were unavailable at startup.
    pub degraded: bool,
    /// Sub-steps that fell back to neutral defaults.
    pub warnings: Vec<String>,
}

impl SemanticAnalysis {
    pub fn requires_expertise(&self) -> bool {
        self.complexity_factors.expertise_required
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one() {
        let total = DEPTH_WEIGHT + INTERDEPENDENCY_WEIGHT + AMBIGUITY_WEIGHT + EXPERTISE_WEIGHT;
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn score_combines_factors() {
        let factors = ComplexityFactors {
            conceptual_depth: 1.0,
            interdependency: 0.5,
            ambiguity: 0.0,
            expertise_required: true,
        };
        assert!((factors.score() - (0.3 + 0.15 + 0.2)).abs() < 1e-12);
        assert_eq!(ComplexityFactors::default().score(), 0.0);
    }
}
