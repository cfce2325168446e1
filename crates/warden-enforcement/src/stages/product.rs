// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Product recommendation validation.

use warden_config::model::ProductPolicy;
use warden_core::WardenError;

use crate::stage::{EnforcementStage, StageContext, StageOutcome, append_paragraph, find_phrases};

/// Flags recommendations that come without stated evidence.
pub struct ProductValidation {
    policy: ProductPolicy,
}

impl ProductValidation {
    pub fn new(policy: ProductPolicy) -> Self {
        Self { policy }
    }
}

impl EnforcementStage for ProductValidation {
    fn name(&self) -> &'static str {
        "product_validation"
    }

    fn apply(&self, text: &str, _ctx: &StageContext<'_>) -> Result<StageOutcome, WardenError> {
        if !self.policy.require_evidence {
            return Ok(StageOutcome::pass());
        }

        let recommendations = find_phrases(text, &self.policy.recommendation_phrases);
        if recommendations.is_empty() || !find_phrases(text, &self.policy.evidence_markers).is_empty() {
            return Ok(StageOutcome::pass());
        }

        match append_paragraph(text, &self.policy.disclosure) {
            Some(disclosed) => Ok(StageOutcome::modified(
                disclosed,
                format!("unsupported recommendation: {}", recommendations.join(", ")),
            )
            .with_confidence(-0.05, "recommendation without evidence")),
            None => Ok(StageOutcome::pass()),
        }
    }
}

#[cfg(test)]
mod tests {
    use warden_core::Mode;

    use super::*;
    use crate::stage::test_support::ctx;

    #[test]
    fn unsupported_recommendation_is_disclosed() {
        let stage = ProductValidation::new(ProductPolicy::default());
        let out = stage
            .apply("I recommend switching to Acme CRM.", &ctx(Mode::TruthGeneral, 0.9))
            .unwrap();
        assert!(out.text.unwrap().contains("Recommendation note"));
        assert_eq!(out.confidence_adjustments[0].0, -0.05);
    }

    #[test]
    fn evidence_backed_recommendation_passes() {
        let stage = ProductValidation::new(ProductPolicy::default());
        let out = stage
            .apply(
                "I recommend Acme CRM because it integrates with your billing system.",
                &ctx(Mode::TruthGeneral, 0.9),
            )
            .unwrap();
        assert_eq!(out, StageOutcome::pass());
    }

    #[test]
    fn evidence_requirement_can_be_disabled() {
        let stage = ProductValidation::new(ProductPolicy {
            require_evidence: false,
            ..ProductPolicy::default()
        });
        let out = stage
            .apply("You should buy it.", &ctx(Mode::TruthGeneral, 0.9))
            .unwrap();
        assert!(out.text.is_none());
    }
}
