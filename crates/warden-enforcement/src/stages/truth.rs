// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Truth-first validation.

use warden_config::model::TruthPolicy;
use warden_core::WardenError;

use crate::stage::{EnforcementStage, StageContext, StageOutcome, append_paragraph, find_phrases};

/// Discloses uncertainty when confidence is below the certainty threshold.
///
/// Certainty language at low confidence additionally lowers the final
/// confidence.
pub struct TruthValidation {
    policy: TruthPolicy,
}

impl TruthValidation {
    pub fn new(policy: TruthPolicy) -> Self {
        Self { policy }
    }
}

impl EnforcementStage for TruthValidation {
    fn name(&self) -> &'static str {
        "truth_validation"
    }

    fn apply(&self, text: &str, ctx: &StageContext<'_>) -> Result<StageOutcome, WardenError> {
        let threshold = self.policy.min_confidence_for_certainty;
        if ctx.confidence >= threshold {
            return Ok(StageOutcome::pass());
        }

        let Some(disclosed) = append_paragraph(text, &self.policy.uncertainty_disclosure) else {
            return Ok(StageOutcome::pass());
        };

        let mut outcome = StageOutcome::modified(
            disclosed,
            format!(
                "uncertainty disclosed at confidence {:.2} (threshold {threshold:.2})",
                ctx.confidence
            ),
        );

        let claimed = find_phrases(text, &self.policy.overconfident_phrases);
        if !claimed.is_empty() {
            outcome = outcome.with_confidence(
                -0.10,
                format!("certainty claimed with: {}", claimed.join(", ")),
            );
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use warden_core::Mode;

    use super::*;
    use crate::stage::test_support::ctx;

    #[test]
    fn confident_answers_pass() {
        let stage = TruthValidation::new(TruthPolicy::default());
        let out = stage
            .apply("This will definitely work.", &ctx(Mode::TruthGeneral, 0.9))
            .unwrap();
        assert_eq!(out, StageOutcome::pass());
    }

    #[test]
    fn low_confidence_gets_disclosure() {
        let policy = TruthPolicy::default();
        let stage = TruthValidation::new(policy.clone());
        let out = stage
            .apply("It may rain tomorrow.", &ctx(Mode::TruthGeneral, 0.4))
            .unwrap();
        let text = out.text.unwrap();
        assert!(text.ends_with(&policy.uncertainty_disclosure));
        assert!(out.confidence_adjustments.is_empty());
    }

    #[test]
    fn certainty_language_at_low_confidence_is_penalized() {
        let stage = TruthValidation::new(TruthPolicy::default());
        let out = stage
            .apply("This is guaranteed to double revenue.", &ctx(Mode::TruthGeneral, 0.5))
            .unwrap();
        assert_eq!(out.confidence_adjustments.len(), 1);
        assert!(out.confidence_adjustments[0].0 < 0.0);
        assert!(out.confidence_adjustments[0].1.contains("guaranteed"));
    }

    #[test]
    fn disclosure_is_not_repeated() {
        let policy = TruthPolicy::default();
        let stage = TruthValidation::new(policy.clone());
        let text = format!("Maybe.\n\n{}", policy.uncertainty_disclosure);
        let out = stage.apply(&text, &ctx(Mode::TruthGeneral, 0.2)).unwrap();
        assert!(out.text.is_none());
    }
}
