// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Founder and business protection.
//!
//! Pricing below the floor, margins below target and discounts above the
//! maximum are hard violations in every mode: the response is flagged and
//! the chain's security pass fails.

use std::sync::LazyLock;

use regex::Regex;
use warden_config::model::FounderPolicy;
use warden_core::WardenError;

use crate::stage::{EnforcementStage, StageContext, StageOutcome, append_paragraph};

static SENTENCE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+(?:\s+|$)|\n+").unwrap());

static PRICING_CONTEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(pric\w*|charg\w*|plans?|tiers?|packages?|per month|monthly|subscriptions?|sell\w*|offer\w*)\b")
        .unwrap()
});

static DOLLAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\s?(\d[\d,]*(?:\.\d+)?)").unwrap());

static MARGIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d+(?:\.\d+)?)\s?%\s*(?:gross\s+)?margins?\b|margins?\s+(?:of|at|to|around|near)\s+(\d+(?:\.\d+)?)\s?%",
    )
    .unwrap()
});

static DISCOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s?%\s*(?:off|discount)\b|discounts?\s+(?:of|at|by)\s+(\d+(?:\.\d+)?)\s?%")
        .unwrap()
});

pub struct FounderProtection {
    policy: FounderPolicy,
}

impl FounderProtection {
    pub fn new(policy: FounderPolicy) -> Self {
        Self { policy }
    }

    /// Every business-rule breach in `text`, as human-readable reasons.
    pub fn violations(&self, text: &str) -> Vec<String> {
        let mut found = Vec::new();

        for sentence in SENTENCE_BREAK.split(text) {
            if PRICING_CONTEXT.is_match(sentence) {
                for price in DOLLAR.captures_iter(sentence).filter_map(|c| number(c.get(1))) {
                    if price < self.policy.minimum_price_usd {
                        found.push(format!(
                            "price ${price} below the ${} floor",
                            self.policy.minimum_price_usd
                        ));
                    }
                }
            }
        }

        for caps in MARGIN.captures_iter(text) {
            if let Some(margin) = number(caps.get(1).or(caps.get(2)))
                && margin < self.policy.target_margin_pct
            {
                found.push(format!(
                    "margin {margin}% below the {}% target",
                    self.policy.target_margin_pct
                ));
            }
        }

        for caps in DISCOUNT.captures_iter(text) {
            if let Some(discount) = number(caps.get(1).or(caps.get(2)))
                && discount > self.policy.max_discount_pct
            {
                found.push(format!(
                    "discount {discount}% above the {}% maximum",
                    self.policy.max_discount_pct
                ));
            }
        }

        found
    }
}

fn number(m: Option<regex::Match<'_>>) -> Option<f64> {
    m?.as_str().replace(',', "").parse().ok()
}

impl EnforcementStage for FounderProtection {
    fn name(&self) -> &'static str {
        "founder_protection"
    }

    fn apply(&self, text: &str, _ctx: &StageContext<'_>) -> Result<StageOutcome, WardenError> {
        let violations = self.violations(text);
        if violations.is_empty() {
            return Ok(StageOutcome::pass());
        }

        let text = append_paragraph(text, &self.policy.protection_notice);
        Ok(StageOutcome {
            text,
            overrides: violations,
            ..StageOutcome::default()
        }
        .with_confidence(-0.10, "business protection rule broken")
        .violation())
    }
}

#[cfg(test)]
mod tests {
    use warden_core::Mode;

    use super::*;
    use crate::stage::test_support::ctx;

    fn stage() -> FounderProtection {
        FounderProtection::new(FounderPolicy::default())
    }

    #[test]
    fn applies_in_every_mode() {
        for mode in Mode::ALL {
            assert!(stage().applies(&ctx(mode, 0.9)));
        }
    }

    #[test]
    fn truth_general_price_below_floor_is_a_hard_violation() {
        let out = stage()
            .apply("Cut the plan price to $199 per month.", &ctx(Mode::TruthGeneral, 0.9))
            .unwrap();
        assert!(out.hard_violation);
        assert!(out.overrides[0].contains("199"));
    }

    #[test]
    fn price_below_floor_is_a_hard_violation() {
        let out = stage()
            .apply(
                "Drop the starter plan to $499 per month to win more deals.",
                &ctx(Mode::SiteMonkeys, 0.9),
            )
            .unwrap();
        assert!(out.hard_violation);
        assert_eq!(out.overrides.len(), 1);
        assert!(out.overrides[0].contains("499"));
        assert!(out.text.unwrap().contains("Business protection"));
    }

    #[test]
    fn prices_at_or_above_floor_pass() {
        let out = stage()
            .apply(
                "Keep the plan at $697.00 and add a $1,497 premium tier.",
                &ctx(Mode::SiteMonkeys, 0.9),
            )
            .unwrap();
        assert_eq!(out, StageOutcome::pass());
    }

    #[test]
    fn dollar_amounts_outside_pricing_talk_are_ignored() {
        let out = stage()
            .apply("The ad test cost $120 last week.", &ctx(Mode::SiteMonkeys, 0.9))
            .unwrap();
        assert!(!out.hard_violation);
    }

    #[test]
    fn margin_and_discount_limits() {
        let violations = stage().violations(
            "That leaves a 60% gross margin. Offer 30% off for annual deals. A discount of 10% is fine.",
        );
        assert_eq!(violations.len(), 2);
        assert!(violations[0].contains("margin 60%"));
        assert!(violations[1].contains("discount 30%"));
    }

    #[test]
    fn healthy_margin_passes() {
        assert!(stage().violations("We keep margins at 90% across the board.").is_empty());
    }
}
