// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Political neutrality guard.

use std::sync::LazyLock;

use regex::Regex;
use warden_config::model::PoliticalPolicy;
use warden_core::WardenError;

use crate::stage::{EnforcementStage, StageContext, StageOutcome};

/// Language that takes a side rather than describing one.
static STANCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(you should (vote|support|back)|i (would )?(support|endorse|favou?r|back|side with)|(is|are) (clearly |obviously )?(the )?(better|right|correct|best) (party|candidate|choice|side)|(is|are) (wrong|evil|destroying))\b",
    )
    .unwrap()
});

/// Replaces partisan answers with a neutral response.
pub struct PoliticalNeutrality {
    policy: PoliticalPolicy,
    partisan: Option<Regex>,
}

impl PoliticalNeutrality {
    pub fn new(policy: PoliticalPolicy) -> Result<Self, WardenError> {
        let terms: Vec<String> = policy
            .partisan_terms
            .iter()
            .filter(|t| !t.trim().is_empty())
            .map(|t| regex::escape(t.trim()))
            .collect();
        let partisan = if terms.is_empty() {
            None
        } else {
            let pattern = format!(r"(?i)\b(?:{})", terms.join("|"));
            Some(Regex::new(&pattern).map_err(|e| {
                WardenError::Config(format!("invalid partisan term: {e}"))
            })?)
        };
        Ok(Self { policy, partisan })
    }
}

impl EnforcementStage for PoliticalNeutrality {
    fn name(&self) -> &'static str {
        "political_neutrality"
    }

    fn apply(&self, text: &str, ctx: &StageContext<'_>) -> Result<StageOutcome, WardenError> {
        let Some(partisan) = &self.partisan else {
            return Ok(StageOutcome::pass());
        };

        let political = partisan.is_match(ctx.user_message) || partisan.is_match(text);
        if !political {
            return Ok(StageOutcome::pass());
        }
        if !STANCE.is_match(text) {
            return Ok(StageOutcome::pass().with_warning("political topic answered without a stance"));
        }

        Ok(StageOutcome::modified(
            self.policy.neutral_response.clone(),
            "partisan position replaced with neutral response",
        ))
    }
}
