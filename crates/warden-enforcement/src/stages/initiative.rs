// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Initiative enforcement: no passive sign-offs, always a next step.

use regex::Regex;
use warden_config::model::InitiativePolicy;
use warden_core::WardenError;
use warden_semantic::Intent;

use crate::stage::{EnforcementStage, StageContext, StageOutcome, append_paragraph};

pub struct InitiativeEnforcement {
    policy: InitiativePolicy,
    /// Matches a whole sentence containing any passive phrase.
    passive: Option<Regex>,
}

impl InitiativeEnforcement {
    pub fn new(policy: InitiativePolicy) -> Result<Self, WardenError> {
        let alternatives: Vec<String> = policy
            .passive_phrases
            .iter()
            .filter(|p| !p.trim().is_empty())
            .map(|p| regex::escape(p.trim()))
            .collect();

        let passive = if alternatives.is_empty() {
            None
        } else {
            let pattern = format!(r"(?i)[^.!?\n]*\b(?:{})\b[^.!?\n]*[.!?]*", alternatives.join("|"));
            Some(Regex::new(&pattern).map_err(|e| {
                WardenError::Config(format!("invalid initiative passive phrase: {e}"))
            })?)
        };

        Ok(Self { policy, passive })
    }
}

impl EnforcementStage for InitiativeEnforcement {
    fn name(&self) -> &'static str {
        "initiative_enforcement"
    }

    fn apply(&self, text: &str, ctx: &StageContext<'_>) -> Result<StageOutcome, WardenError> {
        let (body, removed) = match &self.passive {
            Some(re) if re.is_match(text) => (re.replace_all(text, "").trim_end().to_string(), true),
            _ => (text.to_string(), false),
        };

        let action_expected = matches!(
            ctx.intent,
            Intent::DecisionMaking | Intent::ProblemSolving | Intent::Command
        );
        let has_next_step = body.to_lowercase().contains("next step");

        if !removed && (!action_expected || has_next_step) {
            return Ok(StageOutcome::pass());
        }

        let mut reasons = Vec::new();
        if removed {
            reasons.push("passive closing removed".to_string());
        }
        let text = if has_next_step {
            body
        } else {
            match append_paragraph(&body, &self.policy.next_step_prompt) {
                Some(with_step) => {
                    reasons.push("next step added".to_string());
                    with_step
                }
                None => body,
            }
        };

        Ok(StageOutcome {
            text: Some(text),
            overrides: reasons,
            ..StageOutcome::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use warden_core::Mode;

    use super::*;
    use crate::stage::test_support::ctx;

    fn stage() -> InitiativeEnforcement {
        InitiativeEnforcement::new(InitiativePolicy::default()).unwrap()
    }

    #[test]
    fn passive_closing_is_stripped() {
        let out = stage()
            .apply(
                "Cut the bottom tier. Hope this helps!",
                &ctx(Mode::TruthGeneral, 0.9),
            )
            .unwrap();
        let text = out.text.unwrap();
        assert!(!text.to_lowercase().contains("hope this helps"));
        assert!(text.starts_with("Cut the bottom tier."));
        assert!(text.contains("Next step:"));
        assert_eq!(out.overrides.len(), 2);
    }

    #[test]
    fn plain_answers_to_questions_pass() {
        let out = stage()
            .apply("Paris is the capital of France.", &ctx(Mode::TruthGeneral, 0.9))
            .unwrap();
        assert_eq!(out, StageOutcome::pass());
    }

    #[test]
    fn decisions_get_a_next_step() {
        let mut c = ctx(Mode::BusinessValidation, 0.9);
        c.intent = Intent::DecisionMaking;
        let out = stage().apply("Option B has the better payback.", &c).unwrap();
        assert_eq!(out.overrides, vec!["next step added"]);
    }

    #[test]
    fn existing_next_step_is_kept() {
        let mut c = ctx(Mode::BusinessValidation, 0.9);
        c.intent = Intent::ProblemSolving;
        let out = stage()
            .apply("Restart the worker. Next step: check the queue depth.", &c)
            .unwrap();
        assert_eq!(out, StageOutcome::pass());
    }

    #[test]
    fn empty_phrase_list_is_allowed() {
        let policy = InitiativePolicy {
            passive_phrases: Vec::new(),
            ..InitiativePolicy::default()
        };
        let stage = InitiativeEnforcement::new(policy).unwrap();
        let out = stage
            .apply("Hope this helps.", &ctx(Mode::TruthGeneral, 0.9))
            .unwrap();
        assert!(out.text.is_none());
    }
}
