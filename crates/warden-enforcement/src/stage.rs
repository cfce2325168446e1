// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The stage trait and the values passed through it.

use warden_core::{Mode, WardenError};
use warden_semantic::{Domain, Intent};

/// Read-only facts about the request a stage may consult.
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    pub mode: Mode,
    pub user_message: &'a str,
    pub domain: Domain,
    pub intent: Intent,
    /// Routing confidence for this response.
    pub confidence: f64,
    /// Active vault text, if any.
    pub vault: Option<&'a str>,
}

impl StageContext<'_> {
    pub fn vault_active(&self) -> bool {
        self.vault.is_some_and(|v| !v.trim().is_empty())
    }
}

/// What one stage did to the response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageOutcome {
    /// Replacement text; `None` leaves the response unchanged.
    pub text: Option<String>,
    /// Reasons the stage overrode model output.
    pub overrides: Vec<String>,
    /// `(delta, reason)` pairs applied to the final confidence.
    pub confidence_adjustments: Vec<(f64, String)>,
    pub warnings: Vec<String>,
    /// A rule that must never be broken was broken.
    pub hard_violation: bool,
}

impl StageOutcome {
    pub fn pass() -> Self {
        Self::default()
    }

    pub fn modified(text: String, reason: impl Into<String>) -> Self {
        Self {
            text: Some(text),
            overrides: vec![reason.into()],
            ..Self::default()
        }
    }

    pub fn with_confidence(mut self, delta: f64, reason: impl Into<String>) -> Self {
        self.confidence_adjustments.push((delta, reason.into()));
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn violation(mut self) -> Self {
        self.hard_violation = true;
        self
    }
}

/// One policy check in the enforcement chain.
///
/// Stages are synchronous text transforms. They must not assume any other
/// stage ran before them.
pub trait EnforcementStage: Send + Sync {
    /// Stable module name reported in compliance metadata.
    fn name(&self) -> &'static str;

    /// Whether the stage runs for this request. Non-applicable stages are
    /// recorded as skipped.
    fn applies(&self, _ctx: &StageContext<'_>) -> bool {
        true
    }

    fn apply(&self, text: &str, ctx: &StageContext<'_>) -> Result<StageOutcome, WardenError>;
}

/// Append `addition` as a new paragraph unless `text` already contains it.
pub(crate) fn append_paragraph(text: &str, addition: &str) -> Option<String> {
    if addition.is_empty() || text.contains(addition) {
        return None;
    }
    let body = text.trim_end();
    if body.is_empty() {
        Some(addition.to_string())
    } else {
        Some(format!("{body}\n\n{addition}"))
    }
}

/// Case-insensitive search for any of `phrases`, returning those found.
pub(crate) fn find_phrases<'p>(text: &str, phrases: &'p [String]) -> Vec<&'p str> {
    let lower = text.to_lowercase();
    phrases
        .iter()
        .filter(|p| !p.is_empty() && lower.contains(&p.to_lowercase()))
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn ctx(mode: Mode, confidence: f64) -> StageContext<'static> {
        StageContext {
            mode,
            user_message: "How should we grow revenue next quarter?",
            domain: Domain::Business,
            intent: Intent::Question,
            confidence,
            vault: None,
        }
    }
}
