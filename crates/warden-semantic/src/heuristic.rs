// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Regex-only analysis used when the embedding service is unavailable.
//!
//! Zero cost and no network. Confidences are fixed at a neutral 0.5 so the
//! router treats the result as uncertain.

use std::sync::LazyLock;

use regex::Regex;

use crate::analysis::{ComplexityFactors, SemanticAnalysis};
use crate::exemplars::{Domain, Intent, Tone};
use crate::signals;

const HEURISTIC_CONFIDENCE: f64 = 0.5;

static INTENT_RULES: LazyLock<Vec<(Intent, Regex)>> = LazyLock::new(|| {
    vec![
        (
            Intent::Complaint,
            Regex::new(r"(?i)\b(frustrat\w*|annoy\w*|unacceptable|terrible|disappointed|complain\w*)\b").unwrap(),
        ),
        (
            Intent::DecisionMaking,
            Regex::new(r"(?i)\b(should (i|we)|which (option|one)|decide|choose|worth it)\b").unwrap(),
        ),
        (
            Intent::ProblemSolving,
            Regex::new(r"(?i)\b(fix|broken|error|bug|problem|issue|not working|troubleshoot)\b").unwrap(),
        ),
        (
            Intent::CreativeRequest,
            Regex::new(r"(?i)\b(write|create|design|brainstorm|imagine|invent|draft)\b").unwrap(),
        ),
        (
            Intent::CasualChat,
            Regex::new(r"(?i)^\s*(hi|hello|hey|thanks|thank you|good (morning|evening))\b").unwrap(),
        ),
        (
            Intent::Question,
            Regex::new(r"(?i)(\?\s*$|^\s*(what|how|why|when|where|who|is|are|can|does)\b)").unwrap(),
        ),
        (
            Intent::Command,
            Regex::new(r"(?i)^\s*(list|summarize|convert|send|update|show|give|make|tell)\b").unwrap(),
        ),
    ]
});

static DOMAIN_RULES: LazyLock<Vec<(Domain, Regex)>> = LazyLock::new(|| {
    vec![
        (
            Domain::Financial,
            Regex::new(r"(?i)(\b(roi|revenue|profit|margin|pricing|prices?|budget|cash ?flow|invest\w*|tax\w*)\b|\$\d)").unwrap(),
        ),
        (
            Domain::Legal,
            Regex::new(r"(?i)\b(contract|lawsuit|liabilit\w*|legal|compliance|regulation\w*|attorney)\b").unwrap(),
        ),
        (
            Domain::Health,
            Regex::new(r"(?i)\b(health|medical|symptom\w*|doctor|medication|diet|sleep)\b").unwrap(),
        ),
        (
            Domain::Technical,
            Regex::new(r"(?i)\b(code|api|database|server|deploy\w*|software|algorithm|debug\w*)\b").unwrap(),
        ),
        (
            Domain::Business,
            Regex::new(r"(?i)\b(business|customer\w*|market\w*|sales|strategy|competitor\w*|growth)\b").unwrap(),
        ),
        (
            Domain::Personal,
            Regex::new(r"(?i)\b(family|relationship|friend\w*|feel\w*|wife|husband|partner)\b").unwrap(),
        ),
    ]
});

static TONE_RULES: LazyLock<Vec<(Tone, Regex)>> = LazyLock::new(|| {
    vec![
        (
            Tone::Urgent,
            Regex::new(r"(?i)\b(urgent\w*|asap|immediately|right now|deadline)\b|!!").unwrap(),
        ),
        (
            Tone::Anxious,
            Regex::new(r"(?i)\b(worried|nervous|scared|anxious|stressed|afraid)\b").unwrap(),
        ),
        (
            Tone::Negative,
            Regex::new(r"(?i)\b(bad|hate|terrible|awful|disappointed|angry)\b").unwrap(),
        ),
        (
            Tone::Positive,
            Regex::new(r"(?i)\b(great|excited|happy|love|thanks|awesome)\b").unwrap(),
        ),
    ]
});

fn first_match<T: Copy>(rules: &[(T, Regex)], text: &str) -> Option<T> {
    rules
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(label, _)| *label)
}

/// Classify `text` with lexical rules only.
///
/// Always marks the result `fallback_used`.
pub fn heuristic_analysis(text: &str) -> SemanticAnalysis {
    let factors = ComplexityFactors::lexical(text, false);
    SemanticAnalysis {
        intent: first_match(&INTENT_RULES, text).unwrap_or(Intent::Question),
        intent_confidence: HEURISTIC_CONFIDENCE,
        domain: first_match(&DOMAIN_RULES, text).unwrap_or(Domain::General),
        domain_confidence: HEURISTIC_CONFIDENCE,
        complexity: factors.score(),
        complexity_factors: factors,
        tone: first_match(&TONE_RULES, text).unwrap_or(Tone::Neutral),
        tone_weight: HEURISTIC_CONFIDENCE,
        signals: signals::context_signals(text),
        reasoning: signals::reasoning_needs(text),
        cache_hit: false,
        cost_usd: 0.0,
        fallback_used: true,
        degraded: false,
        warnings: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_roi_question() {
        let a = heuristic_analysis("What ROI should we expect if we raise prices 10%?");
        assert!(a.fallback_used);
        assert_eq!(a.domain, Domain::Financial);
        assert_eq!(a.intent, Intent::DecisionMaking);
        assert!(a.reasoning.calculation);
        assert_eq!(a.cost_usd, 0.0);
        assert!(!a.cache_hit);
    }

    #[test]
    fn neutral_defaults_for_plain_text() {
        let a = heuristic_analysis("the sky");
        assert_eq!(a.intent, Intent::Question);
        assert_eq!(a.domain, Domain::General);
        assert_eq!(a.tone, Tone::Neutral);
        assert_eq!(a.intent_confidence, 0.5);
    }

    #[test]
    fn tone_and_complaint() {
        let a = heuristic_analysis("This is unacceptable, fix it immediately!!");
        assert_eq!(a.intent, Intent::Complaint);
        assert_eq!(a.tone, Tone::Urgent);
    }
}
