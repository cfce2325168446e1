// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lexical signals that do not depend on embeddings.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::Display;

static PERSONAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(i|i'm|i've|me|my|mine|myself|we|our|us)\b").unwrap());

static PAST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(yesterday|last (week|month|quarter|year|time)|previously|ago|used to|did|was|were|had)\b",
    )
    .unwrap()
});

static FUTURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(tomorrow|next (week|month|quarter|year)|will|going to|plan(ning)? to|upcoming|forecast|projected?)\b",
    )
    .unwrap()
});

static PRESENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(now|today|currently|right now|this (week|month|quarter|year)|at the moment)\b")
        .unwrap()
});

static MEMORY_NEEDED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(remember|recall|as i (said|mentioned)|last time|we discussed|you told me|earlier|before)\b",
    )
    .unwrap()
});

static CALCULATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d[\d,.]*\s*%|\$\s*\d|\b(calculate|compute|roi|margin|revenue|profit|break[- ]even|percent(age)?|how (much|many)|total)\b)",
    )
    .unwrap()
});

static COMPARISON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(compare|comparison|versus|vs\.?|better than|worse than|difference between|pros and cons|which is better|trade-?offs?)\b",
    )
    .unwrap()
});

static CREATIVITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(create|write|design|brainstorm|imagine|invent|story|poem|slogan|ideas?)\b")
        .unwrap()
});

static CONJUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(and|but|or|because|however|therefore|while|although|if|then|unless|whereas)\b")
        .unwrap()
});

static HEDGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(maybe|perhaps|might|could|possibly|somewhat|kind of|sort of|unclear|not sure|probably)\b",
    )
    .unwrap()
});

/// Time frame the query refers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TemporalBucket {
    Past,
    Present,
    Future,
    #[default]
    None,
}

/// Signals about which context sources the query leans on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSignals {
    pub personal_reference: bool,
    pub temporal: TemporalBucket,
    pub memory_needed: bool,
}

/// Kinds of reasoning the answer will need.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningNeeds {
    pub calculation: bool,
    pub comparison: bool,
    pub creativity: bool,
}

pub fn context_signals(text: &str) -> ContextSignals {
    let temporal = if FUTURE.is_match(text) {
        TemporalBucket::Future
    } else if PAST.is_match(text) {
        TemporalBucket::Past
    } else if PRESENT.is_match(text) {
        TemporalBucket::Present
    } else {
        TemporalBucket::None
    };
    ContextSignals {
        personal_reference: PERSONAL.is_match(text),
        temporal,
        memory_needed: MEMORY_NEEDED.is_match(text),
    }
}

pub fn reasoning_needs(text: &str) -> ReasoningNeeds {
    ReasoningNeeds {
        calculation: CALCULATION.is_match(text),
        comparison: COMPARISON.is_match(text),
        creativity: CREATIVITY.is_match(text),
    }
}

/// Average word length mapped onto [0, 1]: 3 chars or less is 0, 8 or more is 1.
pub fn conceptual_depth(text: &str) -> f64 {
    let words: Vec<&str> = text
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        return 0.0;
    }
    let total: usize = words.iter().map(|w| w.chars().count()).sum();
    let avg = total as f64 / words.len() as f64;
    ((avg - 3.0) / 5.0).clamp(0.0, 1.0)
}

/// Question marks plus conjunctions, saturating at five.
pub fn interdependency(text: &str) -> f64 {
    let questions = text.matches('?').count();
    let conjunctions = CONJUNCTION.find_iter(text).count();
    ((questions + conjunctions) as f64 / 5.0).min(1.0)
}

/// Hedge words, saturating at three.
pub fn ambiguity(text: &str) -> f64 {
    (HEDGE.find_iter(text).count() as f64 / 3.0).min(1.0)
}
